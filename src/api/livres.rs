//! Catalog record endpoints

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{ListQuery, LoanRequest, MessageResponse, RecordList, RecordListing, SearchQuery, TypeList},
    AppState,
};

use super::{ApiPath, ApiQuery};

/// List records with filters, sort and pagination
#[utoipa::path(
    get,
    path = "/livres",
    tag = "livres",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of matching records", body = RecordListing),
        (status = 400, description = "Invalid page or limit", body = crate::error::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_livres(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> AppResult<Json<RecordListing>> {
    query.validate()?;

    let page = state.services.catalog.list_records(&query).await?;

    Ok(Json(RecordListing {
        success: true,
        count: page.records.len(),
        total: page.total,
        page: page.page,
        total_pages: page.total_pages,
        data: page.records,
    }))
}

/// List distinct document types
#[utoipa::path(
    get,
    path = "/livres/types",
    tag = "livres",
    responses(
        (status = 200, description = "Distinct non-empty document types", body = TypeList),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_types(State(state): State<AppState>) -> AppResult<Json<TypeList>> {
    let types = state.services.catalog.list_types().await?;
    Ok(Json(TypeList::new(types)))
}

/// Search records by title or author
#[utoipa::path(
    get,
    path = "/livres/search",
    tag = "livres",
    params(SearchQuery),
    responses(
        (status = 200, description = "Up to 100 matching records", body = RecordList),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_livres(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<Json<RecordList>> {
    let records = state.services.catalog.search(&query).await?;
    Ok(Json(RecordList::new(records)))
}

/// Check a record out or return it
#[utoipa::path(
    patch,
    path = "/livres/{id}",
    tag = "livres",
    params(
        ("id" = String, Path, description = "Record ID")
    ),
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Loan state updated", body = MessageResponse),
        (status = 400, description = "Invalid action or id", body = crate::error::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_loan_state(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    request: Option<Json<LoanRequest>>,
) -> AppResult<Json<MessageResponse>> {
    // A missing or unreadable body is treated as a missing action
    let action = request.and_then(|Json(body)| body.action);
    let action = state
        .services
        .loans
        .set_loan_state(&id, action.as_deref())
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: action.message().to_string(),
    }))
}
