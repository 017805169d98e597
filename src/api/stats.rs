//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, models::StatsResponse, AppState};

/// Collection-wide statistics for the dashboard
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Catalog statistics", body = StatsResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}
