//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, livres, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalogue API",
        version = "0.1.0",
        description = "Library document catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "Catalogue API")
    ),
    paths(
        // Health
        health::health_check,
        // Catalog
        livres::list_livres,
        livres::list_types,
        livres::search_livres,
        livres::update_loan_state,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Records
            crate::models::record::Record,
            crate::models::record::RecordId,
            crate::models::query::ListQuery,
            crate::models::query::SearchQuery,
            crate::models::query::LoanRequest,
            crate::models::query::LoanAction,
            // Envelopes
            crate::models::envelope::RecordListing,
            crate::models::envelope::RecordList,
            crate::models::envelope::TypeList,
            crate::models::envelope::MessageResponse,
            crate::models::envelope::StatsResponse,
            // Stats
            crate::models::stats::CatalogStats,
            crate::models::stats::GroupCount,
            crate::models::stats::ReservationRollup,
            crate::models::stats::AvailabilityBreakdown,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "livres", description = "Catalog records and loans"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
