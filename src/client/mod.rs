//! Client-side view layer for the catalog and statistics pages.
//!
//! The API client fetches envelopes; the views turn them into cards, pagination
//! controls, status lines and proportional bar charts. Rendering to text is
//! done through `Display`.

pub mod api;
pub mod catalog;
pub mod dashboard;
pub mod debounce;
pub mod sequence;
pub mod status;

use thiserror::Error;

pub use api::{ApiClient, CatalogBackend};
pub use catalog::{CardView, CatalogContent, CatalogController, CatalogFilters, CatalogView, PageState, PaginationControls};
pub use dashboard::{BarChart, Overview, ReservationChart, StackedChart, StatsDashboard};
pub use debounce::Debouncer;
pub use sequence::{RequestSequencer, Ticket};
pub use status::{StatusKind, StatusLine};

/// Errors seen by the client views
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server answered with a failure envelope or a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Request never got a usable answer
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Success status with `success: false` or unusable payload
    #[error("Données invalides reçues du serveur")]
    InvalidPayload,
}
