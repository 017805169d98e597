//! Catalogue: library document catalog browser
//!
//! A REST JSON API over a document store of catalog records (listing,
//! filtering, loan state, dashboard statistics) together with the client-side
//! view layer that consumes it.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, config.catalog);
        Self {
            services: Arc::new(services),
        }
    }
}
