//! Business logic services

pub mod catalog;
pub mod loans;
pub mod stats;

use crate::{config::CatalogConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, settings: CatalogConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), settings.clone()),
            loans: loans::LoansService::new(repository.clone()),
            stats: stats::StatsService::new(repository, settings),
        }
    }
}
