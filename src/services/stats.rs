//! Statistics service

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::{CatalogStats, RecordField},
    query::RecordFilter,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    settings: CatalogConfig,
}

impl StatsService {
    pub fn new(repository: Repository, settings: CatalogConfig) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Collection-wide aggregates for the dashboard.
    ///
    /// Each aggregate is an independent read; they are not taken from a
    /// single snapshot.
    pub async fn get_stats(&self) -> AppResult<CatalogStats> {
        let store = &self.repository.livres;
        let all = RecordFilter::new();

        let (total_livres, top_auteurs, types_documents, reservations_par_type, disponibilite_par_type) =
            tokio::try_join!(
                store.count(&all),
                store.count_by(RecordField::Author, Some(self.settings.top_authors)),
                store.count_by(RecordField::DocumentType, None),
                store.reservations_by_type(),
                store.availability_by_type(),
            )?;

        Ok(CatalogStats {
            total_livres,
            top_auteurs,
            types_documents,
            reservations_par_type,
            disponibilite_par_type,
        })
    }
}
