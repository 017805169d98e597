//! Catalog query service

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::{ListQuery, Record, RecordField, SearchQuery},
    query::{Pager, RecordFilter, SortSpec},
    repository::Repository,
};

/// One page of a filtered, sorted listing
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub records: Vec<Record>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    settings: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, settings: CatalogConfig) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// List records with filters, sort and pagination.
    ///
    /// The count and the page fetch are separate store calls; under concurrent
    /// writes they may observe different states.
    pub async fn list_records(&self, query: &ListQuery) -> AppResult<RecordPage> {
        let pager = Pager::new(query.page, query.limit, &self.settings)?;
        let filter = RecordFilter::from_params(
            query.document_type.as_deref(),
            query.search.as_deref(),
            query.disponibilite.as_deref(),
        );
        let sort = SortSpec::resolve(query.sort.as_deref());

        let total = self.repository.livres.count(&filter).await?;
        let records = self
            .repository
            .livres
            .find(&filter, Some(sort), pager.skip(), pager.limit())
            .await?;

        tracing::debug!(
            "Listed {} of {} records (page {}, filter {:?}, sort {:?})",
            records.len(),
            total,
            pager.page(),
            filter,
            sort
        );

        Ok(RecordPage {
            records,
            total,
            page: pager.page(),
            total_pages: pager.total_pages(total),
        })
    }

    /// Distinct document types, without null or empty values
    pub async fn list_types(&self) -> AppResult<Vec<String>> {
        let values = self
            .repository
            .livres
            .distinct(RecordField::DocumentType)
            .await?;
        Ok(values
            .into_iter()
            .flatten()
            .filter(|t| !t.is_empty())
            .collect())
    }

    /// Unsorted text search, capped at the configured limit
    pub async fn search(&self, query: &SearchQuery) -> AppResult<Vec<Record>> {
        let filter = RecordFilter::new()
            .with_search(query.q.as_deref())
            .with_type(query.document_type.as_deref());
        self.repository
            .livres
            .find(&filter, None, 0, self.settings.search_limit)
            .await
    }
}
