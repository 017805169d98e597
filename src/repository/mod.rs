//! Repository layer for document store operations

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        AvailabilityBreakdown, CheckoutState, GroupCount, Record, RecordField, RecordId,
        ReservationRollup,
    },
    query::{RecordFilter, SortSpec},
};

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Operations the catalog needs from its document store.
///
/// Orderings are made deterministic by the store: every ranking breaks ties
/// by its group key (null first) and every listing by record id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Number of records matching the filter
    async fn count(&self, filter: &RecordFilter) -> AppResult<i64>;

    /// Matching records, ordered, skipping `skip` and returning at most `limit`.
    /// Without a sort the store's natural order is used.
    async fn find(
        &self,
        filter: &RecordFilter,
        sort: Option<SortSpec>,
        skip: i64,
        limit: i64,
    ) -> AppResult<Vec<Record>>;

    /// Distinct raw values of an attribute, nulls and empty strings included
    async fn distinct(&self, field: RecordField) -> AppResult<Vec<Option<String>>>;

    /// Overwrite the checkout marker of one record.
    /// Returns false when no record has this id.
    async fn set_checkout(&self, id: &RecordId, state: &CheckoutState) -> AppResult<bool>;

    /// Record count per attribute value, largest first
    async fn count_by(&self, field: RecordField, limit: Option<i64>) -> AppResult<Vec<GroupCount>>;

    /// Reservation sum and average per document type, largest sum first
    async fn reservations_by_type(&self) -> AppResult<Vec<ReservationRollup>>;

    /// Available and checked-out counts per document type, largest type first
    async fn availability_by_type(&self) -> AppResult<Vec<AvailabilityBreakdown>>;
}

/// Main repository struct holding the store handle
#[derive(Clone)]
pub struct Repository {
    pub livres: Arc<dyn CatalogStore>,
}

impl Repository {
    /// Create a repository over any store implementation
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { livres: store }
    }

    /// Create a repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::new(Arc::new(PgCatalogStore::new(pool)))
    }

    /// Create a repository backed by an in-memory collection
    pub fn memory(records: Vec<Record>) -> Self {
        Self::new(Arc::new(MemoryCatalogStore::new(records)))
    }
}
