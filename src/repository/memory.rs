//! In-memory document store, seeded from a JSON export

use std::path::Path;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::CatalogStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        AvailabilityBreakdown, CheckoutState, GroupCount, Record, RecordField, RecordId,
        ReservationRollup,
    },
    query::{RecordFilter, SortSpec},
};

/// Collection kept in insertion order, which is its natural order
pub struct MemoryCatalogStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryCatalogStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Load a JSON array of records (`{_id, fields, FIELD9}`)
    pub async fn from_seed_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Store(format!("Cannot read seed file {}: {}", path.display(), e))
        })?;
        let records: Vec<Record> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Store(format!("Invalid seed file {}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self::new(records))
    }
}

fn group_key(record: &Record, field: RecordField) -> Option<String> {
    record.fields.text(field.key()).map(|t| t.into_owned())
}

fn to_usize(n: i64) -> usize {
    usize::try_from(n).unwrap_or(if n < 0 { 0 } else { usize::MAX })
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn count(&self, filter: &RecordFilter) -> AppResult<i64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| filter.matches(r)).count() as i64)
    }

    async fn find(
        &self,
        filter: &RecordFilter,
        sort: Option<SortSpec>,
        skip: i64,
        limit: i64,
    ) -> AppResult<Vec<Record>> {
        let records = self.records.read().await;
        let mut matching: Vec<&Record> = records.iter().filter(|r| filter.matches(r)).collect();

        if let Some(spec) = sort {
            matching.sort_by(|a, b| spec.compare(a, b).then_with(|| a.id.cmp(&b.id)));
        }

        Ok(matching
            .into_iter()
            .skip(to_usize(skip))
            .take(to_usize(limit))
            .cloned()
            .collect())
    }

    async fn distinct(&self, field: RecordField) -> AppResult<Vec<Option<String>>> {
        let records = self.records.read().await;
        let mut seen: IndexMap<Option<String>, ()> = IndexMap::new();
        for record in records.iter() {
            seen.entry(group_key(record, field)).or_insert(());
        }
        Ok(seen.into_keys().collect())
    }

    async fn set_checkout(&self, id: &RecordId, state: &CheckoutState) -> AppResult<bool> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.checkout = state.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_by(&self, field: RecordField, limit: Option<i64>) -> AppResult<Vec<GroupCount>> {
        let records = self.records.read().await;
        let mut groups: IndexMap<Option<String>, i64> = IndexMap::new();
        for record in records.iter() {
            *groups.entry(group_key(record, field)).or_insert(0) += 1;
        }

        let mut counts: Vec<GroupCount> = groups
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        if let Some(limit) = limit {
            counts.truncate(to_usize(limit));
        }
        Ok(counts)
    }

    async fn reservations_by_type(&self) -> AppResult<Vec<ReservationRollup>> {
        let records = self.records.read().await;
        let mut groups: IndexMap<Option<String>, (i64, i64)> = IndexMap::new();
        for record in records.iter() {
            let entry = groups
                .entry(group_key(record, RecordField::DocumentType))
                .or_insert((0, 0));
            entry.0 = entry.0.saturating_add(record.fields.reservations());
            entry.1 += 1;
        }

        let mut rollups: Vec<ReservationRollup> = groups
            .into_iter()
            .map(|(key, (sum, count))| ReservationRollup::new(key, sum, count))
            .collect();
        rollups.sort_by(|a, b| {
            b.total_reservations
                .cmp(&a.total_reservations)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(rollups)
    }

    async fn availability_by_type(&self) -> AppResult<Vec<AvailabilityBreakdown>> {
        let records = self.records.read().await;
        let mut groups: IndexMap<Option<String>, AvailabilityBreakdown> = IndexMap::new();
        for record in records.iter() {
            let key = group_key(record, RecordField::DocumentType);
            let entry = groups
                .entry(key.clone())
                .or_insert_with(|| AvailabilityBreakdown {
                    key,
                    total: 0,
                    disponibles: 0,
                    empruntes: 0,
                });
            entry.total += 1;
            if record.is_checked_out() {
                entry.empruntes += 1;
            } else {
                entry.disponibles += 1;
            }
        }

        let mut breakdown: Vec<AvailabilityBreakdown> = groups.into_values().collect();
        breakdown.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
        Ok(breakdown)
    }
}
