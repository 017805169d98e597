//! Data models for the catalogue

pub mod envelope;
pub mod query;
pub mod record;
pub mod stats;

// Re-export commonly used types
pub use envelope::{MessageResponse, RecordList, RecordListing, StatsResponse, TypeList};
pub use query::{Availability, ListQuery, LoanAction, LoanRequest, SearchQuery};
pub use record::{CheckoutState, Record, RecordField, RecordFields, RecordId};
pub use stats::{AvailabilityBreakdown, CatalogStats, GroupCount, ReservationRollup};
