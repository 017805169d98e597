//! Response envelopes shared by the API handlers and the client

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{record::Record, stats::CatalogStats};

/// Paged listing of records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordListing {
    pub success: bool,
    /// Number of records in this page
    pub count: usize,
    /// Number of records matching the filter
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// ceil(total / limit); 0 when nothing matches
    pub total_pages: i64,
    pub data: Vec<Record>,
}

/// Unpaged list of records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordList {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Record>,
}

impl RecordList {
    pub fn new(data: Vec<Record>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Distinct document types
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TypeList {
    pub success: bool,
    pub count: usize,
    pub data: Vec<String>,
}

impl TypeList {
    pub fn new(data: Vec<String>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Outcome of a loan state change
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Dashboard statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: CatalogStats,
}
