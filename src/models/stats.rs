//! Dashboard statistics model
//!
//! Field names follow the JSON shape the dashboard already consumes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of records sharing one attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GroupCount {
    /// Group key; null when the attribute is missing
    #[serde(rename = "_id")]
    pub key: Option<String>,
    pub count: i64,
}

/// Reservation totals of one document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRollup {
    /// Document type; null when missing
    #[serde(rename = "_id")]
    pub key: Option<String>,
    /// Sum of coerced reservation counts
    pub total_reservations: i64,
    /// Number of records of this type
    pub nombre_documents: i64,
    /// total_reservations / nombre_documents
    pub moyenne_reservations: f64,
}

impl ReservationRollup {
    pub fn new(key: Option<String>, total_reservations: i64, nombre_documents: i64) -> Self {
        let moyenne_reservations = if nombre_documents > 0 {
            total_reservations as f64 / nombre_documents as f64
        } else {
            0.0
        };
        Self {
            key,
            total_reservations,
            nombre_documents,
            moyenne_reservations,
        }
    }
}

/// Available versus checked-out records of one document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityBreakdown {
    #[serde(rename = "_id")]
    pub key: Option<String>,
    pub total: i64,
    pub disponibles: i64,
    pub empruntes: i64,
}

/// Aggregates shown on the statistics dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_livres: i64,
    pub top_auteurs: Vec<GroupCount>,
    pub types_documents: Vec<GroupCount>,
    pub reservations_par_type: Vec<ReservationRollup>,
    #[serde(default)]
    pub disponibilite_par_type: Vec<AvailabilityBreakdown>,
}
