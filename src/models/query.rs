//! Request parameter types for catalog queries and loan updates

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Query parameters for `GET /livres`
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Document type (exact match); "tous" or "all" disables the filter
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    /// Page number, 1-based (default: 1)
    #[validate(range(min = 1, message = "page must be >= 1"))]
    pub page: Option<i64>,
    /// Page size (default: 9)
    #[validate(range(min = 1, message = "limit must be >= 1"))]
    pub limit: Option<i64>,
    /// Sort mode: "alpha" (default) or "reservations"
    pub sort: Option<String>,
    /// Case-insensitive text matched against title or author
    pub search: Option<String>,
    /// Availability: "disponible", "emprunte" or "tous" (default)
    pub disponibilite: Option<String>,
}

/// Query parameters for `GET /livres/search`
#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive text matched against title or author
    pub q: Option<String>,
    /// Document type (exact match)
    #[serde(rename = "type")]
    pub document_type: Option<String>,
}

/// Availability constraint of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Availability {
    /// Checkout marker empty or absent
    Available,
    /// Checkout marker present and non-empty
    CheckedOut,
    #[default]
    Any,
}

impl Availability {
    /// Decode a `disponibilite` token; unknown tokens impose no constraint.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("disponible") => Availability::Available,
            Some("emprunte") => Availability::CheckedOut,
            _ => Availability::Any,
        }
    }
}

/// Loan state transition requested by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanAction {
    /// Check the record out
    #[serde(rename = "emprunter")]
    Checkout,
    /// Return the record
    #[serde(rename = "retourner")]
    Return,
}

impl LoanAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LoanAction::Checkout => "emprunter",
            LoanAction::Return => "retourner",
        }
    }

    /// Confirmation message sent back to the client
    pub fn message(self) -> &'static str {
        match self {
            LoanAction::Checkout => "Livre emprunté",
            LoanAction::Return => "Livre retourné",
        }
    }
}

impl FromStr for LoanAction {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "emprunter" => Ok(LoanAction::Checkout),
            "retourner" => Ok(LoanAction::Return),
            _ => Err(AppError::Validation("Action invalide".to_string())),
        }
    }
}

/// Body of `PATCH /livres/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanRequest {
    /// "emprunter" or "retourner"
    pub action: Option<String>,
}
