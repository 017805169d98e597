//! Sort mode resolution

use std::cmp::Ordering;

use crate::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Reservations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Single-key ordering of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::ALPHA
    }
}

impl SortSpec {
    pub const ALPHA: SortSpec = SortSpec {
        key: SortKey::Title,
        direction: SortDirection::Ascending,
    };

    pub const RESERVATIONS: SortSpec = SortSpec {
        key: SortKey::Reservations,
        direction: SortDirection::Descending,
    };

    /// Map a sort token to an ordering; anything but "reservations" sorts by title.
    pub fn resolve(token: Option<&str>) -> Self {
        match token {
            Some("reservations") => Self::RESERVATIONS,
            _ => Self::ALPHA,
        }
    }

    /// Compare two records under this ordering.
    ///
    /// A missing title sorts before any present one; missing reservation
    /// counts compare as 0. Ties are left to the caller.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match self.key {
            SortKey::Title => a.fields.title().cmp(&b.fields.title()),
            SortKey::Reservations => a.fields.reservations().cmp(&b.fields.reservations()),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}
