//! Record filter built from listing parameters.
//!
//! Absent or empty parameters impose no constraint; active constraints are
//! combined with AND.

use crate::models::{Availability, Record};

/// Type values meaning "every type"
const ALL_TYPES: [&str; 2] = ["tous", "all"];

/// Store-independent record predicate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Exact, case-sensitive document type
    pub document_type: Option<String>,
    pub availability: Availability,
    /// Literal text matched case-insensitively against title or author
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for a listing request.
    pub fn from_params(
        document_type: Option<&str>,
        search: Option<&str>,
        disponibilite: Option<&str>,
    ) -> Self {
        Self::new()
            .with_type(document_type)
            .with_search(search)
            .with_availability(Availability::from_token(disponibilite))
    }

    pub fn with_type(mut self, document_type: Option<&str>) -> Self {
        self.document_type = document_type
            .filter(|t| !t.is_empty() && !ALL_TYPES.contains(t))
            .map(str::to_string);
        self
    }

    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search.filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Lowercased search term, if any
    pub fn search_folded(&self) -> Option<String> {
        self.search.as_deref().map(str::to_lowercase)
    }

    /// Evaluate the predicate against one record.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(ref wanted) = self.document_type {
            if record.fields.document_type().as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }

        let availability_ok = match self.availability {
            Availability::Available => !record.is_checked_out(),
            Availability::CheckedOut => record.is_checked_out(),
            Availability::Any => true,
        };
        if !availability_ok {
            return false;
        }

        match self.search_folded() {
            Some(needle) => {
                let hit = |text: Option<std::borrow::Cow<'_, str>>| {
                    text.map(|t| t.to_lowercase().contains(&needle)).unwrap_or(false)
                };
                hit(record.fields.title()) || hit(record.fields.author())
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckoutState, RecordFields};
    use serde_json::json;

    fn record(title: &str, author: Option<&str>, doc_type: &str, marker: Option<&str>) -> Record {
        let mut fields = RecordFields::default();
        fields.insert("titre_avec_lien_vers_le_catalogue", json!(title));
        if let Some(author) = author {
            fields.insert("auteur", json!(author));
        }
        fields.insert("type_de_document", json!(doc_type));
        let mut record = Record::new("65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap(), fields);
        record.checkout = CheckoutState::from_marker(marker);
        record
    }

    #[test]
    fn test_empty_params_impose_nothing() {
        let filter = RecordFilter::from_params(None, Some(""), None);
        assert_eq!(filter, RecordFilter::default());
        assert!(filter.matches(&record("A", None, "Roman", None)));
    }

    #[test]
    fn test_type_sentinels() {
        assert_eq!(RecordFilter::new().with_type(Some("tous")).document_type, None);
        assert_eq!(RecordFilter::new().with_type(Some("all")).document_type, None);
        assert_eq!(
            RecordFilter::new().with_type(Some("BD")).document_type.as_deref(),
            Some("BD")
        );
    }

    #[test]
    fn test_type_is_case_sensitive() {
        let filter = RecordFilter::new().with_type(Some("roman"));
        assert!(!filter.matches(&record("A", None, "Roman", None)));
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_or_author() {
        let prince = record("Le Petit Prince", Some("Antoine de Saint-Exupéry"), "Roman", None);
        for term in ["petit", "PETIT", "Petit", "saint-ex"] {
            assert!(RecordFilter::new().with_search(Some(term)).matches(&prince), "{}", term);
        }
        assert!(!RecordFilter::new().with_search(Some("hugo")).matches(&prince));
    }

    #[test]
    fn test_search_is_literal() {
        let r = record("Qui a peur (de Virginia Woolf)?", None, "Théâtre", None);
        assert!(RecordFilter::new().with_search(Some("(de")).matches(&r));
        assert!(!RecordFilter::new().with_search(Some("q.i")).matches(&r));
    }

    #[test]
    fn test_availability_partitions_records() {
        let records = [
            record("A", None, "Roman", None),
            record("B", None, "Roman", Some("")),
            record("C", None, "Roman", Some("2024-03-01T10:00:00.000Z")),
        ];
        let available = RecordFilter::new().with_availability(Availability::Available);
        let checked_out = RecordFilter::new().with_availability(Availability::CheckedOut);
        for r in &records {
            assert!(available.matches(r) ^ checked_out.matches(r));
        }
        assert_eq!(records.iter().filter(|r| checked_out.matches(r)).count(), 1);
    }

    #[test]
    fn test_constraints_combine_with_and() {
        let filter = RecordFilter::from_params(Some("BD"), Some("astérix"), Some("disponible"));
        assert!(filter.matches(&record("Astérix le Gaulois", None, "BD", None)));
        assert!(!filter.matches(&record("Astérix le Gaulois", None, "Roman", None)));
        assert!(!filter.matches(&record("Astérix le Gaulois", None, "BD", Some("2024-01-01T00:00:00.000Z"))));
        assert!(!filter.matches(&record("Tintin", None, "BD", None)));
    }
}
