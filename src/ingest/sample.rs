//! Bundled static fallback dataset.
//!
//! When the live openFDA fetch exhausts its retry budget (or returns a
//! malformed body), the pipeline falls back to this read-only sample so
//! downstream consumers can still render, flagged as degraded data. The
//! sample is stored in the same response shape the API returns and goes
//! through the same parser as a live body — the fallback path exercises no
//! special-case record construction.

use crate::ingest::openfda::{self, RawRecord};
use crate::model::FetchError;

/// Sample enforcement reports, embedded at compile time.
const SAMPLE_BODY: &str = include_str!("../../data/sample_enforcement.json");

/// Loads the bundled sample dataset.
///
/// Failure here means the embedded JSON is broken, which combined with a
/// live-fetch failure is the pipeline's only fatal condition.
pub fn load_sample() -> Result<Vec<RawRecord>, FetchError> {
    openfda::parse_enforcement_body(SAMPLE_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_sample_parses_and_is_non_empty() {
        let records = load_sample().expect("embedded sample must always parse");
        assert!(
            records.len() >= 10,
            "sample should carry enough records to render a meaningful degraded view"
        );
    }

    #[test]
    fn test_bundled_sample_records_carry_required_analytics_fields() {
        // Every sample record must survive normalization: a parseable
        // report date and a recognizable classification keep the degraded
        // view representative.
        let records = load_sample().unwrap();
        for record in &records {
            let date = record.report_date.as_deref().unwrap_or("");
            assert_eq!(date.len(), 8, "sample dates use the compact form, got {:?}", date);
            assert!(date.chars().all(|c| c.is_ascii_digit()));
            let class = record.classification.as_deref().unwrap_or("");
            assert!(
                class.starts_with("Class "),
                "sample classification should be openFDA-shaped, got {:?}",
                class
            );
        }
    }

    #[test]
    fn test_bundled_sample_covers_all_three_classification_tiers() {
        let records = load_sample().unwrap();
        for tier in ["Class I", "Class II", "Class III"] {
            assert!(
                records
                    .iter()
                    .any(|r| r.classification.as_deref() == Some(tier)),
                "sample should contain at least one {} recall",
                tier
            );
        }
    }
}
