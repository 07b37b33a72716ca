//! Record normalization.
//!
//! Flattens heterogeneous openFDA records into uniform `CleanRecord`s:
//! dates are parsed (unparseable records are dropped and counted, never
//! defaulted — an undated recall cannot be time-bucketed), quantities are
//! repaired or imputed, optional text fields get neutral defaults, and the
//! derived severity label is attached.
//!
//! Imputation policy: a missing or non-numeric quantity takes the median
//! of quantities observed among records of the same classification tier
//! within the batch; a batch with no such quantities falls back to the
//! configured constant. Imputed values are never negative.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::{ClassifyConfig, NormalizeConfig};
use crate::ingest::RawRecord;
use crate::model::CleanRecord;
use crate::severity::{self, Classification};

/// Category assigned when the API record carries no product type.
const UNKNOWN_CATEGORY: &str = "Unknown";

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Parses an openFDA report date. The API uses the compact form
/// ("20240215"); the dashed form appears in older exports.
fn parse_report_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .ok()
}

/// Extracts a numeric quantity from free text like "5,400 bottles".
/// Tries the whole string (thousands separators stripped) first, then the
/// leading numeric token. Returns `None` when no number can be read.
fn parse_quantity(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(value) = cleaned.parse::<f64>() {
        return Some(value);
    }
    let prefix: String = cleaned
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    prefix.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Intermediate row: a record that survived date parsing but may still be
/// waiting on quantity imputation.
struct PendingRecord {
    recall_number: String,
    report_date: NaiveDate,
    classification: Option<Classification>,
    quantity: Option<f64>,
    reason_text: String,
    category: String,
}

/// Normalizes a batch of raw records into `CleanRecord`s.
///
/// Returns the retained records (input order preserved) and the number of
/// records dropped for an unparseable or missing report date. Per-record
/// problems never propagate as errors.
pub fn normalize_records(
    raws: Vec<RawRecord>,
    classify_config: &ClassifyConfig,
    normalize_config: &NormalizeConfig,
) -> (Vec<CleanRecord>, usize) {
    let mut dropped = 0usize;
    let mut pending: Vec<PendingRecord> = Vec::with_capacity(raws.len());
    let mut tier_quantities: HashMap<Option<Classification>, Vec<f64>> = HashMap::new();

    for raw in raws {
        let report_date = match raw.report_date.as_deref().and_then(parse_report_date) {
            Some(date) => date,
            None => {
                dropped += 1;
                continue;
            }
        };

        let classification = raw
            .classification
            .as_deref()
            .and_then(Classification::from_code);

        // Quantity floor is zero: a negative count is a data error, not a
        // signal worth preserving.
        let quantity = raw
            .product_quantity
            .as_deref()
            .and_then(parse_quantity)
            .map(|q| q.max(0.0));

        if let Some(q) = quantity {
            tier_quantities.entry(classification).or_default().push(q);
        }

        let category = raw
            .product_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        pending.push(PendingRecord {
            recall_number: raw.recall_number.unwrap_or_default(),
            report_date,
            classification,
            quantity,
            reason_text: raw.reason.unwrap_or_default(),
            category,
        });
    }

    let tier_medians: HashMap<Option<Classification>, f64> = tier_quantities
        .into_iter()
        .map(|(tier, mut values)| (tier, median_of(&mut values)))
        .collect();

    let records = pending
        .into_iter()
        .map(|row| {
            let quantity = row.quantity.unwrap_or_else(|| {
                tier_medians
                    .get(&row.classification)
                    .copied()
                    .unwrap_or(normalize_config.fallback_quantity)
                    .max(0.0)
            });
            let severity = severity::classify(
                row.classification,
                &row.reason_text,
                &classify_config.boost_keywords,
            );
            CleanRecord {
                recall_number: row.recall_number,
                report_date: row.report_date,
                classification: row.classification,
                severity,
                quantity,
                reason_text: row.reason_text,
                category: row.category,
            }
        })
        .collect();

    (records, dropped)
}

/// Median of a non-empty slice; sorts in place.
fn median_of(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
