//! Grouping and time-bucketing of clean records.
//!
//! Organizes the flat record sequence into the shapes the trend charts and
//! the forecasting collaborator consume: daily and monthly counts per
//! severity label, a dense (gap-free) daily total series, and the
//! severity × category cross-tab.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::model::CleanRecord;
use crate::severity::Severity;

// ---------------------------------------------------------------------------
// Severity counts
// ---------------------------------------------------------------------------

/// Record counts split by severity label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl SeverityCounts {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }

    pub fn total(&self) -> u64 {
        self.low + self.medium + self.high
    }
}

// ---------------------------------------------------------------------------
// Time buckets
// ---------------------------------------------------------------------------

/// One calendar day of severity counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub counts: SeverityCounts,
}

/// One calendar month of severity counts.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub counts: SeverityCounts,
}

/// Daily severity counts, date-ascending. Days with no recalls are absent;
/// use `dense_daily_series` for a gap-free series.
pub fn daily_counts(records: &[CleanRecord]) -> Vec<DailyBucket> {
    let mut buckets: BTreeMap<NaiveDate, SeverityCounts> = BTreeMap::new();
    for record in records {
        buckets.entry(record.report_date).or_default().record(record.severity);
    }
    buckets
        .into_iter()
        .map(|(date, counts)| DailyBucket { date, counts })
        .collect()
}

/// Monthly severity counts, (year, month)-ascending.
pub fn monthly_counts(records: &[CleanRecord]) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<(i32, u32), SeverityCounts> = BTreeMap::new();
    for record in records {
        let key = (record.report_date.year(), record.report_date.month());
        buckets.entry(key).or_default().record(record.severity);
    }
    buckets
        .into_iter()
        .map(|((year, month), counts)| MonthlyBucket { year, month, counts })
        .collect()
}

/// Total recalls per day over the full observed range, with missing days
/// zero-filled. This is the regularly-spaced series handed to the
/// forecasting collaborator, which requires no gaps.
pub fn dense_daily_series(daily: &[DailyBucket]) -> Vec<(NaiveDate, u64)> {
    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        return Vec::new();
    };

    let by_date: BTreeMap<NaiveDate, u64> =
        daily.iter().map(|b| (b.date, b.counts.total())).collect();

    let mut series = Vec::new();
    let mut cursor = first.date;
    while cursor <= last.date {
        series.push((cursor, by_date.get(&cursor).copied().unwrap_or(0)));
        match cursor.checked_add_days(Days::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    series
}

// ---------------------------------------------------------------------------
// Cross-tabulation
// ---------------------------------------------------------------------------

/// Severity × category contingency table.
///
/// Rows follow `Severity::ALL` (ascending); columns are the distinct
/// categories observed, sorted. `counts[row][col]` is the record count for
/// that severity/category pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub severities: Vec<Severity>,
    pub categories: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.counts.iter().flatten().all(|&c| c == 0)
    }
}

/// Cross-tabulates severity against product category.
pub fn crosstab_by_category(records: &[CleanRecord]) -> CrossTab {
    let mut categories: Vec<String> = records.iter().map(|r| r.category.clone()).collect();
    categories.sort();
    categories.dedup();

    let severities: Vec<Severity> = Severity::ALL.to_vec();
    let mut counts = vec![vec![0u64; categories.len()]; severities.len()];

    for record in records {
        let row = severities
            .iter()
            .position(|&s| s == record.severity)
            .unwrap_or(0);
        if let Ok(col) = categories.binary_search(&record.category) {
            counts[row][col] += 1;
        }
    }

    CrossTab { severities, categories, counts }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
