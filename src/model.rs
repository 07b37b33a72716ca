/// Core data types for the recall monitoring pipeline.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic and no I/O, only types.

use chrono::NaiveDate;

use crate::severity::{Classification, Severity};

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// The normalized, invariant-bearing form of one openFDA enforcement record.
///
/// Produced by `normalize::normalize_records` from a `ingest::openfda::RawRecord`.
/// Every `CleanRecord` carries a parseable report date (undated records are
/// dropped during normalization, not defaulted), a non-negative quantity, and
/// exactly one derived severity label.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    /// FDA recall event identifier, e.g. "D-0123-2024". Empty if absent.
    pub recall_number: String,
    /// Date the recall report was received by FDA.
    pub report_date: NaiveDate,
    /// Raw FDA classification tier, if it was present and recognized.
    pub classification: Option<Classification>,
    /// Derived three-level risk label. Never user-supplied; a deterministic
    /// function of classification and reason text (see `severity::classify`).
    pub severity: Severity,
    /// Quantity of product involved. Imputed when absent; never negative.
    pub quantity: f64,
    /// Free-form recall reason. May be empty.
    pub reason_text: String,
    /// Product category used for cross-tabulation, e.g. "Drugs".
    /// "Unknown" when the API record carried no category.
    pub category: String,
}

/// The artifact handed to all downstream consumers (charts, stats, forecast).
///
/// Rebuilt wholesale on each fetch cycle and treated as immutable after
/// construction; there is no incremental update or deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Ordered sequence of normalized records.
    pub records: Vec<CleanRecord>,
    /// Records dropped during normalization (unparseable report date).
    pub dropped_count: usize,
    /// True when the live fetch failed and the bundled sample was used.
    pub used_fallback: bool,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching openFDA enforcement data.
///
/// Per-record parse problems are never represented here; those are absorbed
/// into `Dataset::dropped_count` during normalization. Only whole-fetch
/// failures appear, and of these only `FallbackUnavailable` is fatal to the
/// pipeline; everything else resolves to the bundled sample dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Caller violated the fetch contract (start after end, zero limit).
    /// Never retried and never served from fallback: a bad query is a bug
    /// in the caller, not a data-source outage.
    InvalidQuery(String),
    /// Non-2xx HTTP response from the openFDA API.
    HttpError(u16),
    /// HTTP 429 — the API is rate-limiting us.
    RateLimited,
    /// The request could not be completed (DNS, connect, timeout).
    Network(String),
    /// The response body could not be deserialized. Not retried.
    MalformedResponse(String),
    /// Both the live fetch and the bundled sample failed. Fatal.
    FallbackUnavailable(String),
}

impl FetchError {
    /// Transient errors are retried with backoff; everything else triggers
    /// immediate fallback.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::InvalidQuery(_) => false,
            FetchError::HttpError(code) => *code >= 500,
            FetchError::RateLimited => true,
            FetchError::Network(_) => true,
            FetchError::MalformedResponse(_) => false,
            FetchError::FallbackUnavailable(_) => false,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidQuery(msg) => write!(f, "Invalid query: {}", msg),
            FetchError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FetchError::RateLimited => write!(f, "Rate limited by API (HTTP 429)"),
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            FetchError::FallbackUnavailable(msg) => {
                write!(f, "Live fetch failed and fallback dataset unusable: {}", msg)
            }
        }
    }
}

impl std::error::Error for FetchError {}
