/// Recall record ingestion.
///
/// Submodules:
/// - `openfda` — openFDA drug-enforcement API client (query DSL, paging,
///   response parsing).
/// - `sample`  — bundled read-only fallback dataset.
///
/// This module owns the retry-with-backoff-then-fallback orchestration,
/// expressed as an explicit state machine rather than nested error
/// handling: Attempting(n), Succeeded, FellBack, FatallyFailed.
///
/// # Sleep injection
/// The retry loop takes a `sleep: &mut dyn FnMut(Duration)` parameter so
/// tests can record backoff delays without waiting them out. Production
/// callers use `fetch_with_fallback`, which sleeps for real.

pub mod openfda;
pub mod sample;

pub use openfda::{EnforcementQuery, RawRecord};

use std::time::Duration;

use chrono::NaiveDate;

use crate::config::FetchConfig;
use crate::logging::{self, DataSource};
use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Record sources
// ---------------------------------------------------------------------------

/// A page-oriented source of raw enforcement records.
///
/// The live API client implements this; tests substitute deterministic
/// sources to exercise the retry and fallback paths offline.
pub trait RecordSource {
    fn fetch_page(&self, query: &EnforcementQuery) -> Result<Vec<RawRecord>, FetchError>;
}

/// The live openFDA source: a blocking HTTP client plus fetch settings.
pub struct OpenFdaSource {
    client: reqwest::blocking::Client,
    config: FetchConfig,
}

impl OpenFdaSource {
    pub fn new(config: FetchConfig) -> Result<OpenFdaSource, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(OpenFdaSource { client, config })
    }
}

impl RecordSource for OpenFdaSource {
    fn fetch_page(&self, query: &EnforcementQuery) -> Result<Vec<RawRecord>, FetchError> {
        openfda::fetch_page(&self.client, &self.config, query)
    }
}

// ---------------------------------------------------------------------------
// Fetch outcome & state machine
// ---------------------------------------------------------------------------

/// Result of a whole-range fetch: the records plus where they came from.
/// Fallback is signalled, never raised; downstream layers surface the
/// degraded-data warning.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub records: Vec<RawRecord>,
    pub used_fallback: bool,
}

enum FetchState {
    /// Attempt `n` (1-based) of the live fetch is about to run.
    Attempting(u32),
    Succeeded(Vec<RawRecord>),
    FellBack(Vec<RawRecord>),
    FatallyFailed(FetchError),
}

/// Backoff before retry `attempt + 1`: doubles each time so every delay is
/// strictly greater than the previous. `base_ms` is floored at 1 to keep
/// that guarantee even under a zero-configured base.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64 << (attempt - 1).min(16);
    Duration::from_millis(base_ms.max(1).saturating_mul(factor))
}

/// Fetches the full requested range from the live source, paging via `skip`
/// when the limit exceeds the API's per-request maximum. No retry here:
/// the state machine above retries the whole range, keeping live and
/// sample datasets from ever mixing.
fn fetch_live(
    source: &dyn RecordSource,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_limit: u32,
) -> Result<Vec<RawRecord>, FetchError> {
    let mut records: Vec<RawRecord> = Vec::new();
    let mut skip = 0u32;

    while (records.len() as u32) < total_limit {
        let page_limit = (total_limit - records.len() as u32).min(openfda::PAGE_LIMIT);
        let query = EnforcementQuery::new(start_date, end_date, page_limit)?.page(skip, page_limit);
        let page = source.fetch_page(&query)?;
        let page_len = page.len() as u32;
        records.extend(page);
        if page_len < page_limit {
            break; // short page: the range is exhausted
        }
        skip += page_len;
    }

    Ok(records)
}

/// Fetches enforcement records for a date range with bounded-backoff retry,
/// falling back to the bundled sample when the retry budget is exhausted.
///
/// Error contract (see `FetchError`):
/// - transient failures retry up to `config.max_attempts`, then fall back;
/// - malformed responses fall back immediately, without retry;
/// - an invalid query is returned as an error, never served from sample;
/// - only live failure AND sample failure is fatal.
pub fn fetch_with_fallback(
    source: &dyn RecordSource,
    config: &FetchConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
    limit: u32,
) -> Result<FetchOutcome, FetchError> {
    fetch_with_fallback_with(source, config, start_date, end_date, limit, &mut |d| {
        std::thread::sleep(d)
    })
}

/// `fetch_with_fallback` with an injected sleeper. Use this in tests to
/// keep retry behaviour deterministic and instant.
pub fn fetch_with_fallback_with(
    source: &dyn RecordSource,
    config: &FetchConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
    limit: u32,
    sleep: &mut dyn FnMut(Duration),
) -> Result<FetchOutcome, FetchError> {
    // Validate up front: a caller bug must surface as an error, not as a
    // silent switch to sample data.
    EnforcementQuery::new(start_date, end_date, limit)?;
    let total_limit = limit.min(openfda::MAX_RECORDS);

    let mut state = FetchState::Attempting(1);
    loop {
        state = match state {
            FetchState::Attempting(attempt) => {
                match fetch_live(source, start_date, end_date, total_limit) {
                    Ok(records) => FetchState::Succeeded(records),
                    Err(err) if err.is_transient() && attempt < config.max_attempts => {
                        let delay = backoff_delay(config.base_backoff_ms, attempt);
                        logging::warn(
                            DataSource::OpenFda,
                            None,
                            &format!(
                                "attempt {}/{} failed ({}); retrying in {} ms",
                                attempt,
                                config.max_attempts,
                                err,
                                delay.as_millis()
                            ),
                        );
                        sleep(delay);
                        FetchState::Attempting(attempt + 1)
                    }
                    Err(err) => {
                        logging::log_fetch_failure("enforcement fetch", &err);
                        match sample::load_sample() {
                            Ok(records) => FetchState::FellBack(records),
                            Err(sample_err) => FetchState::FatallyFailed(
                                FetchError::FallbackUnavailable(format!(
                                    "live: {}; sample: {}",
                                    err, sample_err
                                )),
                            ),
                        }
                    }
                }
            }
            FetchState::Succeeded(records) => {
                logging::info(
                    DataSource::OpenFda,
                    None,
                    &format!("fetched {} enforcement records", records.len()),
                );
                return Ok(FetchOutcome { records, used_fallback: false });
            }
            FetchState::FellBack(records) => {
                logging::warn(
                    DataSource::Sample,
                    None,
                    &format!("using bundled sample dataset ({} records)", records.len()),
                );
                return Ok(FetchOutcome { records, used_fallback: true });
            }
            FetchState::FatallyFailed(err) => return Err(err),
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
