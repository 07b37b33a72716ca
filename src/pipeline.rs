//! Pipeline entry point.
//!
//! `build_dataset` is the single function external consumers (dashboard,
//! notebook, scripts) call: fetch with retry/fallback, normalize, classify,
//! and hand back the immutable dataset. The dataset is rebuilt wholesale on
//! every call — there is no incremental update.

use chrono::NaiveDate;

use crate::config::PipelineConfig;
use crate::ingest::{self, OpenFdaSource, RecordSource};
use crate::logging;
use crate::model::{Dataset, FetchError};
use crate::normalize;

/// Builds the recall dataset for a date range from the given source.
///
/// Failure surface:
/// - transient API trouble is retried, then absorbed into the bundled
///   sample (`used_fallback = true`);
/// - per-record parse problems are absorbed into `dropped_count`;
/// - an error is returned only for an invalid query or when the sample
///   itself cannot be loaded.
pub fn build_dataset(
    config: &PipelineConfig,
    source: &dyn RecordSource,
    start_date: NaiveDate,
    end_date: NaiveDate,
    limit: u32,
) -> Result<Dataset, FetchError> {
    let outcome = ingest::fetch_with_fallback(source, &config.fetch, start_date, end_date, limit)?;

    let (records, dropped_count) =
        normalize::normalize_records(outcome.records, &config.classify, &config.normalize);

    logging::log_build_summary(records.len(), dropped_count, outcome.used_fallback);

    Ok(Dataset {
        records,
        dropped_count,
        used_fallback: outcome.used_fallback,
    })
}

/// `build_dataset` against the live openFDA API.
pub fn build_dataset_live(
    config: &PipelineConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
    limit: u32,
) -> Result<Dataset, FetchError> {
    let source = OpenFdaSource::new(config.fetch.clone())?;
    build_dataset(config, &source, start_date, end_date, limit)
}
