/// Aggregation utilities for the recall dataset.
///
/// Everything here consumes the immutable `CleanRecord` sequence produced
/// by one pipeline run and returns plain tables/series for the chart,
/// dashboard, and forecasting consumers. Empty input always produces
/// defined empty aggregates: a "no data" state, never a failure.
///
/// Submodules:
/// - `groupings` — time-bucketed severity counts and the severity × category
///   cross-tab.
/// - `stats` — chi-square independence test, summary statistics, correlation.

pub mod groupings;
pub mod stats;
