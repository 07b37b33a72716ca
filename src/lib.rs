//! Recall monitoring pipeline.
//!
//! Fetches FDA drug-enforcement (recall) reports from the openFDA API with
//! retry/backoff and a bundled-sample fallback, normalizes them into an
//! invariant-bearing record set, derives a three-level severity label, and
//! aggregates the tables and series consumed by charting, dashboard, and
//! forecasting layers. Execution is single-threaded and synchronous; the
//! dataset is rebuilt wholesale on each run and is immutable afterwards.

/// Aggregation: time buckets, cross-tabs, statistics.
pub mod analysis;
/// Explicit pipeline configuration, loadable from TOML.
pub mod config;
/// Forecasting collaborator interface.
pub mod forecast;
/// openFDA client, bundled sample, retry/fallback orchestration.
pub mod ingest;
/// Structured logging.
pub mod logging;
/// Shared domain types and the fetch error taxonomy.
pub mod model;
/// Raw-record flattening, date parsing, quantity imputation.
pub mod normalize;
/// The `build_dataset` entry point.
pub mod pipeline;
/// Severity derivation from classification tier and reason text.
pub mod severity;
