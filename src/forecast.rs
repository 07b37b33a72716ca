//! Forecasting collaborator interface.
//!
//! Forecasting is an external collaborator: it consumes the dense
//! (gap-free) daily series produced by `analysis::groupings` and returns
//! point/interval forecasts. This module specifies only that seam — the
//! model's internals live elsewhere.

use chrono::NaiveDate;

/// One forecasted day: point estimate with a prediction interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// A forecasting collaborator.
///
/// `series` is regularly spaced daily data with no gaps (see
/// `analysis::groupings::dense_daily_series`); implementations may assume
/// consecutive dates. `horizon_days` is how many days past the end of the
/// series to forecast.
pub trait Forecaster {
    fn forecast(&self, series: &[(NaiveDate, u64)], horizon_days: u32) -> Vec<ForecastPoint>;
}
