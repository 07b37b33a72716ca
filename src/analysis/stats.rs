//! Descriptive and inferential statistics over the recall dataset.
//!
//! Implements the chi-square independence test used on the severity ×
//! category cross-tab, the headline summary statistics (mean/quantiles of
//! quantity, proportion high-severity), and a Pearson correlation helper
//! for paired numeric series. Degenerate inputs (empty tables, zero
//! margins, zero variance) return `None`, a defined "undefined" marker
//! consumers render as such, never a numeric error.

use crate::analysis::groupings::CrossTab;
use crate::model::CleanRecord;
use crate::severity::Severity;

// ---------------------------------------------------------------------------
// Chi-square independence test
// ---------------------------------------------------------------------------

/// Result of a chi-square test of independence.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
}

/// Chi-square test of independence over a contingency table.
///
/// Rows and columns whose margin is zero carry no information and are
/// removed before computing expected counts (they would otherwise divide
/// by zero). Returns `None`, the undefined-statistic marker, when fewer
/// than two informative rows or columns remain.
pub fn chi_square_independence(table: &CrossTab) -> Option<ChiSquareTest> {
    let observed = &table.counts;
    if observed.is_empty() || observed[0].is_empty() {
        return None;
    }

    let row_sums: Vec<u64> = observed.iter().map(|row| row.iter().sum()).collect();
    let col_sums: Vec<u64> = (0..observed[0].len())
        .map(|j| observed.iter().map(|row| row[j]).sum())
        .collect();

    let rows: Vec<usize> = (0..row_sums.len()).filter(|&i| row_sums[i] > 0).collect();
    let cols: Vec<usize> = (0..col_sums.len()).filter(|&j| col_sums[j] > 0).collect();
    if rows.len() < 2 || cols.len() < 2 {
        return None;
    }

    let total: u64 = row_sums.iter().sum();
    let total = total as f64;

    let mut statistic = 0.0;
    for &i in &rows {
        for &j in &cols {
            let expected = (row_sums[i] as f64) * (col_sums[j] as f64) / total;
            let delta = observed[i][j] as f64 - expected;
            statistic += delta * delta / expected;
        }
    }

    let degrees_of_freedom = (rows.len() - 1) * (cols.len() - 1);
    let p_value = regularized_gamma_q(degrees_of_freedom as f64 / 2.0, statistic / 2.0);

    Some(ChiSquareTest { statistic, degrees_of_freedom, p_value })
}

// ---------------------------------------------------------------------------
// Regularized incomplete gamma (chi-square survival function)
// ---------------------------------------------------------------------------
// Q(a, x) = Γ(a, x) / Γ(a). The chi-square p-value is Q(dof/2, stat/2).
// Series expansion for x < a + 1, continued fraction otherwise.

fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut series = 1.000000000190015;
    for coeff in COEFFS {
        y += 1.0;
        series += coeff / y;
    }
    -tmp + (2.5066282746310005 * series / x).ln()
}

fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut sum = 1.0 / a;
    let mut term = sum;
    for _ in 0..200 {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * 1e-12 {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

fn gamma_q_fraction(a: f64, x: f64) -> f64 {
    const TINY: f64 = 1e-300;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..200u32 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < 1e-12 {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

pub(crate) fn regularized_gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_fraction(a, x)
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Distribution of the quantity field across the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantitySummary {
    pub mean: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Headline KPIs for the dashboard. Fields are `None` when the dataset is
/// empty, so consumers render a "no data" state instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_records: usize,
    pub quantity: Option<QuantitySummary>,
    pub high_severity_share: Option<f64>,
}

/// Computes summary statistics over the record sequence.
pub fn summarize(records: &[CleanRecord]) -> SummaryStats {
    if records.is_empty() {
        return SummaryStats {
            total_records: 0,
            quantity: None,
            high_severity_share: None,
        };
    }

    let mut quantities: Vec<f64> = records.iter().map(|r| r.quantity).collect();
    quantities.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = quantities.len() as f64;
    let mean = quantities.iter().sum::<f64>() / n;

    let high = records
        .iter()
        .filter(|r| r.severity == Severity::High)
        .count();

    SummaryStats {
        total_records: records.len(),
        quantity: Some(QuantitySummary {
            mean,
            min: quantities[0],
            p25: quantile(&quantities, 0.25),
            median: quantile(&quantities, 0.5),
            p75: quantile(&quantities, 0.75),
            max: quantities[quantities.len() - 1],
        }),
        high_severity_share: Some(high as f64 / n),
    }
}

/// Linear-interpolation quantile over a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient between two paired series.
/// Returns `None` for mismatched lengths, fewer than two points, or a
/// zero-variance series (correlation is undefined there).
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::severity::Classification;

    fn tab(counts: Vec<Vec<u64>>) -> CrossTab {
        let cols = counts.first().map(|r| r.len()).unwrap_or(0);
        CrossTab {
            severities: Severity::ALL.to_vec(),
            categories: (0..cols).map(|i| format!("c{}", i)).collect(),
            counts,
        }
    }

    fn record(severity: Severity, quantity: f64) -> CleanRecord {
        CleanRecord {
            recall_number: String::new(),
            report_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            classification: Some(Classification::II),
            severity,
            quantity,
            reason_text: String::new(),
            category: "Drugs".to_string(),
        }
    }

    #[test]
    fn test_chi_square_known_two_by_two_table() {
        // Rows 10/20 vs 20/10, all expected counts 15:
        // statistic = 4 * (5^2 / 15) = 6.667, dof = 1, p ≈ 0.0098.
        let table = tab(vec![vec![10, 20], vec![20, 10], vec![0, 0]]);
        let test = chi_square_independence(&table).expect("informative table");
        assert!((test.statistic - 6.6667).abs() < 0.001, "got {}", test.statistic);
        assert_eq!(test.degrees_of_freedom, 1, "zero row is dropped before dof");
        assert!((test.p_value - 0.0098).abs() < 0.001, "got {}", test.p_value);
    }

    #[test]
    fn test_chi_square_of_independent_table_is_near_zero() {
        // Perfectly proportional rows: no association.
        let table = tab(vec![vec![10, 20], vec![20, 40], vec![30, 60]]);
        let test = chi_square_independence(&table).unwrap();
        assert!(test.statistic.abs() < 1e-9);
        assert!(test.p_value > 0.999);
        assert_eq!(test.degrees_of_freedom, 2);
    }

    #[test]
    fn test_chi_square_all_zero_table_is_undefined() {
        let table = tab(vec![vec![0, 0], vec![0, 0], vec![0, 0]]);
        assert_eq!(chi_square_independence(&table), None);
    }

    #[test]
    fn test_chi_square_single_informative_column_is_undefined() {
        let table = tab(vec![vec![5, 0], vec![7, 0], vec![3, 0]]);
        assert_eq!(chi_square_independence(&table), None);
    }

    #[test]
    fn test_chi_square_empty_table_is_undefined() {
        let table = tab(vec![Vec::new(), Vec::new(), Vec::new()]);
        assert_eq!(chi_square_independence(&table), None);
        assert_eq!(chi_square_independence(&tab(Vec::new())), None);
    }

    #[test]
    fn test_gamma_q_matches_chi_square_critical_value() {
        // chi2 = 3.841 at dof 1 is the classic 5% critical value.
        let p = regularized_gamma_q(0.5, 3.841 / 2.0);
        assert!((p - 0.05).abs() < 0.002, "got {}", p);
        // chi2 = 5.991 at dof 2 is likewise 5%.
        let p = regularized_gamma_q(1.0, 5.991 / 2.0);
        assert!((p - 0.05).abs() < 0.002, "got {}", p);
    }

    #[test]
    fn test_gamma_q_boundaries() {
        assert_eq!(regularized_gamma_q(1.0, 0.0), 1.0);
        assert!(regularized_gamma_q(1.0, 100.0) < 1e-12);
    }

    #[test]
    fn test_summary_quantiles_interpolate() {
        let records: Vec<CleanRecord> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .map(|&q| record(Severity::Low, q))
            .collect();
        let summary = summarize(&records);
        let quantity = summary.quantity.expect("non-empty dataset");
        assert_eq!(quantity.min, 1.0);
        assert_eq!(quantity.p25, 1.75);
        assert_eq!(quantity.median, 2.5);
        assert_eq!(quantity.p75, 3.25);
        assert_eq!(quantity.max, 4.0);
        assert_eq!(quantity.mean, 2.5);
    }

    #[test]
    fn test_summary_high_severity_share() {
        let records = vec![
            record(Severity::High, 1.0),
            record(Severity::Medium, 1.0),
            record(Severity::Low, 1.0),
            record(Severity::High, 1.0),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.high_severity_share, Some(0.5));
    }

    #[test]
    fn test_summary_of_empty_dataset_is_marked_undefined() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.quantity, None);
        assert_eq!(summary.high_severity_share, None);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson_correlation(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined_cases() {
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(pearson_correlation(&[1.0], &[1.0]), None);
        assert_eq!(pearson_correlation(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), None);
    }
}
