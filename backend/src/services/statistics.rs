use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::models::PricePoint;

/// Which correlation formula the service reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    /// Asymmetric formula kept for compatibility with previously published figures:
    /// `cov / (Σ(x-x̄)² * sqrt(Σ(y-ȳ)² / (n-1)))`.
    #[default]
    Legacy,
    /// Textbook sample Pearson coefficient.
    Pearson,
}

impl FromStr for CorrelationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(CorrelationMethod::Legacy),
            "pearson" => Ok(CorrelationMethod::Pearson),
            other => Err(format!("unknown correlation method '{}', expected 'legacy' or 'pearson'", other)),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationMethod::Legacy => write!(f, "legacy"),
            CorrelationMethod::Pearson => write!(f, "pearson"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undetermined {
    /// One of the series had no samples.
    InsufficientData,
    /// One of the series was flat.
    ZeroVariance,
    NotANumber,
}

/// Outcome of a correlation computation.
///
/// The HTTP layer reports `Undetermined` as `0`, the same value clients have always seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correlation {
    Value(f64),
    Undetermined(Undetermined),
}

impl Correlation {
    pub fn value_or_zero(&self) -> f64 {
        match self {
            Correlation::Value(v) => *v,
            Correlation::Undetermined(_) => 0.0,
        }
    }
}

/// Arithmetic mean of the prices, `0` for an empty series.
pub fn average(series: &[PricePoint]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let total: f64 = series.iter().map(|p| p.price).sum();
    total / series.len() as f64
}

/// Correlation using the legacy formula, `0` when undetermined.
pub fn correlation(series_a: &[PricePoint], series_b: &[PricePoint]) -> f64 {
    correlate(series_a, series_b, CorrelationMethod::Legacy).value_or_zero()
}

/// Sample Pearson coefficient, `0` when undetermined.
pub fn pearson(series_a: &[PricePoint], series_b: &[PricePoint]) -> f64 {
    correlate(series_a, series_b, CorrelationMethod::Pearson).value_or_zero()
}

/// Correlates two series position by position.
///
/// Both series are cut to the shorter length by keeping their first samples;
/// timestamps are not aligned. The result is rounded to two decimals.
pub fn correlate(series_a: &[PricePoint], series_b: &[PricePoint], method: CorrelationMethod) -> Correlation {
    if series_a.is_empty() || series_b.is_empty() {
        warn!("Insufficient price data for correlation");
        return Correlation::Undetermined(Undetermined::InsufficientData);
    }

    let n = series_a.len().min(series_b.len());
    let x: Vec<f64> = series_a[..n].iter().map(|p| p.price).collect();
    let y: Vec<f64> = series_b[..n].iter().map(|p| p.price).collect();

    debug!("Calculating {} correlation for {} data points", method, n);

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let diff_x = xi - mean_x;
        let diff_y = yi - mean_y;
        covariance += diff_x * diff_y;
        sum_sq_x += diff_x * diff_x;
        sum_sq_y += diff_y * diff_y;
    }

    // n == 1 gives 0/0 here; the zero-variance check below catches it first.
    let dof = (n - 1) as f64;
    covariance /= dof;

    let (spread_x, spread_y) = match method {
        CorrelationMethod::Legacy => (sum_sq_x, (sum_sq_y / dof).sqrt()),
        CorrelationMethod::Pearson => ((sum_sq_x / dof).sqrt(), (sum_sq_y / dof).sqrt()),
    };

    if spread_x == 0.0 || spread_y == 0.0 {
        warn!("Standard deviation is zero, cannot calculate correlation");
        return Correlation::Undetermined(Undetermined::ZeroVariance);
    }

    let rounded = round_to(covariance / (spread_x * spread_y), 2);
    if rounded.is_nan() {
        return Correlation::Undetermined(Undetermined::NotANumber);
    }

    debug!("Correlation calculated: {}", rounded);
    Correlation::Value(rounded)
}

/// Rounds half away from zero. Values that round to zero come back as `+0.0`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
