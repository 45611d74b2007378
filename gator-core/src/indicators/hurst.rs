//! Hurst exponent estimate from lagged differences.
//!
//! For each lag in `2..max_lag`, tau(lag) = sqrt(std(x[lag..] - x[..n-lag])).
//! H is the slope of the least-squares line through (ln lag, ln tau).
//! H > 0.5 suggests persistence, H < 0.5 mean reversion, H = 0.5 a random walk.

use super::window::population_std;

/// Value returned whenever the estimate is not meaningful.
pub const NEUTRAL_HURST: f64 = 0.5;

/// Shortest series worth estimating.
pub const MIN_HURST_LEN: usize = 10;

/// Estimate the Hurst exponent of `series`.
///
/// `max_lag` defaults to `len / 2` and is always clamped to `len - 2`.
/// Degenerate inputs (too short, flat, fewer than two usable lags) return
/// [`NEUTRAL_HURST`].
pub fn hurst_exponent(series: &[f64], max_lag: Option<usize>) -> f64 {
    let n = series.len();
    if n < MIN_HURST_LEN {
        return NEUTRAL_HURST;
    }

    let mut max_lag = max_lag.unwrap_or((n / 2).max(2)).min(n - 2);
    if n < max_lag + 2 {
        max_lag = (n / 3).max(2);
        if n < max_lag + 2 {
            return NEUTRAL_HURST;
        }
    }

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for lag in 2..max_lag {
        let diffs = series[lag..].iter().zip(series).map(|(a, b)| a - b);
        let Some(std) = population_std(diffs) else {
            continue;
        };
        let tau = std.sqrt();
        if tau > 0.0 && tau.is_finite() {
            xs.push((lag as f64).ln());
            ys.push(tau.ln());
        }
    }

    if xs.len() < 2 {
        return NEUTRAL_HURST;
    }
    least_squares_slope(&xs, &ys).unwrap_or(NEUTRAL_HURST)
}

/// Slope of the ordinary least-squares fit `y = a + b x`.
fn least_squares_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }
    if sxx == 0.0 {
        None
    } else {
        Some(sxy / sxx)
    }
}
