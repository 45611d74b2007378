//! Exponential Moving Average (EMA) over a finite window.
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1)
//! Seed: EMA[0] = x[0]. Every output index is populated, so a short window still
//! yields a full series; callers decide how much history is enough.

/// EMA of `values` seeded with the first value. Empty in, empty out.
pub fn ema_seeded(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return out;
    };
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = first;
    out.push(first);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_input() {
        let out = ema_seeded(&[100.0, 200.0, 300.0], 1);
        assert_eq!(out, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5
        // [10, 12, 14] → 10, 11, 12.5
        let out = ema_seeded(&[10.0, 12.0, 14.0], 3);
        assert_approx(out[0], 10.0, DEFAULT_EPSILON);
        assert_approx(out[1], 11.0, DEFAULT_EPSILON);
        assert_approx(out[2], 12.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_of_empty_is_empty() {
        assert!(ema_seeded(&[], 5).is_empty());
    }
}
