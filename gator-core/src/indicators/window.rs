//! Bounded rolling window and the population statistics computed over it.
//!
//! Every lookback in the engine is one of these, owned by the component that
//! reads it. Nothing grows without bound and nothing is shared between
//! tracked instruments.

use std::collections::VecDeque;

/// Fixed-capacity FIFO of `f64` observations. Pushing into a full window
/// evicts the oldest value.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be >= 1");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Push a value, returning the evicted one if the window was full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.values.len() == self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(value);
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Most recent value.
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Value `n` pushes ago (`0` is the most recent).
    pub fn back(&self, n: usize) -> Option<f64> {
        self.values.len().checked_sub(n + 1).and_then(|i| self.values.get(i).copied())
    }

    /// The newest `n` values, oldest first. `None` if fewer than `n` are held.
    pub fn tail(&self, n: usize) -> Option<Vec<f64>> {
        let len = self.values.len();
        if n > len {
            return None;
        }
        Some(self.values.iter().skip(len - n).copied().collect())
    }

    /// All held values, oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Mean of the held values, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        mean(self.values.iter().copied())
    }

    /// Population standard deviation of the held values, `None` when empty.
    pub fn std_dev(&self) -> Option<f64> {
        population_std(self.values.iter().copied())
    }
}

/// Arithmetic mean. `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Population standard deviation (divides by `n`). `None` for an empty input.
///
/// Identical values give exactly zero, independent of rounding in the mean.
pub fn population_std(values: impl IntoIterator<Item = f64> + Clone) -> Option<f64> {
    let mut iter = values.clone().into_iter();
    let first = iter.next()?;
    if iter.all(|v| v == first) {
        return Some(0.0);
    }
    let m = mean(values.clone())?;
    let (sq, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + (v - m) * (v - m), c + 1));
    Some((sq / count as f64).sqrt())
}
