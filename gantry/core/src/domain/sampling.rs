// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Randomness seam for simulated metrics and placeholder estimates.
//!
//! Everything that jitters goes through [`RandomSource`] so deterministic
//! sequences can be substituted and exact threshold behavior asserted.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of uniform randomness.
pub trait RandomSource: Send + Sync {
    /// Uniform sample in [0, 1).
    fn sample(&self) -> f64;

    /// Uniform sample in [lo, hi).
    fn sample_range(&self, lo: f64, hi: f64) -> f64 {
        lo + self.sample() * (hi - lo)
    }
}

/// Replays a fixed sequence of unit-interval samples, cycling at the end.
/// Deterministic stand-in for tests and reproducible simulations.
#[derive(Debug, Default)]
pub struct FixedSource {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl FixedSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for FixedSource {
    fn sample(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[index]
    }
}
