// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use rand::Rng;

use crate::domain::sampling::RandomSource;

/// Thread-local RNG behind the randomness seam. Production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn sample(&self) -> f64 {
        rand::rng().random_range(0.0..1.0)
    }
}
