// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Explicit random source threaded through sampling and stochastic solvers.
//!
//! Two reproducibility modes exist and are not interchangeable: the same
//! seed yields different (but individually reproducible) datasets in each.
//!
//! - [`RngMode::Sequential`]: one generator, consumed in program order on
//!   the calling thread.
//! - [`RngMode::PerTask`]: child seeds are drawn in order from the master
//!   generator before fanning out, and each task owns its own generator.
//!   Output is independent of the rayon thread count.

use rand::rngs::StdRng;
use rand::{Error as RandError, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// How randomness is distributed across work units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngMode {
    /// Single generator, serial execution
    Sequential,
    /// Independently seeded generator per task, parallel execution
    #[default]
    PerTask,
}

impl RngMode {
    /// Whether work units run on the rayon pool.
    pub fn is_parallel(self) -> bool {
        matches!(self, RngMode::PerTask)
    }
}

impl std::str::FromStr for RngMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(RngMode::Sequential),
            "per_task" | "per-task" | "pertask" => Ok(RngMode::PerTask),
            other => Err(format!("unknown rng mode '{}'", other)),
        }
    }
}

/// Seeded generator plus its reproducibility mode.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
    mode: RngMode,
}

impl RandomSource {
    /// Reproducible source.
    pub fn seeded(seed: u64, mode: RngMode) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            mode,
        }
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy(mode: RngMode) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            mode,
        }
    }

    /// Seeded when `seed` is set, OS entropy otherwise.
    pub fn new(seed: Option<u64>, mode: RngMode) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed, mode),
            None => Self::from_entropy(mode),
        }
    }

    /// Reproducibility mode.
    pub fn mode(&self) -> RngMode {
        self.mode
    }

    /// Independent child source for one task, same mode.
    pub fn child(&mut self) -> RandomSource {
        RandomSource::seeded(self.rng.next_u64(), self.mode)
    }

    /// `count` child sources, drawn in order.
    pub fn children(&mut self, count: usize) -> Vec<RandomSource> {
        (0..count).map(|_| self.child()).collect()
    }
}

impl RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), RandError> {
        self.rng.try_fill_bytes(dest)
    }
}
