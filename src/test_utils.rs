// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities.

use ndarray::Array2;
use num_complex::Complex64;

use crate::config::Config;
use crate::quantum::{QuantumState, SystemSize};
use crate::random::{RandomSource, RngMode};

/// Real scalar as Complex64.
pub fn c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// Check element-wise matrix equality within tolerance.
pub fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for ((i, j), val) in a.indexed_iter() {
        let diff = (val - b[[i, j]]).norm();
        assert!(
            diff < tol,
            "Mismatch at ({}, {}): {:?} vs {:?} (diff={})",
            i,
            j,
            val,
            b[[i, j]],
            diff
        );
    }
}

/// Deterministic generator for tests.
pub fn seeded(seed: u64) -> RandomSource {
    RandomSource::seeded(seed, RngMode::Sequential)
}

/// |1⟩.
pub fn excited_state() -> QuantumState {
    QuantumState::new(SystemSize::OneQubit, ndarray::array![c(0.0), c(1.0)])
        .expect("|1⟩ is a valid state")
}

/// A small, fast configuration: 2 batches × 4 Bloch states × 21 time steps.
pub fn small_config() -> Config {
    let mut config = Config::default();
    config.dataset.num_batches = 2;
    config.dataset.batched_samples = 2;
    config.dataset.validation_samples = 2;
    config.dataset.time_steps = 21;
    config.dataset.start = 0.0;
    config.dataset.last = 2.0;
    config.dataset.stop = 1.0;
    config.solver.mc_samples = 8;
    config.solver.substeps = 4;
    config.random.seed = Some(7);
    config
}
