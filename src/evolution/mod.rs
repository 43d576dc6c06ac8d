// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time evolution of qubit states.
//!
//! Every solver returns an expectation table of shape
//! `(grid.len(), observables.len())`, with row 0 evaluated on the initial
//! state.
//!
//! - [`ClosedEvolutionSolver`]: exact propagation under exp(-iHΔt)
//! - [`MonteCarloSolver`]: quantum-jump trajectories averaged over runs
//! - [`evolve_master_equation`]: RK4 Lindblad reference for the averaged
//!   open dynamics

pub mod closed;
pub mod master;
pub mod monte_carlo;
pub mod types;

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::quantum::{Operator, QuantumState, SystemSize};

pub use closed::ClosedEvolutionSolver;
pub use master::evolve_master_equation;
pub use monte_carlo::{JumpModel, MonteCarloConfig, MonteCarloSolver};
pub use types::{TimeGrid, Tolerances};

/// Relative width difference below which a cached propagator is reused.
const INTERVAL_REUSE_TOLERANCE: f64 = 1e-12;

/// Whether two interval widths share one propagator.
///
/// Linspace intervals differ by a few ulps, so exact equality would miss.
pub(crate) fn same_interval(cached: f64, dt: f64) -> bool {
    (cached - dt).abs() <= INTERVAL_REUSE_TOLERANCE * dt.abs().max(1.0)
}

/// Check that every operator and the state share one system size.
pub(crate) fn check_sizes(
    hamiltonian: &Operator,
    psi0: &QuantumState,
    observables: &[Operator],
) -> Result<SystemSize> {
    let size = hamiltonian.size();
    let mismatch = |context: &str, actual: SystemSize| Error::DimensionMismatch {
        context: context.to_string(),
        expected: size.dim(),
        actual: actual.dim(),
    };
    if psi0.size() != size {
        return Err(mismatch("initial state", psi0.size()));
    }
    if let Some(op) = observables.iter().find(|op| op.size() != size) {
        return Err(mismatch("observable", op.size()));
    }
    Ok(size)
}

/// Observable matrices in evaluation order.
pub(crate) fn observable_matrices(observables: &[Operator]) -> Vec<Array2<Complex64>> {
    observables.iter().map(|op| op.matrix().clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_intervals_share_one_width() {
        let grid = TimeGrid::linspace(0.0, 10.0, 300).unwrap();
        let first = grid.intervals().next().unwrap();
        assert!(grid.intervals().all(|dt| same_interval(first, dt)));
    }

    #[test]
    fn test_distinct_widths_not_shared() {
        assert!(!same_interval(0.1, 0.2));
        assert!(!same_interval(1e-3, 1e-3 + 1e-9));
        assert!(same_interval(0.5, 0.5 + 1e-15));
    }
}
