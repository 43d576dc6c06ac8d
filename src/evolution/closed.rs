// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Closed-system (unitary) evolution.
//!
//! For time-independent H the state at each grid point is
//!
//!   |ψ(t_{k+1})⟩ = exp(-iH(t_{k+1} − t_k)) |ψ(t_k)⟩
//!
//! The propagator is recomputed only when the interval width changes, so a
//! uniform grid costs a single matrix exponential.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::trace;

use super::types::{TimeGrid, Tolerances};
use super::{check_sizes, observable_matrices, same_interval};
use crate::error::Result;
use crate::quantum::{algebra, propagator, Operator, QuantumState};
use crate::validation;

/// Schrödinger-equation solver producing expectation tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedEvolutionSolver {
    tolerances: Tolerances,
}

impl ClosedEvolutionSolver {
    /// Solver with the given drift tolerances.
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }

    /// Drift tolerances.
    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Evolve `psi0` under `hamiltonian` and record ⟨O_j⟩ at every grid point.
    ///
    /// Returns a `(grid.len(), observables.len())` table. Norm drift or an
    /// out-of-range expectation fails with
    /// [`Error::NumericalInstability`](crate::error::Error::NumericalInstability)
    /// carrying the offending time index.
    pub fn evolve(
        &self,
        hamiltonian: &Operator,
        psi0: &QuantumState,
        grid: &TimeGrid,
        observables: &[Operator],
    ) -> Result<Array2<f64>> {
        check_sizes(hamiltonian, psi0, observables)?;
        let obs = observable_matrices(observables);
        let mut table = Array2::zeros((grid.len(), obs.len()));

        let mut psi = psi0.amplitudes().clone();
        self.record(&mut table, 0, &psi, &obs)?;

        let mut cached: Option<(f64, Array2<Complex64>)> = None;
        for (k, dt) in grid.intervals().enumerate() {
            let reuse = matches!(&cached, Some((width, _)) if same_interval(*width, dt));
            if !reuse {
                trace!(interval = k, dt, "Computing propagator");
                cached = Some((dt, propagator(hamiltonian.matrix(), dt)?));
            }
            if let Some((_, u)) = &cached {
                psi = u.dot(&psi);
            }
            self.record(&mut table, k + 1, &psi, &obs)?;
        }

        Ok(table)
    }

    fn record(
        &self,
        table: &mut Array2<f64>,
        time_index: usize,
        psi: &Array1<Complex64>,
        observables: &[Array2<Complex64>],
    ) -> Result<()> {
        validation::check_norm(algebra::norm_sqr(psi), self.tolerances.norm, time_index)?;
        let mut row = table.row_mut(time_index);
        for (value, op) in row.iter_mut().zip(observables) {
            *value = algebra::expectation(op, psi).re;
        }
        validation::check_expectations(row.view(), self.tolerances.expectation, time_index)
    }
}
