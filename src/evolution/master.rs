// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! RK4 integrator for the Lindblad master equation.
//!
//! Integrates dρ/dt = -i[H, ρ] + Σ_k D[L_k](ρ) with classical 4th-order
//! Runge–Kutta, `substeps` steps per grid interval. The Monte Carlo average
//! converges to this solution as the trajectory count grows, so it serves
//! as the deterministic reference for open-system datasets.
//!
//! Ref: Press et al., "Numerical Recipes" (2007), §17.1.

use ndarray::Array2;
use num_complex::Complex64;

use super::check_sizes;
use super::types::TimeGrid;
use crate::error::{Error, Result};
use crate::hamiltonian::CollapseOperator;
use crate::quantum::{algebra, Operator, QuantumState};
use crate::validation;

/// Allowed |Tr ρ − 1| after integration.
const TRACE_TOLERANCE: f64 = 1e-6;

/// dρ/dt for a time-independent Hamiltonian.
fn lindblad_rhs(
    hamiltonian: &Array2<Complex64>,
    channels: &[(Array2<Complex64>, Array2<Complex64>)],
    rho: &Array2<Complex64>,
) -> Array2<Complex64> {
    let i = Complex64::new(0.0, 1.0);
    let half = Complex64::new(0.5, 0.0);

    // -i[H, ρ]
    let mut out = (hamiltonian.dot(rho) - rho.dot(hamiltonian)) * (-i);

    // D[L](ρ) with √γ folded into L: L ρ L† − ½{L†L, ρ}
    for (l, l_dag) in channels {
        let l_dag_l = l_dag.dot(l);
        out = out + l.dot(rho).dot(l_dag) - (l_dag_l.dot(rho) + rho.dot(&l_dag_l)) * half;
    }
    out
}

fn rk4_step(
    rho: &Array2<Complex64>,
    hamiltonian: &Array2<Complex64>,
    channels: &[(Array2<Complex64>, Array2<Complex64>)],
    dt: f64,
) -> Array2<Complex64> {
    let dt_c = Complex64::new(dt, 0.0);
    let half = Complex64::new(0.5, 0.0);
    let sixth = Complex64::new(1.0 / 6.0, 0.0);
    let two = Complex64::new(2.0, 0.0);

    let k1 = lindblad_rhs(hamiltonian, channels, rho);
    let rho2 = rho + &(half * dt_c * &k1);
    let k2 = lindblad_rhs(hamiltonian, channels, &rho2);
    let rho3 = rho + &(half * dt_c * &k2);
    let k3 = lindblad_rhs(hamiltonian, channels, &rho3);
    let rho4 = rho + &(dt_c * &k3);
    let k4 = lindblad_rhs(hamiltonian, channels, &rho4);

    rho + &(sixth * dt_c * (k1 + two * k2 + two * k3 + k4))
}

fn trace_real(rho: &Array2<Complex64>) -> f64 {
    rho.diag().iter().map(|z| z.re).sum()
}

/// Tr(Oρ), real part.
fn expectation(op: &Array2<Complex64>, rho: &Array2<Complex64>) -> f64 {
    trace_real(&op.dot(rho))
}

/// Evolve ρ₀ = |ψ₀⟩⟨ψ₀| under the Lindblad equation and record Tr(O_j ρ).
///
/// Returns a `(grid.len(), observables.len())` table.
pub fn evolve_master_equation(
    hamiltonian: &Operator,
    collapse_ops: &[CollapseOperator],
    psi0: &QuantumState,
    grid: &TimeGrid,
    observables: &[Operator],
    substeps: usize,
) -> Result<Array2<f64>> {
    validation::require_nonzero("substeps", substeps)?;
    let size = check_sizes(hamiltonian, psi0, observables)?;
    if let Some(op) = collapse_ops.iter().find(|op| op.size() != size) {
        return Err(Error::DimensionMismatch {
            context: format!("collapse operator '{}'", op.label),
            expected: size.dim(),
            actual: op.size().dim(),
        });
    }

    let h = hamiltonian.matrix();
    let channels: Vec<_> = collapse_ops
        .iter()
        .filter(|op| op.rate > 0.0)
        .map(|op| {
            let l = op.scaled();
            let l_dag = algebra::dagger(&l);
            (l, l_dag)
        })
        .collect();

    let psi = psi0.amplitudes();
    let psi_col = psi.clone().insert_axis(ndarray::Axis(1));
    let psi_row = psi.mapv(|z| z.conj()).insert_axis(ndarray::Axis(0));
    let mut rho = psi_col.dot(&psi_row);

    let mut table = Array2::zeros((grid.len(), observables.len()));
    let record = |table: &mut Array2<f64>, k: usize, rho: &Array2<Complex64>| -> Result<()> {
        validation::check_norm(trace_real(rho), TRACE_TOLERANCE, k)?;
        let mut row = table.row_mut(k);
        for (value, op) in row.iter_mut().zip(observables) {
            *value = expectation(op.matrix(), rho);
        }
        validation::check_expectations(row.view(), TRACE_TOLERANCE, k)
    };

    record(&mut table, 0, &rho)?;
    for (k, dt) in grid.intervals().enumerate() {
        let step = dt / substeps as f64;
        for _ in 0..substeps {
            rho = rk4_step(&rho, h, &channels, step);
        }
        record(&mut table, k + 1, &rho)?;
    }
    Ok(table)
}
