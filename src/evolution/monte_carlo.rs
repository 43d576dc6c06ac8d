// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Monte Carlo wave-function (quantum-jump) solver.
//!
//! Each trajectory evolves under the non-Hermitian effective Hamiltonian
//!
//!   H_eff = H − (i/2) Σ_k γ_k L_k†L_k
//!
//! whose norm decays monotonically. A uniform threshold r is drawn at the
//! start and after every jump; once ⟨ψ|ψ⟩ falls below r a jump occurs,
//! choosing channel k with probability ∝ ‖√γ_k L_k ψ‖², after which the
//! state is renormalized. Expectations are read from a normalized copy at
//! each grid point and averaged over all trajectories.
//!
//! Ref: Dalibard, Castin & Mølmer, PRL 68, 580 (1992).

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use super::types::{TimeGrid, Tolerances};
use super::{check_sizes, observable_matrices, same_interval};
use crate::error::{Error, InstabilityKind, InstabilityReport, Result};
use crate::hamiltonian::CollapseOperator;
use crate::quantum::{algebra, propagator, Operator, QuantumState, SystemSize};
use crate::random::{RandomSource, RngMode};
use crate::validation;

/// Total jump weight below which a jump is treated as a pure renormalization.
const MIN_JUMP_WEIGHT: f64 = 1e-300;

/// Monte Carlo solver parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloConfig {
    /// Trajectories averaged per initial state
    pub num_trajectories: usize,
    /// Integration sub-steps per grid interval
    pub substeps: usize,
    /// Drift tolerances for the averaged output
    pub tolerances: Tolerances,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_trajectories: 250,
            substeps: 20,
            tolerances: Tolerances::default(),
        }
    }
}

impl MonteCarloConfig {
    /// Validate counts.
    pub fn validate(&self) -> Result<()> {
        validation::require_nonzero("mc_samples", self.num_trajectories)?;
        validation::require_nonzero("substeps", self.substeps)
    }
}

/// Quantum-jump solver for amplitude-damped dynamics.
#[derive(Debug, Clone)]
pub struct MonteCarloSolver {
    config: MonteCarloConfig,
}

/// Precomputed, read-only dynamics shared by every trajectory.
///
/// Built once per Hamiltonian with [`MonteCarloSolver::prepare`] and reused
/// for every initial state evolved under it.
pub struct JumpModel {
    size: SystemSize,
    /// Distinct sub-step propagators exp(-i H_eff δt)
    propagators: Vec<Array2<Complex64>>,
    /// Index into `propagators` per grid interval
    schedule: Vec<usize>,
    /// √γ_k L_k per channel
    jumps: Vec<Array2<Complex64>>,
    observables: Vec<Array2<Complex64>>,
    substeps: usize,
    num_points: usize,
}

impl MonteCarloSolver {
    /// Solver with validated parameters.
    pub fn new(config: MonteCarloConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Solver parameters.
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Average ⟨O_j⟩ over `num_trajectories` quantum-jump trajectories.
    ///
    /// Shorthand for [`prepare`](Self::prepare) followed by
    /// [`evolve_prepared`](Self::evolve_prepared).
    pub fn evolve_open(
        &self,
        hamiltonian: &Operator,
        collapse_ops: &[CollapseOperator],
        psi0: &QuantumState,
        grid: &TimeGrid,
        observables: &[Operator],
        rng: &mut RandomSource,
    ) -> Result<Array2<f64>> {
        check_sizes(hamiltonian, psi0, observables)?;
        let model = self.prepare(hamiltonian, collapse_ops, grid, observables)?;
        self.evolve_prepared(&model, psi0, rng)
    }

    /// Precompute H_eff propagators and jump operators for one Hamiltonian.
    ///
    /// One propagator is computed per distinct interval width.
    pub fn prepare(
        &self,
        hamiltonian: &Operator,
        collapse_ops: &[CollapseOperator],
        grid: &TimeGrid,
        observables: &[Operator],
    ) -> Result<JumpModel> {
        let size = hamiltonian.size();
        let mismatch = |context: String, actual: SystemSize| Error::DimensionMismatch {
            context,
            expected: size.dim(),
            actual: actual.dim(),
        };
        if let Some(op) = observables.iter().find(|op| op.size() != size) {
            return Err(mismatch("observable".into(), op.size()));
        }
        if let Some(op) = collapse_ops.iter().find(|op| op.size() != size) {
            return Err(mismatch(format!("collapse operator '{}'", op.label), op.size()));
        }

        let mut h_eff = hamiltonian.matrix().clone();
        let minus_half_i = Complex64::new(0.0, -0.5);
        for op in collapse_ops {
            h_eff = h_eff + op.rate_weighted_number() * minus_half_i;
        }

        let substeps = self.config.substeps;
        let mut propagators = Vec::new();
        let mut schedule = Vec::with_capacity(grid.len());
        let mut last: Option<(f64, usize)> = None;
        for dt in grid.intervals() {
            let delta = dt / substeps as f64;
            let index = match last {
                Some((width, index)) if same_interval(width, delta) => index,
                _ => {
                    trace!(delta, "Computing effective sub-step propagator");
                    propagators.push(propagator(&h_eff, delta)?);
                    propagators.len() - 1
                }
            };
            last = Some((delta, index));
            schedule.push(index);
        }

        Ok(JumpModel {
            size,
            propagators,
            schedule,
            jumps: collapse_ops.iter().map(|op| op.scaled()).collect(),
            observables: observable_matrices(observables),
            substeps,
            num_points: grid.len(),
        })
    }

    /// Average ⟨O_j⟩ for `psi0` under prepared dynamics.
    ///
    /// Randomness comes only from `rng`. In [`RngMode::PerTask`] one child
    /// generator per trajectory is drawn up front and the trajectories run
    /// on the rayon pool; per-trajectory tables are summed in trajectory
    /// order so the result does not depend on thread scheduling.
    pub fn evolve_prepared(
        &self,
        model: &JumpModel,
        psi0: &QuantumState,
        rng: &mut RandomSource,
    ) -> Result<Array2<f64>> {
        if psi0.size() != model.size {
            return Err(Error::DimensionMismatch {
                context: "initial state".into(),
                expected: model.size.dim(),
                actual: psi0.size().dim(),
            });
        }
        let n = self.config.num_trajectories;
        let psi0 = psi0.amplitudes();

        let runs: Vec<Array2<f64>> = match rng.mode() {
            RngMode::Sequential => (0..n)
                .map(|_| model.run(psi0, &mut *rng))
                .collect::<Result<_>>()?,
            RngMode::PerTask => rng
                .children(n)
                .into_par_iter()
                .map(|mut child| model.run(psi0, &mut child))
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<_>>()?,
        };

        let mut mean = Array2::zeros((model.num_points, model.observables.len()));
        for run in &runs {
            mean += run;
        }
        mean /= n as f64;

        for (k, row) in mean.rows().into_iter().enumerate() {
            validation::check_expectations(row, self.config.tolerances.expectation, k)?;
        }
        debug!(
            trajectories = n,
            channels = model.jumps.len(),
            points = model.num_points,
            "Monte Carlo average complete"
        );
        Ok(mean)
    }
}

impl JumpModel {
    /// One stochastic trajectory.
    fn run<R: Rng + ?Sized>(&self, psi0: &Array1<Complex64>, rng: &mut R) -> Result<Array2<f64>> {
        let mut table = Array2::zeros((self.num_points, self.observables.len()));
        let mut psi = psi0.clone();
        let mut threshold: f64 = rng.gen();

        self.record(&mut table, 0, &psi)?;
        for (k, &index) in self.schedule.iter().enumerate() {
            let u = &self.propagators[index];
            for _ in 0..self.substeps {
                psi = u.dot(&psi);
                if algebra::norm_sqr(&psi) <= threshold {
                    psi = self.jump(&psi, rng, k + 1)?;
                    threshold = rng.gen();
                }
            }
            self.record(&mut table, k + 1, &psi)?;
        }
        Ok(table)
    }

    /// Apply a randomly chosen jump and renormalize.
    fn jump<R: Rng + ?Sized>(
        &self,
        psi: &Array1<Complex64>,
        rng: &mut R,
        time_index: usize,
    ) -> Result<Array1<Complex64>> {
        let candidates: Vec<Array1<Complex64>> = self.jumps.iter().map(|c| c.dot(psi)).collect();
        let weights: Vec<f64> = candidates.iter().map(algebra::norm_sqr).collect();
        let total: f64 = weights.iter().sum();

        let chosen = if total > MIN_JUMP_WEIGHT {
            let mut pick = rng.gen::<f64>() * total;
            let mut chosen = None;
            for (candidate, &w) in candidates.iter().zip(&weights) {
                if w > 0.0 && pick < w {
                    chosen = Some(candidate);
                    break;
                }
                pick -= w;
            }
            // Round-off can leave `pick` past the last weight
            chosen.or_else(|| {
                candidates
                    .iter()
                    .zip(&weights)
                    .rev()
                    .find(|(_, w)| **w > 0.0)
                    .map(|(candidate, _)| candidate)
            })
        } else {
            None
        };

        algebra::normalize(chosen.unwrap_or(psi)).ok_or_else(|| {
            Error::NumericalInstability(InstabilityReport::at_time(
                time_index,
                InstabilityKind::NormDrift {
                    norm_sqr: algebra::norm_sqr(psi),
                },
            ))
        })
    }

    fn record(
        &self,
        table: &mut Array2<f64>,
        time_index: usize,
        psi: &Array1<Complex64>,
    ) -> Result<()> {
        let norm_sqr = algebra::norm_sqr(psi);
        if !(norm_sqr > 0.0 && norm_sqr.is_finite()) {
            return Err(Error::NumericalInstability(InstabilityReport::at_time(
                time_index,
                InstabilityKind::NormDrift { norm_sqr },
            )));
        }
        for (value, op) in table.row_mut(time_index).iter_mut().zip(&self.observables) {
            *value = algebra::normalized_expectation(op, psi);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::amplitude_damping_channels;
    use crate::quantum::pauli;
    use crate::test_utils::excited_state;
    use approx::assert_relative_eq;

    fn solver(num_trajectories: usize) -> MonteCarloSolver {
        MonteCarloSolver::new(MonteCarloConfig {
            num_trajectories,
            substeps: 10,
            tolerances: Tolerances::default(),
        })
        .unwrap()
    }

    fn zero_hamiltonian() -> Operator {
        Operator::zeros(SystemSize::OneQubit)
    }

    #[test]
    fn test_zero_trajectories_rejected() {
        let config = MonteCarloConfig {
            num_trajectories: 0,
            ..MonteCarloConfig::default()
        };
        assert!(MonteCarloSolver::new(config).is_err());
        let config = MonteCarloConfig {
            substeps: 0,
            ..MonteCarloConfig::default()
        };
        assert!(MonteCarloSolver::new(config).is_err());
    }

    #[test]
    fn test_zero_rate_matches_closed_evolution() {
        let h = pauli::sigma_x();
        let ops = amplitude_damping_channels(SystemSize::OneQubit, 0.0).unwrap();
        let psi = QuantumState::ground(SystemSize::OneQubit);
        let grid = TimeGrid::linspace(0.0, 2.0, 21).unwrap();
        let obs = pauli::observables(SystemSize::OneQubit).unwrap();
        let mut rng = RandomSource::seeded(3, RngMode::Sequential);
        let table = solver(4)
            .evolve_open(&h, &ops, &psi, &grid, &obs, &mut rng)
            .unwrap();
        for (k, &t) in grid.points().iter().enumerate() {
            assert_relative_eq!(table[[k, 2]], (2.0 * t).cos(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_excited_state_relaxes_towards_ground() {
        let ops = amplitude_damping_channels(SystemSize::OneQubit, 0.5).unwrap();
        let grid = TimeGrid::linspace(0.0, 4.0, 41).unwrap();
        let obs = vec![pauli::sigma_z()];
        let mut rng = RandomSource::seeded(11, RngMode::Sequential);
        let table = solver(1000)
            .evolve_open(&zero_hamiltonian(), &ops, &excited_state(), &grid, &obs, &mut rng)
            .unwrap();
        // ⟨σz⟩(t) = 1 − 2e^{−γt}
        assert_relative_eq!(table[[0, 0]], -1.0, epsilon = 1e-12);
        for (k, &t) in grid.points().iter().enumerate() {
            let exact = 1.0 - 2.0 * (-0.5 * t).exp();
            assert!(
                (table[[k, 0]] - exact).abs() < 0.15,
                "t = {t}: {} vs {exact}",
                table[[k, 0]]
            );
        }
    }

    #[test]
    fn test_same_seed_same_result_in_both_modes() {
        let ops = amplitude_damping_channels(SystemSize::OneQubit, 0.3).unwrap();
        let grid = TimeGrid::linspace(0.0, 2.0, 11).unwrap();
        let obs = pauli::observables(SystemSize::OneQubit).unwrap();
        let h = pauli::sigma_x();
        for mode in [RngMode::Sequential, RngMode::PerTask] {
            let run = |seed| {
                let mut rng = RandomSource::seeded(seed, mode);
                solver(32)
                    .evolve_open(&h, &ops, &excited_state(), &grid, &obs, &mut rng)
                    .unwrap()
            };
            assert_eq!(run(5), run(5));
        }
    }

    #[test]
    fn test_two_qubit_channels_decay_both_qubits() {
        let ops = amplitude_damping_channels(SystemSize::TwoQubit, 1.0).unwrap();
        // |11⟩
        let mut amps = Array1::zeros(4);
        amps[3] = Complex64::new(1.0, 0.0);
        let psi = QuantumState::new(SystemSize::TwoQubit, amps).unwrap();
        let obs = pauli::observables(SystemSize::TwoQubit).unwrap();
        let grid = TimeGrid::linspace(0.0, 6.0, 13).unwrap();
        let mut rng = RandomSource::seeded(2, RngMode::PerTask);
        let table = solver(200)
            .evolve_open(
                &Operator::zeros(SystemSize::TwoQubit),
                &ops,
                &psi,
                &grid,
                &obs,
                &mut rng,
            )
            .unwrap();
        let last = grid.len() - 1;
        assert_relative_eq!(table[[0, 2]], -1.0, epsilon = 1e-12);
        assert!(table[[last, 2]] > 0.9);
        assert!(table[[last, 3]] > 0.9);
    }

    #[test]
    fn test_mismatched_collapse_operator_rejected() {
        let ops = amplitude_damping_channels(SystemSize::TwoQubit, 0.1).unwrap();
        let grid = TimeGrid::linspace(0.0, 1.0, 3).unwrap();
        let mut rng = RandomSource::seeded(0, RngMode::Sequential);
        let err = solver(2)
            .evolve_open(
                &zero_hamiltonian(),
                &ops,
                &excited_state(),
                &grid,
                &[pauli::sigma_z()],
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_linspace_grid_needs_one_propagator() {
        let ops = amplitude_damping_channels(SystemSize::OneQubit, 0.02).unwrap();
        let grid = TimeGrid::linspace(0.0, 10.0, 300).unwrap();
        let model = solver(1)
            .prepare(&pauli::sigma_x(), &ops, &grid, &[pauli::sigma_z()])
            .unwrap();
        assert_eq!(model.propagators.len(), 1);
        assert_eq!(model.schedule.len(), 299);

        let uneven = TimeGrid::from_points(vec![0.0, 0.5, 1.0, 2.0]).unwrap();
        let model = solver(1)
            .prepare(&pauli::sigma_x(), &ops, &uneven, &[pauli::sigma_z()])
            .unwrap();
        assert_eq!(model.propagators.len(), 2);
        assert_eq!(model.schedule, vec![0, 0, 1]);
    }

    #[test]
    fn test_prepared_model_reused_across_states() {
        let ops = amplitude_damping_channels(SystemSize::OneQubit, 0.3).unwrap();
        let grid = TimeGrid::linspace(0.0, 2.0, 11).unwrap();
        let obs = pauli::observables(SystemSize::OneQubit).unwrap();
        let h = pauli::sigma_x();
        let mc = solver(16);
        let model = mc.prepare(&h, &ops, &grid, &obs).unwrap();

        for psi in [excited_state(), QuantumState::ground(SystemSize::OneQubit)] {
            let mut a = RandomSource::seeded(8, RngMode::PerTask);
            let mut b = RandomSource::seeded(8, RngMode::PerTask);
            let prepared = mc.evolve_prepared(&model, &psi, &mut a).unwrap();
            let direct = mc.evolve_open(&h, &ops, &psi, &grid, &obs, &mut b).unwrap();
            assert_eq!(prepared, direct);
        }
    }

    #[test]
    fn test_prepared_model_rejects_wrong_state_size() {
        let ops = amplitude_damping_channels(SystemSize::TwoQubit, 0.1).unwrap();
        let grid = TimeGrid::linspace(0.0, 1.0, 3).unwrap();
        let mc = solver(2);
        let model = mc
            .prepare(&Operator::zeros(SystemSize::TwoQubit), &ops, &grid, &[])
            .unwrap();
        let mut rng = RandomSource::seeded(0, RngMode::Sequential);
        let err = mc
            .evolve_prepared(&model, &excited_state(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }
}
