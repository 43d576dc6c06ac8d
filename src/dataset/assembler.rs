// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dataset assembly.
//!
//! For each batch a fresh Hamiltonian is sampled and every initial state is
//! evolved under it. Initial states are sampled once per dataset and shared
//! by all batches. Each (batch, state) trajectory is written to its own slot
//! of the output tensor exactly once.

use std::path::PathBuf;

use ndarray::{s, Array2, Array3};
use rayon::prelude::*;
use tracing::{debug, info};

use super::types::TrajectoryDataset;
use super::DatasetType;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::evolution::{ClosedEvolutionSolver, JumpModel, MonteCarloSolver, TimeGrid};
use crate::hamiltonian::{amplitude_damping_channels, DampingRate, HamiltonianBuilder};
use crate::quantum::{pauli, Operator, QuantumState, SystemSize};
use crate::random::{RandomSource, RngMode};
use crate::sampling::{SamplingMode, StateSampler};

/// Builds trajectory datasets from a validated configuration.
#[derive(Debug, Clone)]
pub struct DatasetAssembler {
    size: SystemSize,
    dataset_type: DatasetType,
    num_batches: usize,
    batched_samples: usize,
    validation_samples: usize,
    sampler: StateSampler,
    builder: HamiltonianBuilder,
    grid: TimeGrid,
    cutoff: f64,
    closed: ClosedEvolutionSolver,
    /// Present only for simulated open datasets
    monte_carlo: Option<MonteCarloSolver>,
    damping: DampingRate,
    load_from_file: Option<PathBuf>,
}

/// Dynamics shared by every initial state of one batch.
enum BatchDynamics<'a> {
    Closed(Operator),
    Open {
        solver: &'a MonteCarloSolver,
        model: JumpModel,
    },
}

impl DatasetAssembler {
    /// Assembler for `config`; rejects invalid configuration up front.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let d = &config.dataset;
        let monte_carlo = match (d.dataset_type, &d.load_from_file) {
            (DatasetType::Open, None) => Some(MonteCarloSolver::new(config.monte_carlo())?),
            _ => None,
        };
        Ok(Self {
            size: d.system,
            dataset_type: d.dataset_type,
            num_batches: d.num_batches,
            batched_samples: d.batched_samples,
            validation_samples: d.validation_samples,
            sampler: StateSampler::new(d.sampling),
            builder: HamiltonianBuilder::new(d.system, d.coupling)?,
            grid: config.time_grid()?,
            cutoff: d.stop,
            closed: ClosedEvolutionSolver::new(config.tolerances()),
            monte_carlo,
            damping: config.damping_rate(),
            load_from_file: d.load_from_file.clone(),
        })
    }

    /// Replace the evenly spaced grid with an arbitrary one.
    ///
    /// The training cutoff must still fall within the new grid.
    pub fn with_time_grid(mut self, grid: TimeGrid) -> Result<Self> {
        grid.truncated(self.cutoff)?;
        self.grid = grid;
        Ok(self)
    }

    /// Time grid every trajectory is recorded on.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Initial states per batch.
    pub fn samples_per_batch(&self) -> usize {
        match self.size {
            SystemSize::OneQubit => self.batched_samples * self.batched_samples,
            SystemSize::TwoQubit => self.batched_samples,
        }
    }

    /// Build the dataset, or load it when a source file is configured.
    ///
    /// Any error aborts the whole build; no partial dataset is returned.
    pub fn build(&self, rng: &mut RandomSource) -> Result<TrajectoryDataset> {
        if let Some(path) = &self.load_from_file {
            debug!(
                path = %path.display(),
                cutoff = self.cutoff,
                "Loading dataset instead of simulating"
            );
            return TrajectoryDataset::load_json(path, self.cutoff);
        }

        let samples = self.samples_per_batch();
        let num_observables = self.size.num_observables();
        info!(
            system = %self.size,
            dataset_type = %self.dataset_type,
            num_trajectories = self.num_batches * samples,
            time_steps = self.grid.len(),
            rng_mode = ?rng.mode(),
            "Building trajectory dataset"
        );

        let initial_states = self.sampler.sample_for(self.size, self.batched_samples, rng)?;
        let validation_states = StateSampler::new(SamplingMode::Grid).sample_for(
            self.size,
            self.validation_samples,
            rng,
        )?;
        let observables = pauli::observables(self.size)?;

        let mut trajectories =
            Array3::zeros((self.num_batches * samples, self.grid.len(), num_observables));
        let mut parameters = Vec::with_capacity(self.num_batches);

        for batch in 0..self.num_batches {
            let mut params = self.builder.sample_parameters(rng);
            if self.dataset_type == DatasetType::Open {
                params.damping_rate = Some(self.damping.resolve(rng));
            }
            debug!(
                batch,
                z = params.z,
                x = params.x,
                damping_rate = ?params.damping_rate,
                "Simulating batch"
            );

            let hamiltonian = self.builder.build(&params)?;
            let dynamics = match (&self.monte_carlo, params.damping_rate) {
                (Some(solver), Some(gamma)) => {
                    let channels = amplitude_damping_channels(self.size, gamma)?;
                    BatchDynamics::Open {
                        solver,
                        model: solver.prepare(&hamiltonian, &channels, &self.grid, &observables)?,
                    }
                }
                _ => BatchDynamics::Closed(hamiltonian),
            };

            let tables = self
                .evolve_batch(&dynamics, &initial_states.states, &observables, rng)
                .map_err(|(sample, e)| e.at_trajectory(batch, sample))?;

            for (sample, table) in tables.iter().enumerate() {
                trajectories
                    .slice_mut(s![batch * samples + sample, .., ..])
                    .assign(table);
            }
            parameters.push(params);
        }

        let mut dataset = TrajectoryDataset::from_parts(
            self.dataset_type,
            trajectories,
            self.grid.clone(),
            self.cutoff,
            parameters,
        )?;
        dataset.initial_states = Some(initial_states);
        dataset.validation_states = Some(validation_states);

        info!(
            num_trajectories = dataset.num_trajectories(),
            train_steps = dataset.train_grid().len(),
            "Dataset complete"
        );
        Ok(dataset)
    }

    /// Evolve every initial state under one batch's dynamics.
    ///
    /// Errors carry the index of the failing state. When several fail, the
    /// lowest index is reported in both RNG modes.
    fn evolve_batch(
        &self,
        dynamics: &BatchDynamics<'_>,
        states: &[QuantumState],
        observables: &[Operator],
        rng: &mut RandomSource,
    ) -> std::result::Result<Vec<Array2<f64>>, (usize, Error)> {
        let evolve_one = |sample: usize, psi0: &QuantumState, rng: &mut RandomSource| {
            let result = match dynamics {
                BatchDynamics::Closed(h) => {
                    self.closed.evolve(h, psi0, &self.grid, observables)
                }
                BatchDynamics::Open { solver, model } => {
                    solver.evolve_prepared(model, psi0, rng)
                }
            };
            result.map_err(|e| (sample, e))
        };

        match rng.mode() {
            RngMode::Sequential => states
                .iter()
                .enumerate()
                .map(|(sample, psi0)| evolve_one(sample, psi0, &mut *rng))
                .collect(),
            RngMode::PerTask => rng
                .children(states.len())
                .into_par_iter()
                .zip(states.par_iter().enumerate())
                .map(|(mut child, (sample, psi0))| evolve_one(sample, psi0, &mut child))
                .collect::<Vec<_>>()
                // First failure in sample order, whatever the scheduling
                .into_iter()
                .collect(),
        }
    }
}
