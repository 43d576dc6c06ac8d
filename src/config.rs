// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for dataset generation.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. trajectories.yaml file
//! 3. Environment variables (QUBITOS_TRAJ_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::dataset::DatasetType;
use crate::error::Result;
use crate::evolution::{MonteCarloConfig, TimeGrid, Tolerances};
use crate::hamiltonian::{CouplingConstants, DampingRate};
use crate::quantum::SystemSize;
use crate::random::{RandomSource, RngMode};
use crate::sampling::SamplingMode;
use crate::validation;

/// Monte Carlo trajectory counts below this trigger a warning.
const LOW_MC_SAMPLES: usize = 50;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// What to simulate
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Solver parameters
    #[serde(default)]
    pub solver: SolverConfig,

    /// Random number generation
    #[serde(default)]
    pub random: RandomConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        // Load from file if specified
        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            // Try default locations
            for path in &["trajectories.yaml", "trajectories.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_TRAJ_NUM_BATCHES") {
            if let Ok(n) = val.parse() {
                self.dataset.num_batches = n;
            }
        }
        if let Ok(val) = env::var("QUBITOS_TRAJ_DATASET_TYPE") {
            if let Ok(kind) = val.parse() {
                self.dataset.dataset_type = kind;
            }
        }
        if let Ok(val) = env::var("QUBITOS_TRAJ_MC_SAMPLES") {
            if let Ok(n) = val.parse() {
                self.solver.mc_samples = n;
            }
        }
        if let Ok(val) = env::var("QUBITOS_TRAJ_GAMMA") {
            if let Ok(gamma) = val.parse() {
                self.solver.gamma = gamma;
            }
        }
        if let Ok(val) = env::var("QUBITOS_TRAJ_SEED") {
            if let Ok(seed) = val.parse() {
                self.random.seed = Some(seed);
            }
        }
        if let Ok(val) = env::var("QUBITOS_TRAJ_RNG_MODE") {
            if let Ok(mode) = val.parse() {
                self.random.mode = mode;
            }
        }
        if let Ok(val) = env::var("QUBITOS_TRAJ_LOAD_FROM_FILE") {
            self.dataset.load_from_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
        if let Ok(val) = env::var("QUBITOS_TRAJ_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Validate configuration.
    ///
    /// Every check here runs before any simulation starts.
    pub fn validate(&self) -> Result<()> {
        let d = &self.dataset;
        validation::validate_time_range(d.start, d.last, d.time_steps)?;
        validation::validate_cutoff(d.stop, d.start, d.last)?;

        for (field, value) in [
            ("coupling.omega", d.coupling.omega),
            ("coupling.delta", d.coupling.delta),
            ("coupling.j", d.coupling.j),
        ] {
            validation::require_finite(field, value)?;
        }

        if d.load_from_file.is_some() {
            // Nothing is simulated; counts and solver settings are unused.
            return Ok(());
        }

        validation::require_nonzero("num_batches", d.num_batches)?;
        validation::require_nonzero("batched_samples", d.batched_samples)?;
        validation::require_nonzero("validation_samples", d.validation_samples)?;

        let s = &self.solver;
        validation::require_finite("gamma", s.gamma)?;
        validation::require_positive("norm_tolerance", s.norm_tolerance)?;
        validation::require_positive("expectation_tolerance", s.expectation_tolerance)?;
        if d.dataset_type == DatasetType::Open {
            validation::require_nonzero("mc_samples", s.mc_samples)?;
            validation::require_nonzero("substeps", s.substeps)?;
            if s.mc_samples < LOW_MC_SAMPLES {
                tracing::warn!(
                    mc_samples = s.mc_samples,
                    "Few Monte Carlo trajectories; averaged dynamics will be noisy"
                );
            }
        }

        if d.stop == d.last {
            tracing::warn!(
                stop = d.stop,
                "Training cutoff equals the final time; training and full sets coincide"
            );
        }
        Ok(())
    }

    /// Full time grid.
    pub fn time_grid(&self) -> Result<TimeGrid> {
        TimeGrid::linspace(self.dataset.start, self.dataset.last, self.dataset.time_steps)
    }

    /// Solver drift tolerances.
    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            norm: self.solver.norm_tolerance,
            expectation: self.solver.expectation_tolerance,
        }
    }

    /// Monte Carlo solver parameters.
    pub fn monte_carlo(&self) -> MonteCarloConfig {
        MonteCarloConfig {
            num_trajectories: self.solver.mc_samples,
            substeps: self.solver.substeps,
            tolerances: self.tolerances(),
        }
    }

    /// Configured damping rate.
    pub fn damping_rate(&self) -> DampingRate {
        DampingRate::from_config(self.solver.gamma)
    }

    /// Random source for one dataset build.
    pub fn random_source(&self) -> RandomSource {
        RandomSource::new(self.random.seed, self.random.mode)
    }

    /// Effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// One or two qubits
    #[serde(default)]
    pub system: SystemSize,

    /// Closed (unitary) or open (amplitude-damped) dynamics
    #[serde(default)]
    pub dataset_type: DatasetType,

    /// Number of sampled Hamiltonians
    #[serde(default = "default_num_batches")]
    pub num_batches: usize,

    /// Bloch angles per axis (one qubit) or product states (two qubits)
    #[serde(default = "default_batched_samples")]
    pub batched_samples: usize,

    /// Bloch angles per axis for the grid-sampled validation set
    #[serde(default = "default_validation_samples")]
    pub validation_samples: usize,

    /// Angle sampling for the training states
    #[serde(default)]
    pub sampling: SamplingMode,

    /// First time point
    #[serde(default)]
    pub start: f64,

    /// Training cutoff (inclusive)
    #[serde(default = "default_stop")]
    pub stop: f64,

    /// Last time point
    #[serde(default = "default_last")]
    pub last: f64,

    /// Number of time points
    #[serde(default = "default_time_steps")]
    pub time_steps: usize,

    /// Two-qubit Hamiltonian constants
    #[serde(default)]
    pub coupling: CouplingConstants,

    /// Load a saved dataset instead of simulating
    #[serde(default)]
    pub load_from_file: Option<PathBuf>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            system: SystemSize::default(),
            dataset_type: DatasetType::default(),
            num_batches: default_num_batches(),
            batched_samples: default_batched_samples(),
            validation_samples: default_validation_samples(),
            sampling: SamplingMode::default(),
            start: 0.0,
            stop: default_stop(),
            last: default_last(),
            time_steps: default_time_steps(),
            coupling: CouplingConstants::default(),
            load_from_file: None,
        }
    }
}

fn default_num_batches() -> usize {
    30
}

fn default_batched_samples() -> usize {
    6
}

fn default_validation_samples() -> usize {
    10
}

fn default_stop() -> f64 {
    2.0
}

fn default_last() -> f64 {
    10.0
}

fn default_time_steps() -> usize {
    300
}

/// Solver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Monte Carlo trajectories per initial state
    #[serde(default = "default_mc_samples")]
    pub mc_samples: usize,

    /// Amplitude-damping rate; non-positive samples one per batch
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Monte Carlo sub-steps per grid interval
    #[serde(default = "default_substeps")]
    pub substeps: usize,

    /// Allowed |⟨ψ|ψ⟩ - 1|
    #[serde(default = "default_tolerance")]
    pub norm_tolerance: f64,

    /// Allowed excursion of expectations beyond [-1, 1]
    #[serde(default = "default_tolerance")]
    pub expectation_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mc_samples: default_mc_samples(),
            gamma: default_gamma(),
            substeps: default_substeps(),
            norm_tolerance: default_tolerance(),
            expectation_tolerance: default_tolerance(),
        }
    }
}

fn default_mc_samples() -> usize {
    250
}

fn default_gamma() -> f64 {
    0.02
}

fn default_substeps() -> usize {
    20
}

fn default_tolerance() -> f64 {
    1e-6
}

/// Random number generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RandomConfig {
    /// Master seed; OS entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Sequential or per-task generators
    #[serde(default)]
    pub mode: RngMode,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}
