// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Trajectories
//!
//! Generates labeled datasets of qubit dynamics for training sequence
//! models: expectation values of Pauli observables over time, for randomly
//! sampled Hamiltonians and initial states, under closed (unitary) or
//! amplitude-damped evolution.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            DatasetAssembler              │
//! ├──────────────────┬──────────────────────┤
//! │   StateSampler   │  HamiltonianBuilder  │
//! │   (per dataset)  │  (per batch)         │
//! ├──────────────────┴──────────────────────┤
//! │              Evolution                   │
//! ├────────────────┬────────────────────────┤
//! │ Closed solver  │  Monte Carlo solver    │
//! │ (exp(-iHΔt))   │  (quantum jumps)       │
//! └────────────────┴────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`dataset`]: Assembly, training split and persistence
//! - [`evolution`]: Time grids and solvers
//! - [`hamiltonian`]: Randomized Hamiltonians and damping channels
//! - [`quantum`]: States, operators and linear algebra
//! - [`random`]: Explicit seeded randomness
//! - [`sampling`]: Initial-state sampling on the Bloch sphere
//! - [`validation`]: Input and numerical validation utilities
//! - [`error`]: Error types

pub mod config;
pub mod dataset;
pub mod error;
pub mod evolution;
pub mod hamiltonian;
pub mod quantum;
pub mod random;
pub mod sampling;
pub mod validation;

pub use config::Config;
pub use dataset::{DatasetAssembler, DatasetRecord, DatasetType, Split, TrajectoryDataset};
pub use error::{Error, Result};
pub use evolution::{ClosedEvolutionSolver, MonteCarloSolver, TimeGrid};
pub use hamiltonian::{HamiltonianBuilder, HamiltonianParameters};
pub use quantum::{Operator, QuantumState, SystemSize};
pub use random::{RandomSource, RngMode};
pub use sampling::StateSampler;

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
