// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Qubit states, operators and the linear algebra shared by the solvers.
//!
//! - [`SystemSize`]: one- or two-qubit tag carried by every value
//! - [`QuantumState`], [`Operator`]: shape-checked wrappers over `ndarray`
//! - [`algebra`]: Kronecker product, dagger, expectation values
//! - [`pauli`]: σx, σy, σz, σ₋ and their two-qubit extensions
//! - [`expm`]: Padé(13) matrix exponential for step propagators

pub mod algebra;
pub mod expm;
pub mod pauli;
pub mod types;

pub use expm::{matrix_exp, propagator};
pub use types::{Operator, QuantumState, SystemSize};
