// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Single-qubit operator constructors and their tensor extensions.
//!
//! Basis convention: |0⟩ = (1, 0)ᵀ, |1⟩ = (0, 1)ᵀ, σz = diag(1, -1).
//! The lowering operator σ₋ = |0⟩⟨1| takes |1⟩ to |0⟩.

use num_complex::Complex64;

use super::types::{Operator, SystemSize};
use crate::error::Result;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// σx.
pub fn sigma_x() -> Operator {
    Operator::qubit([[ZERO, ONE], [ONE, ZERO]])
}

/// σy.
pub fn sigma_y() -> Operator {
    Operator::qubit([[ZERO, -I], [I, ZERO]])
}

/// σz.
pub fn sigma_z() -> Operator {
    Operator::qubit([[ONE, ZERO], [ZERO, -ONE]])
}

/// σ₋ = |0⟩⟨1|, the qubit annihilation operator.
pub fn sigma_minus() -> Operator {
    Operator::qubit([[ZERO, ONE], [ZERO, ZERO]])
}

/// Identity on `size`.
pub fn identity(size: SystemSize) -> Operator {
    Operator::identity(size)
}

/// O ⊗ I (acting on the first qubit).
pub fn on_first(op: &Operator) -> Result<Operator> {
    op.tensor(&identity(SystemSize::OneQubit))
}

/// I ⊗ O (acting on the second qubit).
pub fn on_second(op: &Operator) -> Result<Operator> {
    identity(SystemSize::OneQubit).tensor(op)
}

/// Observables recorded per time step.
///
/// One qubit: [σx, σy, σz].
/// Two qubits: [σx⊗I, I⊗σx, σz⊗I, I⊗σz].
pub fn observables(size: SystemSize) -> Result<Vec<Operator>> {
    match size {
        SystemSize::OneQubit => Ok(vec![sigma_x(), sigma_y(), sigma_z()]),
        SystemSize::TwoQubit => Ok(vec![
            on_first(&sigma_x())?,
            on_second(&sigma_x())?,
            on_first(&sigma_z())?,
            on_second(&sigma_z())?,
        ]),
    }
}
