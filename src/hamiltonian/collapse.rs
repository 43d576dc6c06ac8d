// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Amplitude-damping collapse operators.
//!
//! A channel with rate γ and jump operator L contributes
//!
//!   D[L](ρ) = γ (L ρ L† − ½{L†L, ρ})
//!
//! to the master equation, and √γ·L as a jump in the quantum-trajectory
//! picture. Amplitude damping uses L = σ₋ = |0⟩⟨1| on each qubit.
//!
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use ndarray::Array2;
use num_complex::Complex64;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::error::{Error, Result};
use crate::quantum::{algebra, pauli, Operator, SystemSize};

/// Range for auto-sampled damping rates.
pub const AUTO_DAMPING_RANGE: (f64, f64) = (0.01, 0.05);

/// A dissipation channel: jump operator plus rate.
#[derive(Debug, Clone)]
pub struct CollapseOperator {
    /// Jump operator L (without the rate).
    pub operator: Operator,
    /// Rate γ ≥ 0.
    pub rate: f64,
    /// Human-readable label (e.g. "damping_q0").
    pub label: String,
}

impl CollapseOperator {
    /// Channel with a validated non-negative rate.
    pub fn new(operator: Operator, rate: f64, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        if !(rate >= 0.0 && rate.is_finite()) {
            return Err(Error::config(
                "gamma",
                format!("collapse operator '{}' has invalid rate {}", label, rate),
            ));
        }
        Ok(Self {
            operator,
            rate,
            label,
        })
    }

    /// √γ·L.
    pub fn scaled(&self) -> Array2<Complex64> {
        self.operator.matrix() * Complex64::new(self.rate.sqrt(), 0.0)
    }

    /// γ·L†L.
    pub fn rate_weighted_number(&self) -> Array2<Complex64> {
        let l = self.operator.matrix();
        algebra::dagger(l).dot(l) * Complex64::new(self.rate, 0.0)
    }

    /// Size tag of the jump operator.
    pub fn size(&self) -> SystemSize {
        self.operator.size()
    }
}

/// Per-qubit amplitude damping at rate `gamma`.
///
/// One qubit: [σ₋]. Two qubits: [σ₋⊗I, I⊗σ₋].
pub fn amplitude_damping_channels(size: SystemSize, gamma: f64) -> Result<Vec<CollapseOperator>> {
    let lower = pauli::sigma_minus();
    match size {
        SystemSize::OneQubit => Ok(vec![CollapseOperator::new(lower, gamma, "damping_q0")?]),
        SystemSize::TwoQubit => Ok(vec![
            CollapseOperator::new(pauli::on_first(&lower)?, gamma, "damping_q0")?,
            CollapseOperator::new(pauli::on_second(&lower)?, gamma, "damping_q1")?,
        ]),
    }
}

/// Configured damping rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DampingRate {
    /// Same γ for every batch
    Fixed(f64),
    /// γ ~ U[0.01, 0.05] per batch
    Auto,
}

impl DampingRate {
    /// Non-positive configured values select [`DampingRate::Auto`].
    pub fn from_config(gamma: f64) -> Self {
        if gamma > 0.0 {
            DampingRate::Fixed(gamma)
        } else {
            DampingRate::Auto
        }
    }

    /// Rate for one batch.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            DampingRate::Fixed(gamma) => gamma,
            DampingRate::Auto => {
                Uniform::new(AUTO_DAMPING_RANGE.0, AUTO_DAMPING_RANGE.1).sample(rng)
            }
        }
    }
}
