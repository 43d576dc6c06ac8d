// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Randomized Hamiltonians and amplitude-damping channels.
//!
//! One qubit:
//!
//!   H = a·σz + b·σx
//!
//! Two qubits:
//!
//!   H = (ω/2)a·σz⊗I + (δ/2)b·σx⊗I + (ω/2)a·I⊗σz + (δ/2)b·I⊗σx + J·σx⊗σx
//!
//! with a, b ~ U[1, 2.5] drawn fresh per batch and ω, δ, J fixed.

pub mod collapse;

use std::fmt;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::quantum::{pauli, Operator, SystemSize};

pub use collapse::{amplitude_damping_channels, CollapseOperator, DampingRate};

/// Range of the sampled z and x coefficients.
pub const COEFFICIENT_RANGE: (f64, f64) = (1.0, 2.5);

/// Tolerance for the post-construction Hermiticity check.
pub const HERMITICITY_TOLERANCE: f64 = 1e-12;

/// Fixed constants of the two-qubit Hamiltonian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplingConstants {
    /// Energy level splitting ω
    #[serde(default = "default_unit")]
    pub omega: f64,
    /// Transverse field δ
    #[serde(default = "default_unit")]
    pub delta: f64,
    /// σx⊗σx coupling J
    #[serde(default = "default_unit")]
    pub j: f64,
}

impl Default for CouplingConstants {
    fn default() -> Self {
        Self {
            omega: 1.0,
            delta: 1.0,
            j: 1.0,
        }
    }
}

fn default_unit() -> f64 {
    1.0
}

/// Coefficients sampled for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianParameters {
    /// σz coefficient a
    pub z: f64,
    /// σx coefficient b
    pub x: f64,
    /// Amplitude-damping rate γ (open datasets only)
    pub damping_rate: Option<f64>,
}

impl HamiltonianParameters {
    /// Closed-system parameters.
    pub fn new(z: f64, x: f64) -> Self {
        Self {
            z,
            x,
            damping_rate: None,
        }
    }

    /// Parameters as a row: [a, b] or [a, b, γ].
    pub fn to_row(&self) -> Vec<f64> {
        match self.damping_rate {
            Some(gamma) => vec![self.z, self.x, gamma],
            None => vec![self.z, self.x],
        }
    }

    /// Inverse of [`to_row`](Self::to_row).
    pub fn from_row(row: &[f64]) -> Option<Self> {
        match row {
            [z, x] => Some(Self::new(*z, *x)),
            [z, x, gamma] => Some(Self {
                z: *z,
                x: *x,
                damping_rate: Some(*gamma),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for HamiltonianParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H = {}z + {}x", self.z, self.x)?;
        if let Some(gamma) = self.damping_rate {
            write!(f, " decay: {}", gamma)?;
        }
        Ok(())
    }
}

/// Builds Hermitian Hamiltonians for one system size.
#[derive(Debug, Clone)]
pub struct HamiltonianBuilder {
    size: SystemSize,
    coupling: CouplingConstants,
}

impl HamiltonianBuilder {
    /// Builder for `size`; `coupling` only affects two-qubit Hamiltonians.
    pub fn new(size: SystemSize, coupling: CouplingConstants) -> Result<Self> {
        for (field, value) in [
            ("coupling.omega", coupling.omega),
            ("coupling.delta", coupling.delta),
            ("coupling.j", coupling.j),
        ] {
            if !value.is_finite() {
                return Err(Error::config(field, "must be finite"));
            }
        }
        Ok(Self { size, coupling })
    }

    /// Target system size.
    pub fn size(&self) -> SystemSize {
        self.size
    }

    /// Draw a, b ~ U[1, 2.5].
    pub fn sample_parameters<R: Rng + ?Sized>(&self, rng: &mut R) -> HamiltonianParameters {
        let dist = Uniform::new_inclusive(COEFFICIENT_RANGE.0, COEFFICIENT_RANGE.1);
        let z = dist.sample(rng);
        let x = dist.sample(rng);
        HamiltonianParameters::new(z, x)
    }

    /// Construct H for the given coefficients.
    ///
    /// Fails with [`Error::HermiticityViolation`] if the result is not
    /// Hermitian.
    pub fn build(&self, params: &HamiltonianParameters) -> Result<Operator> {
        if !params.z.is_finite() || !params.x.is_finite() {
            return Err(Error::config("hamiltonian", "coefficients must be finite"));
        }

        let h = match self.size {
            SystemSize::OneQubit => Operator::linear_combination(&[
                (params.z, &pauli::sigma_z()),
                (params.x, &pauli::sigma_x()),
            ])?,
            SystemSize::TwoQubit => {
                let CouplingConstants { omega, delta, j } = self.coupling;
                let sz1 = pauli::on_first(&pauli::sigma_z())?;
                let sx1 = pauli::on_first(&pauli::sigma_x())?;
                let sz2 = pauli::on_second(&pauli::sigma_z())?;
                let sx2 = pauli::on_second(&pauli::sigma_x())?;
                let sxsx = pauli::sigma_x().tensor(&pauli::sigma_x())?;
                Operator::linear_combination(&[
                    (omega / 2.0 * params.z, &sz1),
                    (delta / 2.0 * params.x, &sx1),
                    (omega / 2.0 * params.z, &sz2),
                    (delta / 2.0 * params.x, &sx2),
                    (j, &sxsx),
                ])?
            }
        };

        h.ensure_hermitian(&format!("{} Hamiltonian", self.size), HERMITICITY_TOLERANCE)?;
        Ok(h)
    }
}
