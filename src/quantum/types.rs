// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Size-tagged state and operator types.
//!
//! Every state and operator carries its [`SystemSize`], checked once when
//! the value is constructed. Downstream code can then combine values of the
//! same size without re-validating shapes.

use std::fmt;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::algebra;
use crate::error::{Error, Result};

/// Number of qubits in the simulated system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemSize {
    /// Single qubit, Hilbert dimension 2
    #[default]
    OneQubit,
    /// Two qubits, Hilbert dimension 4
    TwoQubit,
}

impl SystemSize {
    /// Hilbert space dimension.
    pub fn dim(self) -> usize {
        match self {
            SystemSize::OneQubit => 2,
            SystemSize::TwoQubit => 4,
        }
    }

    /// Number of tracked observables per time step.
    pub fn num_observables(self) -> usize {
        match self {
            SystemSize::OneQubit => 3,
            SystemSize::TwoQubit => 4,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(self) -> usize {
        match self {
            SystemSize::OneQubit => 1,
            SystemSize::TwoQubit => 2,
        }
    }

    /// Recover the size tag from a Hilbert dimension.
    pub fn from_dim(dim: usize, context: &str) -> Result<Self> {
        match dim {
            2 => Ok(SystemSize::OneQubit),
            4 => Ok(SystemSize::TwoQubit),
            other => Err(Error::DimensionMismatch {
                context: context.to_string(),
                expected: 2,
                actual: other,
            }),
        }
    }

    /// Recover the size tag from an observable count.
    pub fn from_num_observables(count: usize) -> Option<Self> {
        match count {
            3 => Some(SystemSize::OneQubit),
            4 => Some(SystemSize::TwoQubit),
            _ => None,
        }
    }
}

impl fmt::Display for SystemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemSize::OneQubit => write!(f, "one_qubit"),
            SystemSize::TwoQubit => write!(f, "two_qubit"),
        }
    }
}

/// A pure state |ψ⟩ as a complex column vector.
///
/// Normalized at creation; stochastic evolution may work on un-normalized
/// copies of the amplitudes, but a `QuantumState` handed out by a sampler
/// always has unit norm.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumState {
    size: SystemSize,
    amplitudes: Array1<Complex64>,
}

impl QuantumState {
    /// Wrap amplitudes, checking their length against `size` and normalizing.
    pub fn new(size: SystemSize, amplitudes: Array1<Complex64>) -> Result<Self> {
        if amplitudes.len() != size.dim() {
            return Err(Error::DimensionMismatch {
                context: format!("{} state", size),
                expected: size.dim(),
                actual: amplitudes.len(),
            });
        }
        let norm = algebra::norm_sqr(&amplitudes).sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(Error::config("state", "amplitudes must have finite non-zero norm"));
        }
        Ok(Self {
            size,
            amplitudes: amplitudes.mapv(|z| z / norm),
        })
    }

    /// Wrap amplitudes, inferring the size from their length.
    pub fn from_amplitudes(amplitudes: Array1<Complex64>) -> Result<Self> {
        let size = SystemSize::from_dim(amplitudes.len(), "state")?;
        Self::new(size, amplitudes)
    }

    /// |0⟩ or |00⟩.
    pub fn ground(size: SystemSize) -> Self {
        let mut amplitudes = Array1::zeros(size.dim());
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self { size, amplitudes }
    }

    /// Size tag.
    pub fn size(&self) -> SystemSize {
        self.size
    }

    /// Amplitudes in the computational basis.
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    /// ⟨ψ|ψ⟩.
    pub fn norm_sqr(&self) -> f64 {
        algebra::norm_sqr(&self.amplitudes)
    }

    /// |ψ₁⟩ ⊗ |ψ₂⟩ of two single-qubit states.
    pub fn tensor(&self, other: &QuantumState) -> Result<QuantumState> {
        for state in [self, other] {
            if state.size != SystemSize::OneQubit {
                return Err(Error::DimensionMismatch {
                    context: "tensor product factor".into(),
                    expected: 2,
                    actual: state.size.dim(),
                });
            }
        }
        QuantumState::new(
            SystemSize::TwoQubit,
            algebra::kron_vec(&self.amplitudes, &other.amplitudes),
        )
    }
}

/// A square operator on a one- or two-qubit Hilbert space.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    size: SystemSize,
    matrix: Array2<Complex64>,
}

impl Operator {
    /// Wrap a matrix, checking it is `size.dim()` × `size.dim()`.
    pub fn new(size: SystemSize, matrix: Array2<Complex64>) -> Result<Self> {
        let dim = size.dim();
        if matrix.nrows() != dim {
            return Err(Error::DimensionMismatch {
                context: format!("{} operator rows", size),
                expected: dim,
                actual: matrix.nrows(),
            });
        }
        if matrix.ncols() != dim {
            return Err(Error::DimensionMismatch {
                context: format!("{} operator columns", size),
                expected: dim,
                actual: matrix.ncols(),
            });
        }
        Ok(Self { size, matrix })
    }

    /// Wrap a matrix, inferring the size from its row count.
    pub fn from_matrix(matrix: Array2<Complex64>) -> Result<Self> {
        let size = SystemSize::from_dim(matrix.nrows(), "operator")?;
        Self::new(size, matrix)
    }

    /// Single-qubit operator from a 2 × 2 literal.
    pub fn qubit(entries: [[Complex64; 2]; 2]) -> Self {
        Self {
            size: SystemSize::OneQubit,
            matrix: Array2::from_shape_fn((2, 2), |(i, j)| entries[i][j]),
        }
    }

    /// Identity on `size`.
    pub fn identity(size: SystemSize) -> Self {
        Self {
            size,
            matrix: Array2::from_diag_elem(size.dim(), Complex64::new(1.0, 0.0)),
        }
    }

    /// Zero operator.
    pub fn zeros(size: SystemSize) -> Self {
        Self {
            size,
            matrix: Array2::zeros((size.dim(), size.dim())),
        }
    }

    /// Size tag.
    pub fn size(&self) -> SystemSize {
        self.size
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Consume into the underlying matrix.
    pub fn into_matrix(self) -> Array2<Complex64> {
        self.matrix
    }

    /// O†.
    pub fn dagger(&self) -> Operator {
        Operator {
            size: self.size,
            matrix: algebra::dagger(&self.matrix),
        }
    }

    /// A ⊗ B of two single-qubit operators.
    pub fn tensor(&self, other: &Operator) -> Result<Operator> {
        for op in [self, other] {
            if op.size != SystemSize::OneQubit {
                return Err(Error::DimensionMismatch {
                    context: "tensor product factor".into(),
                    expected: 2,
                    actual: op.size.dim(),
                });
            }
        }
        Operator::new(SystemSize::TwoQubit, algebra::kron(&self.matrix, &other.matrix))
    }

    /// Σ cᵢ Oᵢ over operators of one size.
    pub fn linear_combination(terms: &[(f64, &Operator)]) -> Result<Operator> {
        let size = match terms.first() {
            Some((_, op)) => op.size,
            None => return Err(Error::config("operator", "empty linear combination")),
        };
        let mut matrix = Array2::zeros((size.dim(), size.dim()));
        for (coefficient, op) in terms {
            if op.size != size {
                return Err(Error::DimensionMismatch {
                    context: "linear combination term".into(),
                    expected: size.dim(),
                    actual: op.size.dim(),
                });
            }
            matrix = matrix + &op.matrix * Complex64::new(*coefficient, 0.0);
        }
        Ok(Operator { size, matrix })
    }

    /// O|ψ⟩ on raw amplitudes of matching length.
    pub fn apply(&self, psi: &Array1<Complex64>) -> Array1<Complex64> {
        self.matrix.dot(psi)
    }

    /// Real part of ⟨ψ|O|ψ⟩ for a state of the same size.
    pub fn expectation(&self, state: &QuantumState) -> Result<f64> {
        if state.size() != self.size {
            return Err(Error::DimensionMismatch {
                context: "expectation value".into(),
                expected: self.size.dim(),
                actual: state.size().dim(),
            });
        }
        Ok(algebra::expectation(&self.matrix, state.amplitudes()).re)
    }

    /// Largest element of |O - O†|.
    pub fn hermiticity_deviation(&self) -> f64 {
        algebra::hermiticity_deviation(&self.matrix)
    }

    /// Fail with [`Error::HermiticityViolation`] unless O = O† within `tolerance`.
    pub fn ensure_hermitian(&self, context: &str, tolerance: f64) -> Result<()> {
        let deviation = self.hermiticity_deviation();
        if deviation > tolerance || !deviation.is_finite() {
            return Err(Error::HermiticityViolation {
                context: context.to_string(),
                max_deviation: deviation,
            });
        }
        Ok(())
    }
}
