// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for trajectory generation.

use std::fmt;

/// Result type alias for trajectory generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Trajectory generation errors.
///
/// Every variant is fatal for the enclosing dataset build: no partial
/// dataset is ever returned alongside one of these.
#[derive(Debug)]
pub enum Error {
    /// Configuration rejected before simulation started
    InvalidConfiguration { field: String, message: String },
    /// Operator or state shape does not match the qubit structure
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },
    /// A constructed Hamiltonian is not Hermitian
    HermiticityViolation { context: String, max_deviation: f64 },
    /// State norm or expectation value drifted beyond tolerance
    NumericalInstability(InstabilityReport),
    /// Saved dataset is missing fields or is shape-inconsistent
    SourceData(String),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidConfiguration`].
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Attach the (batch, sample) location to a numerical instability.
    ///
    /// Solvers only know the time index; the assembler knows which
    /// trajectory it was building. Other variants pass through unchanged.
    pub fn at_trajectory(self, batch: usize, sample: usize) -> Self {
        match self {
            Error::NumericalInstability(mut report) => {
                report.batch = Some(batch);
                report.sample = Some(sample);
                Error::NumericalInstability(report)
            }
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration { field, message } => {
                write!(f, "Invalid configuration: '{}' {}", field, message)
            }
            Error::DimensionMismatch {
                context,
                expected,
                actual,
            } => write!(
                f,
                "Dimension mismatch in {}: expected {}, got {}",
                context, expected, actual
            ),
            Error::HermiticityViolation {
                context,
                max_deviation,
            } => write!(
                f,
                "Hermiticity violation in {}: max |H - H†| = {:.3e}",
                context, max_deviation
            ),
            Error::NumericalInstability(report) => write!(f, "Numerical instability: {}", report),
            Error::SourceData(msg) => write!(f, "Source data error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Where and how an integration drifted out of tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstabilityReport {
    /// Batch index (filled in by the assembler)
    pub batch: Option<usize>,
    /// Initial-state index within the batch (filled in by the assembler)
    pub sample: Option<usize>,
    /// Index into the time grid
    pub time_index: usize,
    /// What drifted
    pub kind: InstabilityKind,
}

impl InstabilityReport {
    /// Report raised by a solver, before the trajectory location is known.
    pub fn at_time(time_index: usize, kind: InstabilityKind) -> Self {
        Self {
            batch: None,
            sample: None,
            time_index,
            kind,
        }
    }
}

impl fmt::Display for InstabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(batch) = self.batch {
            write!(f, " at batch {}", batch)?;
        }
        if let Some(sample) = self.sample {
            write!(f, ", sample {}", sample)?;
        }
        write!(f, " (time index {})", self.time_index)
    }
}

/// Kind of numerical drift.
#[derive(Debug, Clone, PartialEq)]
pub enum InstabilityKind {
    /// ⟨ψ|ψ⟩ left 1 ± tolerance
    NormDrift { norm_sqr: f64 },
    /// ⟨O⟩ left [-1, 1] ± tolerance
    ExpectationOutOfRange { observable: usize, value: f64 },
}

impl fmt::Display for InstabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstabilityKind::NormDrift { norm_sqr } => {
                write!(f, "state norm² drifted to {:.9}", norm_sqr)
            }
            InstabilityKind::ExpectationOutOfRange { observable, value } => {
                write!(f, "observable {} expectation {:.9} outside [-1, 1]", observable, value)
            }
        }
    }
}
