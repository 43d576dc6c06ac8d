// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input and numerical validation.
//!
//! Configuration checks run before any simulation starts; numerical checks
//! run inside the solvers at every recorded time point.

use ndarray::ArrayView1;

use crate::error::{Error, InstabilityKind, InstabilityReport, Result};

/// Reject zero counts.
pub fn require_nonzero(field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::config(field, "must be greater than 0"));
    }
    Ok(())
}

/// Reject NaN and ±Inf.
pub fn require_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::config(field, format!("must be finite, got {}", value)));
    }
    Ok(())
}

/// Reject non-positive or non-finite values.
pub fn require_positive(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(Error::config(field, format!("must be > 0, got {}", value)));
    }
    Ok(())
}

/// Validate a time range and resolution.
///
/// A single time step needs no range; more than one needs `last > start`.
pub fn validate_time_range(start: f64, last: f64, time_steps: usize) -> Result<()> {
    require_nonzero("time_steps", time_steps)?;
    require_finite("start", start)?;
    require_finite("last", last)?;
    if time_steps > 1 && last <= start {
        return Err(Error::config(
            "last",
            format!("must be greater than start ({}), got {}", start, last),
        ));
    }
    Ok(())
}

/// Validate a training cutoff against the time range.
pub fn validate_cutoff(cutoff: f64, start: f64, last: f64) -> Result<()> {
    require_finite("stop", cutoff)?;
    if cutoff < start || cutoff > last {
        return Err(Error::config(
            "stop",
            format!("training cutoff {} outside time range [{}, {}]", cutoff, start, last),
        ));
    }
    Ok(())
}

/// Fail unless ⟨ψ|ψ⟩ is within `tolerance` of 1.
pub fn check_norm(norm_sqr: f64, tolerance: f64, time_index: usize) -> Result<()> {
    if !norm_sqr.is_finite() || (norm_sqr - 1.0).abs() > tolerance {
        return Err(Error::NumericalInstability(InstabilityReport::at_time(
            time_index,
            InstabilityKind::NormDrift { norm_sqr },
        )));
    }
    Ok(())
}

/// Fail unless every expectation in the row lies in [-1, 1] ± `tolerance`.
pub fn check_expectations(
    row: ArrayView1<'_, f64>,
    tolerance: f64,
    time_index: usize,
) -> Result<()> {
    for (observable, &value) in row.iter().enumerate() {
        if !value.is_finite() || value.abs() > 1.0 + tolerance {
            return Err(Error::NumericalInstability(InstabilityReport::at_time(
                time_index,
                InstabilityKind::ExpectationOutOfRange { observable, value },
            )));
        }
    }
    Ok(())
}
