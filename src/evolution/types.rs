// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time grid and solver tolerances.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation;

/// Strictly increasing time points shared by every trajectory of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimeGrid {
    points: Vec<f64>,
}

impl TimeGrid {
    /// `steps` evenly spaced points from `start` to `stop` inclusive.
    pub fn linspace(start: f64, stop: f64, steps: usize) -> Result<Self> {
        validation::validate_time_range(start, stop, steps)?;
        if steps == 1 {
            return Ok(Self {
                points: vec![start],
            });
        }
        let step = (stop - start) / (steps - 1) as f64;
        let mut points: Vec<f64> = (0..steps).map(|k| start + step * k as f64).collect();
        // Pin the endpoint exactly
        points[steps - 1] = stop;
        Ok(Self { points })
    }

    /// Arbitrary grid; must be non-empty, finite and strictly increasing.
    pub fn from_points(points: Vec<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::config("time_steps", "time grid must not be empty"));
        }
        if let Some(t) = points.iter().find(|t| !t.is_finite()) {
            return Err(Error::config("time_steps", format!("non-finite time point {}", t)));
        }
        if let Some(k) = points.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::config(
                "time_steps",
                format!(
                    "time grid must be strictly increasing (t[{}] = {}, t[{}] = {})",
                    k,
                    points[k],
                    k + 1,
                    points[k + 1]
                ),
            ));
        }
        Ok(Self { points })
    }

    /// Time points.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of time points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; grids are non-empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First time point.
    pub fn start(&self) -> f64 {
        self.points[0]
    }

    /// Last time point.
    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Widths of consecutive intervals, `len() - 1` of them.
    pub fn intervals(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.windows(2).map(|w| w[1] - w[0])
    }

    /// Number of leading points with t ≤ `cutoff`.
    pub fn train_len(&self, cutoff: f64) -> usize {
        self.points.iter().take_while(|&&t| t <= cutoff).count()
    }

    /// Leading sub-grid with t ≤ `cutoff`.
    ///
    /// The cutoff must lie within [start, end].
    pub fn truncated(&self, cutoff: f64) -> Result<TimeGrid> {
        validation::validate_cutoff(cutoff, self.start(), self.end())?;
        TimeGrid::from_points(self.points[..self.train_len(cutoff)].to_vec())
    }
}

impl TryFrom<Vec<f64>> for TimeGrid {
    type Error = Error;

    fn try_from(points: Vec<f64>) -> Result<Self> {
        TimeGrid::from_points(points)
    }
}

impl From<TimeGrid> for Vec<f64> {
    fn from(grid: TimeGrid) -> Self {
        grid.points
    }
}

/// Drift tolerances applied at every recorded time point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Allowed |⟨ψ|ψ⟩ - 1|
    pub norm: f64,
    /// Allowed excursion of ⟨O⟩ beyond [-1, 1]
    pub expectation: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            norm: 1e-6,
            expectation: 1e-6,
        }
    }
}
