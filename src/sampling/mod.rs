// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Initial-state sampling on the Bloch sphere.
//!
//! Single-qubit states are parametrized by spherical angles (θ, φ):
//!
//!   |ψ⟩ = cos(θ/2)|0⟩ + e^{iφ} sin(θ/2)|1⟩
//!
//! with θ ∈ [0, π] and φ ∈ [0, 2π]. Sampling `n` angles of each kind and
//! taking every (θ, φ) pair gives n² states. Two-qubit states are products
//! of two Haar-random single-qubit states.

use std::f64::consts::PI;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::quantum::{QuantumState, SystemSize};

/// How Bloch angles are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// θ, φ linearly spaced over their full ranges
    Grid,
    /// θ, φ drawn uniformly, then sorted ascending
    #[default]
    Random,
}

/// Bloch angles and Cartesian coordinates of a single-qubit state set.
#[derive(Debug, Clone, PartialEq)]
pub struct BlochCoordinates {
    /// (θ, φ) per state, shape (n, 2)
    pub angles: Array2<f64>,
    /// (x, y, z) per state, shape (n, 3)
    pub cartesian: Array2<f64>,
}

/// Initial states shared by every batch of a dataset.
#[derive(Debug, Clone)]
pub struct InitialStateSet {
    /// Normalized states
    pub states: Vec<QuantumState>,
    /// Bloch coordinates (single-qubit sets only)
    pub bloch: Option<BlochCoordinates>,
}

impl InitialStateSet {
    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Size tag shared by all states.
    pub fn system_size(&self) -> Option<SystemSize> {
        self.states.first().map(QuantumState::size)
    }

    /// Normalized point colors for a Bloch point cloud.
    pub fn point_colors(&self) -> Option<Array2<f64>> {
        self.bloch.as_ref().map(|b| normalize_colors(&b.cartesian))
    }
}

/// Draws initial states for one dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateSampler {
    mode: SamplingMode,
}

impl StateSampler {
    /// Sampler using `mode` for single-qubit angles.
    pub fn new(mode: SamplingMode) -> Self {
        Self { mode }
    }

    /// Angle mode.
    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// n² single-qubit states from n θ-values × n φ-values.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<InitialStateSet> {
        let angles = sample_bloch(n, self.mode, rng)?;
        let states = angles
            .rows()
            .into_iter()
            .map(|row| bloch_state(row[0], row[1]))
            .collect::<Result<Vec<_>>>()?;
        let cartesian = cartesian_coordinates(&angles);
        Ok(InitialStateSet {
            states,
            bloch: Some(BlochCoordinates { angles, cartesian }),
        })
    }

    /// `count` two-qubit product states |ψ₁⟩ ⊗ |ψ₂⟩ with Haar-random factors.
    pub fn sample_product_states<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<InitialStateSet> {
        if count == 0 {
            return Err(Error::config("batched_samples", "must be greater than 0"));
        }
        let states = (0..count)
            .map(|_| random_qubit(rng)?.tensor(&random_qubit(rng)?))
            .collect::<Result<Vec<_>>>()?;
        Ok(InitialStateSet {
            states,
            bloch: None,
        })
    }

    /// Initial states for `size`: n² Bloch states or n product states.
    pub fn sample_for<R: Rng + ?Sized>(
        &self,
        size: SystemSize,
        n: usize,
        rng: &mut R,
    ) -> Result<InitialStateSet> {
        match size {
            SystemSize::OneQubit => self.sample(n, rng),
            SystemSize::TwoQubit => self.sample_product_states(n, rng),
        }
    }
}

/// (θ, φ) pairs, shape (n², 2).
///
/// Row `i·n + j` holds (θⱼ, φᵢ): φ varies slowest.
pub fn sample_bloch<R: Rng + ?Sized>(
    n: usize,
    mode: SamplingMode,
    rng: &mut R,
) -> Result<Array2<f64>> {
    if n == 0 {
        return Err(Error::config("batched_samples", "must be greater than 0"));
    }

    let (thetas, phis) = match mode {
        SamplingMode::Grid => (linspace(0.0, PI, n), linspace(0.0, 2.0 * PI, n)),
        SamplingMode::Random => {
            let theta_dist = Uniform::new(0.0, PI);
            let phi_dist = Uniform::new(0.0, 2.0 * PI);
            let mut thetas: Vec<f64> = (0..n).map(|_| theta_dist.sample(rng)).collect();
            let mut phis: Vec<f64> = (0..n).map(|_| phi_dist.sample(rng)).collect();
            thetas.sort_by(f64::total_cmp);
            phis.sort_by(f64::total_cmp);
            (thetas, phis)
        }
    };

    let mut pairs = Array2::zeros((n * n, 2));
    for (i, &phi) in phis.iter().enumerate() {
        for (j, &theta) in thetas.iter().enumerate() {
            pairs[[i * n + j, 0]] = theta;
            pairs[[i * n + j, 1]] = phi;
        }
    }
    Ok(pairs)
}

/// cos(θ/2)|0⟩ + e^{iφ} sin(θ/2)|1⟩.
///
/// Fails for non-finite angles.
pub fn bloch_state(theta: f64, phi: f64) -> Result<QuantumState> {
    if !theta.is_finite() || !phi.is_finite() {
        return Err(Error::config(
            "bloch_angles",
            format!("must be finite, got (θ, φ) = ({}, {})", theta, phi),
        ));
    }
    let half = theta / 2.0;
    let amplitudes = Array1::from(vec![
        Complex64::new(half.cos(), 0.0),
        Complex64::from_polar(half.sin(), phi),
    ]);
    QuantumState::new(SystemSize::OneQubit, amplitudes)
}

/// (sin θ cos φ, sin θ sin φ, cos θ) per (θ, φ) row.
pub fn cartesian_coordinates(angles: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((angles.nrows(), 3));
    for (mut row, pair) in out.rows_mut().into_iter().zip(angles.rows()) {
        let (theta, phi) = (pair[0], pair[1]);
        row[0] = theta.sin() * phi.cos();
        row[1] = theta.sin() * phi.sin();
        row[2] = theta.cos();
    }
    out
}

/// Shift by the minimum and scale by the largest magnitude.
///
/// A zero range (all values equal) gives all zeros.
pub fn normalize_colors(values: &Array2<f64>) -> Array2<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return Array2::zeros(values.raw_dim());
    }
    let shifted = values.mapv(|v| v - min);
    let max = shifted.iter().map(|v| v.abs()).fold(0.0, f64::max);
    if max == 0.0 {
        return Array2::zeros(values.raw_dim());
    }
    shifted.mapv(|v| v / max)
}

/// Haar-random single-qubit state.
///
/// The first column of a Haar unitary is a normalized complex Gaussian
/// vector, so no QR decomposition is needed.
pub fn random_qubit<R: Rng + ?Sized>(rng: &mut R) -> Result<QuantumState> {
    loop {
        let amplitudes: Array1<Complex64> = (0..2)
            .map(|_| {
                let re: f64 = rng.sample(StandardNormal);
                let im: f64 = rng.sample(StandardNormal);
                Complex64::new(re, im)
            })
            .collect();
        if amplitudes.iter().any(|z| z.norm_sqr() > 0.0) {
            return QuantumState::new(SystemSize::OneQubit, amplitudes);
        }
    }
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|k| start + step * k as f64).collect()
}
