// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix exponential via scaling-and-squaring with Padé(13) approximation.
//!
//! Both solvers step between grid points with exact propagators
//! exp(-i·G·Δt), where G is either the Hermitian Hamiltonian (closed
//! dynamics) or the non-Hermitian effective generator (quantum jumps).
//!
//! Ref: Higham (2005), "The Scaling and Squaring Method for the Matrix
//!      Exponential Revisited", SIAM J. Matrix Anal. Appl. 26(4), 1179.

use ndarray::{s, Array2};
use num_complex::Complex64;

use crate::error::{Error, Result};

/// θ₁₃ from Higham (2005), Table 10.2.
const THETA_13: f64 = 5.37;

/// Padé(13,13) coefficients b₀..b₁₃, Higham (2005) eq. (10.33).
const PADE_13: [f64; 14] = [
    1.0,
    0.5,
    0.12,
    1.833_333_333_333_333_4e-2,
    1.992_753_623_188_405_8e-3,
    1.630_434_782_608_696e-4,
    1.035_196_687_401_6e-5,
    5.175_983_437_008_01e-7,
    2.043_151_356_652_5e-8,
    6.306_022_705_717_593e-10,
    1.483_770_048_404_14e-11,
    2.529_153_491_597_966e-13,
    2.810_170_546_219_962_4e-15,
    1.544_049_750_670_309e-17,
];

/// exp(A) for a square complex matrix.
pub fn matrix_exp(a: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(Error::DimensionMismatch {
            context: "matrix exponential (columns)".into(),
            expected: n,
            actual: a.ncols(),
        });
    }
    match n {
        0 => return Ok(Array2::zeros((0, 0))),
        1 => return Ok(Array2::from_elem((1, 1), a[[0, 0]].exp())),
        _ => {}
    }

    let norm = one_norm(a);
    if !norm.is_finite() {
        return Err(Error::config("generator", "matrix exponential of non-finite matrix"));
    }
    let squarings = if norm > THETA_13 {
        (norm / THETA_13).log2().ceil() as i32
    } else {
        0
    };

    let scaled = a * Complex64::new(2f64.powi(-squarings), 0.0);
    let mut result = pade13(&scaled)?;
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    Ok(result)
}

/// Propagator exp(-i·G·dt) for a time-independent generator G.
pub fn propagator(generator: &Array2<Complex64>, dt: f64) -> Result<Array2<Complex64>> {
    matrix_exp(&(generator * Complex64::new(0.0, -dt)))
}

/// r₁₃(A) = (V - U)⁻¹ (V + U), with U odd and V even in A.
fn pade13(a: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    let n = a.nrows();
    let b = |k: usize| Complex64::new(PADE_13[k], 0.0);
    let eye = Array2::from_diag_elem(n, Complex64::new(1.0, 0.0));

    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a2.dot(&a4);

    let u_high = &a6 * b(13) + &a4 * b(11) + &a2 * b(9);
    let u_inner = a6.dot(&u_high) + &a6 * b(7) + &a4 * b(5) + &a2 * b(3) + &eye * b(1);
    let u = a.dot(&u_inner);

    let v_high = &a6 * b(12) + &a4 * b(10) + &a2 * b(8);
    let v = a6.dot(&v_high) + &a6 * b(6) + &a4 * b(4) + &a2 * b(2) + &eye * b(0);

    solve(&v - &u, &v + &u)
}

/// Solve A·X = B by Gaussian elimination with partial pivoting.
fn solve(a: Array2<Complex64>, b: Array2<Complex64>) -> Result<Array2<Complex64>> {
    let n = a.nrows();
    let m = b.ncols();

    let mut aug = Array2::zeros((n, n + m));
    aug.slice_mut(s![.., ..n]).assign(&a);
    aug.slice_mut(s![.., n..]).assign(&b);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| aug[[r1, col]].norm().total_cmp(&aug[[r2, col]].norm()))
            .unwrap_or(col);
        if pivot_row != col {
            for j in 0..(n + m) {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        if pivot.norm() < 1e-300 {
            return Err(Error::config(
                "generator",
                "Padé denominator is singular; matrix exponential failed",
            ));
        }

        for row in (col + 1)..n {
            let factor = aug[[row, col]] / pivot;
            if factor.norm() == 0.0 {
                continue;
            }
            for j in col..(n + m) {
                let upper = aug[[col, j]];
                aug[[row, j]] -= factor * upper;
            }
        }
    }

    let mut x = Array2::<Complex64>::zeros((n, m));
    for row in (0..n).rev() {
        let pivot = aug[[row, row]];
        for j in 0..m {
            let mut acc = aug[[row, n + j]];
            for k in (row + 1)..n {
                acc -= aug[[row, k]] * x[[k, j]];
            }
            x[[row, j]] = acc / pivot;
        }
    }
    Ok(x)
}

/// Max column sum of absolute values.
fn one_norm(a: &Array2<Complex64>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::algebra::dagger;
    use crate::test_utils::{assert_matrix_close, c};
    use std::f64::consts::PI;

    #[test]
    fn test_expm_zero_is_identity() {
        let zero = Array2::<Complex64>::zeros((4, 4));
        let result = matrix_exp(&zero).unwrap();
        assert_matrix_close(&result, &Array2::from_diag_elem(4, c(1.0)), 1e-14);
    }

    #[test]
    fn test_expm_diagonal() {
        let mut a = Array2::zeros((2, 2));
        a[[0, 0]] = c(1.0);
        a[[1, 1]] = c(-2.0);
        let result = matrix_exp(&a).unwrap();
        assert!((result[[0, 0]] - c(1.0_f64.exp())).norm() < 1e-12);
        assert!((result[[1, 1]] - c((-2.0_f64).exp())).norm() < 1e-12);
        assert!(result[[0, 1]].norm() < 1e-14);
    }

    #[test]
    fn test_propagator_sigma_x_rotation() {
        // exp(-i·σx·t) = cos t·I - i sin t·σx
        let t = PI / 3.0;
        let mut sx = Array2::zeros((2, 2));
        sx[[0, 1]] = c(1.0);
        sx[[1, 0]] = c(1.0);
        let u = propagator(&sx, t).unwrap();
        assert!((u[[0, 0]] - c(t.cos())).norm() < 1e-12);
        assert!((u[[0, 1]] - Complex64::new(0.0, -t.sin())).norm() < 1e-12);
    }

    #[test]
    fn test_propagator_is_unitary_for_hermitian_generator() {
        let mut h = Array2::zeros((4, 4));
        h[[0, 0]] = c(1.5);
        h[[0, 3]] = Complex64::new(0.3, -0.7);
        h[[3, 0]] = Complex64::new(0.3, 0.7);
        h[[1, 2]] = c(2.0);
        h[[2, 1]] = c(2.0);
        h[[3, 3]] = c(-0.5);

        let u = propagator(&h, 7.5).unwrap();
        let product = u.dot(&dagger(&u));
        assert_matrix_close(&product, &Array2::from_diag_elem(4, c(1.0)), 1e-10);
    }

    #[test]
    fn test_expm_large_norm_needs_scaling() {
        let mut a = Array2::zeros((2, 2));
        a[[0, 0]] = c(40.0);
        a[[1, 1]] = c(-40.0);
        let result = matrix_exp(&a).unwrap();
        let e40 = 40.0_f64.exp();
        assert!((result[[0, 0]].re - e40).abs() / e40 < 1e-10);
    }

    #[test]
    fn test_expm_rejects_non_square() {
        let a = Array2::<Complex64>::zeros((2, 3));
        assert!(matrix_exp(&a).is_err());
    }

    #[test]
    fn test_expm_scalar() {
        let a = Array2::from_elem((1, 1), Complex64::new(0.5, 1.0));
        let result = matrix_exp(&a).unwrap();
        assert!((result[[0, 0]] - Complex64::new(0.5, 1.0).exp()).norm() < 1e-14);
    }
}
