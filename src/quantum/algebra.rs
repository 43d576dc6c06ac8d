// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense complex linear algebra on raw arrays.
//!
//! The operator set is closed and small (Paulis, ladder operators and their
//! tensor extensions), so everything here is a plain function over
//! `ndarray` values.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Kronecker product A ⊗ B of two matrices.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::zeros((ar * br, ac * bc));
    for ((i, j), &aij) in a.indexed_iter() {
        for ((k, l), &bkl) in b.indexed_iter() {
            out[[i * br + k, j * bc + l]] = aij * bkl;
        }
    }
    out
}

/// Kronecker product u ⊗ v of two column vectors.
pub fn kron_vec(u: &Array1<Complex64>, v: &Array1<Complex64>) -> Array1<Complex64> {
    let n = v.len();
    let mut out = Array1::zeros(u.len() * n);
    for (i, &ui) in u.iter().enumerate() {
        for (k, &vk) in v.iter().enumerate() {
            out[i * n + k] = ui * vk;
        }
    }
    out
}

/// Conjugate transpose (dagger) of a matrix.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// ⟨ψ|ψ⟩.
pub fn norm_sqr(psi: &Array1<Complex64>) -> f64 {
    psi.iter().map(|z| z.norm_sqr()).sum()
}

/// ⟨ψ|O|ψ⟩ without normalization.
pub fn expectation(op: &Array2<Complex64>, psi: &Array1<Complex64>) -> Complex64 {
    let o_psi = op.dot(psi);
    psi.iter().zip(o_psi.iter()).map(|(a, b)| a.conj() * b).sum()
}

/// ⟨ψ|O|ψ⟩ / ⟨ψ|ψ⟩, real part, for un-normalized stochastic states.
pub fn normalized_expectation(op: &Array2<Complex64>, psi: &Array1<Complex64>) -> f64 {
    expectation(op, psi).re / norm_sqr(psi)
}

/// max |A - A†| over all elements.
pub fn hermiticity_deviation(m: &Array2<Complex64>) -> f64 {
    if m.nrows() != m.ncols() {
        return f64::INFINITY;
    }
    let dag = dagger(m);
    m.iter()
        .zip(dag.iter())
        .map(|(a, b)| (a - b).norm())
        .fold(0.0, f64::max)
}

/// ψ / ‖ψ‖, or `None` for a zero vector.
pub fn normalize(psi: &Array1<Complex64>) -> Option<Array1<Complex64>> {
    let norm = norm_sqr(psi).sqrt();
    if norm > 0.0 && norm.is_finite() {
        Some(psi.mapv(|z| z / norm))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_matrix_close, c};
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_kron_identity_sigma_x() {
        let id = Array2::from_diag_elem(2, c(1.0));
        let sx = array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]];
        let k = kron(&id, &sx);
        // I ⊗ σx is block-diagonal with σx blocks
        let mut expected = Array2::zeros((4, 4));
        expected[[0, 1]] = c(1.0);
        expected[[1, 0]] = c(1.0);
        expected[[2, 3]] = c(1.0);
        expected[[3, 2]] = c(1.0);
        assert_matrix_close(&k, &expected, 1e-15);
    }

    #[test]
    fn test_kron_vec_ordering() {
        let u = array![c(1.0), c(2.0)];
        let v = array![c(3.0), c(5.0)];
        let k = kron_vec(&u, &v);
        assert_eq!(k, array![c(3.0), c(5.0), c(6.0), c(10.0)]);
    }

    #[test]
    fn test_dagger() {
        let mut m = Array2::zeros((2, 2));
        m[[0, 1]] = Complex64::new(1.0, 2.0);
        m[[1, 0]] = Complex64::new(3.0, 4.0);
        let dag = dagger(&m);
        assert_eq!(dag[[0, 1]], Complex64::new(3.0, -4.0));
        assert_eq!(dag[[1, 0]], Complex64::new(1.0, -2.0));
    }

    #[test]
    fn test_expectation_of_unnormalized_state() {
        let sz = array![[c(1.0), c(0.0)], [c(0.0), c(-1.0)]];
        let psi = array![c(2.0), c(0.0)];
        assert_relative_eq!(expectation(&sz, &psi).re, 4.0, epsilon = 1e-14);
        assert_relative_eq!(normalized_expectation(&sz, &psi), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_hermiticity_deviation() {
        let sy = array![
            [c(0.0), Complex64::new(0.0, -1.0)],
            [Complex64::new(0.0, 1.0), c(0.0)]
        ];
        assert_relative_eq!(hermiticity_deviation(&sy), 0.0, epsilon = 1e-15);

        let lower = array![[c(0.0), c(1.0)], [c(0.0), c(0.0)]];
        assert_relative_eq!(hermiticity_deviation(&lower), 1.0, epsilon = 1e-15);

        let rect = Array2::<Complex64>::zeros((2, 3));
        assert!(hermiticity_deviation(&rect).is_infinite());
    }

    #[test]
    fn test_normalize_zero_vector() {
        let zero = Array1::<Complex64>::zeros(2);
        assert!(normalize(&zero).is_none());
        let psi = normalize(&array![c(0.0), c(3.0)]).unwrap();
        assert_relative_eq!(norm_sqr(&psi), 1.0, epsilon = 1e-15);
    }
}
