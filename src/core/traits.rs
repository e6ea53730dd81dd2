//! Core traits shared by the execution strategies.

use crate::error::XError;
use crate::matrix::SquareMatrix;
use faer::Mat;
use num_traits::Float;

/// Absolute tolerance of every symmetry comparison.
pub const SYMMETRY_TOL: f64 = 1e-9;

/// [`SYMMETRY_TOL`] in the element type.
pub fn symmetry_tol<T: Float>() -> T {
    num_traits::cast(SYMMETRY_TOL).unwrap_or_else(T::epsilon)
}

/// Symmetry check and transpose of a fully materialized square matrix.
pub trait MatrixKernels<T: Float> {
    /// `true` iff `|A[i][j] - A[j][i]| <= SYMMETRY_TOL` for all `i, j`.
    fn is_symmetric(&self, a: &Mat<T>) -> Result<bool, XError>;
    /// Write `Aᵀ` into `out`, which must have the same order as `a`.
    fn transpose_into(&self, a: &Mat<T>, out: &mut Mat<T>) -> Result<(), XError>;
    /// Allocate and return `Aᵀ`.
    fn transpose(&self, a: &Mat<T>) -> Result<Mat<T>, XError> {
        let n = a.order()?;
        let mut out = Mat::from_fn(n, n, |_, _| T::zero());
        self.transpose_into(a, &mut out)?;
        Ok(out)
    }
}

/// Order of `a`, checked against `out`.
pub(crate) fn check_same_order<T: Copy>(a: &Mat<T>, out: &Mat<T>) -> Result<usize, XError> {
    let n = a.order()?;
    let m = out.order()?;
    if n != m {
        return Err(XError::ShapeMismatch { expected: n * n, found: m * m });
    }
    Ok(n)
}
