//! Dense square matrices on top of Faer.
//!
//! The coordinator keeps its matrices as `faer::Mat<T>` (column-major in
//! memory). Everything that crosses a worker boundary is a flat row-major
//! buffer: element `(r, c)` of an n-column matrix sits at `r * n + c`.

use crate::error::XError;
use faer::Mat;

/// Square-matrix helpers for any Faer `Mat<T>`.
pub trait SquareMatrix<T>: Sized {
    /// Matrix order, or an error if the matrix is not square.
    fn order(&self) -> Result<usize, XError>;
    /// Flatten into a row-major buffer.
    fn to_row_major(&self) -> Vec<T>;
    /// Construct from a row-major buffer of length `n * n`.
    fn from_row_major(n: usize, data: &[T]) -> Result<Self, XError>;
}

impl<T: Copy> SquareMatrix<T> for Mat<T> {
    fn order(&self) -> Result<usize, XError> {
        if self.nrows() != self.ncols() {
            return Err(XError::NotSquare { rows: self.nrows(), cols: self.ncols() });
        }
        Ok(self.nrows())
    }

    fn to_row_major(&self) -> Vec<T> {
        let (m, n) = (self.nrows(), self.ncols());
        let mut out = Vec::with_capacity(m * n);
        for i in 0..m {
            for j in 0..n {
                out.push(self[(i, j)]);
            }
        }
        out
    }

    fn from_row_major(n: usize, data: &[T]) -> Result<Self, XError> {
        if data.len() != n * n {
            return Err(XError::ShapeMismatch { expected: n * n, found: data.len() });
        }
        Ok(Mat::from_fn(n, n, |i, j| data[i * n + j]))
    }
}

/// `(A + Aᵀ) / 2`, symmetric by construction.
pub fn symmetrize<T: num_traits::Float>(a: &Mat<T>) -> Result<Mat<T>, XError> {
    let n = a.order()?;
    let two = T::one() + T::one();
    Ok(Mat::from_fn(n, n, |i, j| (a[(i, j)] + a[(j, i)]) / two))
}

/// Largest absolute elementwise difference between two matrices of equal shape.
pub fn max_abs_diff<T: num_traits::Float>(a: &Mat<T>, b: &Mat<T>) -> Result<T, XError> {
    if a.nrows() != b.nrows() || a.ncols() != b.ncols() {
        return Err(XError::ShapeMismatch {
            expected: a.nrows() * a.ncols(),
            found: b.nrows() * b.ncols(),
        });
    }
    let mut worst = T::zero();
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            worst = worst.max((a[(i, j)] - b[(i, j)]).abs());
        }
    }
    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_round_trip_preserves_positions() {
        let a = Mat::from_fn(2, 2, |i, j| (10 * i + j) as f64);
        assert_eq!(a.to_row_major(), vec![0.0, 1.0, 10.0, 11.0]);
        let b = Mat::<f64>::from_row_major(2, &[0.0, 1.0, 10.0, 11.0]).unwrap();
        assert_eq!(b[(1, 0)], 10.0);
    }

    #[test]
    fn rectangular_matrix_has_no_order() {
        let a = Mat::from_fn(2, 3, |_, _| 0.0f64);
        assert!(matches!(a.order(), Err(XError::NotSquare { rows: 2, cols: 3 })));
    }

    #[test]
    fn symmetrize_is_symmetric() {
        let a = Mat::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
        let s = symmetrize(&a).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(s[(i, j)], s[(j, i)]);
            }
        }
    }
}
