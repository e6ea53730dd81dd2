//! Single-threaded nested-loop baseline.

use crate::core::traits::{check_same_order, symmetry_tol, MatrixKernels};
use crate::error::XError;
use crate::matrix::SquareMatrix;
use faer::Mat;
use num_traits::Float;

pub struct Sequential;

impl<T: Float> MatrixKernels<T> for Sequential {
    fn is_symmetric(&self, a: &Mat<T>) -> Result<bool, XError> {
        let n = a.order()?;
        let tol = symmetry_tol::<T>();
        for i in 0..n {
            for j in i + 1..n {
                // NaN compares false, so a NaN pair is asymmetric
                if !((a[(i, j)] - a[(j, i)]).abs() <= tol) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn transpose_into(&self, a: &Mat<T>, out: &mut Mat<T>) -> Result<(), XError> {
        let n = check_same_order(a, out)?;
        for i in 0..n {
            for j in 0..n {
                out[(i, j)] = a[(j, i)];
            }
        }
        Ok(())
    }
}
