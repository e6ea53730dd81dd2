//! Shared-memory baseline on a dedicated rayon thread pool.

use crate::core::traits::{check_same_order, symmetry_tol, MatrixKernels};
use crate::error::XError;
use crate::matrix::SquareMatrix;
use faer::Mat;
use num_traits::Float;
use rayon::prelude::*;

/// Loop-parallel kernels; the pool size is fixed at construction.
pub struct SharedMemory {
    pool: rayon::ThreadPool,
}

impl SharedMemory {
    pub fn new(threads: usize) -> Result<Self, XError> {
        if threads == 0 {
            return Err(XError::InvalidConfig("thread count must be positive".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        Ok(SharedMemory { pool })
    }

    /// One thread per logical CPU.
    pub fn with_all_cpus() -> Result<Self, XError> {
        Self::new(num_cpus::get())
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl<T: Float + Send + Sync> MatrixKernels<T> for SharedMemory {
    fn is_symmetric(&self, a: &Mat<T>) -> Result<bool, XError> {
        let n = a.order()?;
        let tol = symmetry_tol::<T>();
        Ok(self.pool.install(|| {
            (0..n)
                .into_par_iter()
                .all(|i| (i + 1..n).all(|j| (a[(i, j)] - a[(j, i)]).abs() <= tol))
        }))
    }

    fn transpose_into(&self, a: &Mat<T>, out: &mut Mat<T>) -> Result<(), XError> {
        check_same_order(a, out)?;
        // Column j of Aᵀ is row j of A.
        self.pool.install(|| {
            out.par_col_iter_mut().enumerate().for_each(|(j, col)| {
                for (i, v) in col.iter_mut().enumerate() {
                    *v = a[(j, i)];
                }
            });
        });
        Ok(())
    }
}
