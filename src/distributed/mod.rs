//! Distributed-memory symmetry check and transpose.
//!
//! Rank 0 ([`ROOT`]) owns the full matrix and the result. Every rank builds the
//! same [`PartitionPlan`] from `(n, P)` and then runs the same sequence of
//! collectives, so no call is ever skipped on one rank and issued on another.
//!
//! Transpose: scatter row blocks → [`kernels::transpose_block`] → gather →
//! [`reassembly::reassemble`] on the root.
//!
//! Symmetry: broadcast the full matrix → scatter row blocks →
//! [`kernels::block_is_symmetric`] → logical-AND all-reduce. The broadcast is
//! what gives every rank read access to the columns it compares against.

pub mod kernels;
pub mod partition;
pub mod reassembly;

pub use partition::{PartitionPlan, RowBlock, Segment, SegmentShape, TransferLayout};

use crate::core::traits::symmetry_tol;
use crate::error::XError;
use crate::matrix::SquareMatrix;
use crate::parallel::{Comm, Element, ROOT};
use faer::Mat;
use log::{debug, trace};
use num_traits::Float;

/// Scatter the row-major `full` buffer (read on the root only) and return
/// this rank's row block.
pub fn scatter_rows<C: Comm, T: Element>(comm: &C, plan: &PartitionPlan, full: &[T]) -> Result<Vec<T>, XError> {
    let mut local = vec![T::default(); plan.local_len(comm.rank())];
    comm.scatter_varcount(full, &plan.scatter_layout(), &mut local, ROOT)?;
    trace!("rank {}: received {} values", comm.rank(), local.len());
    Ok(local)
}

/// Gather every rank's transposed block onto the root. Returns the flat
/// buffer on the root and an empty one elsewhere.
pub fn gather_blocks<C: Comm, T: Element>(comm: &C, plan: &PartitionPlan, local: &[T]) -> Result<Vec<T>, XError> {
    let layout = plan.gather_layout();
    let mut global = if comm.is_root() {
        vec![T::default(); layout.total_len()]
    } else {
        Vec::new()
    };
    comm.gather_varcount(local, &layout, &mut global, ROOT)?;
    trace!("rank {}: sent {} values", comm.rank(), local.len());
    Ok(global)
}

/// Distributed kernels bound to one worker group.
pub struct DistributedOps<'c, C> {
    comm: &'c C,
}

impl<'c, C: Comm> DistributedOps<'c, C> {
    pub fn new(comm: &'c C) -> Self {
        DistributedOps { comm }
    }

    pub fn comm(&self) -> &C {
        self.comm
    }

    /// Partition plan of an order-`n` matrix over this group.
    pub fn plan(&self, n: usize) -> Result<PartitionPlan, XError> {
        let plan = PartitionPlan::new(n, self.comm.size())?;
        let b = plan.block(self.comm.rank());
        debug!("rank {}/{}: rows {:?} of {}", self.comm.rank(), self.comm.size(), b.rows(), n);
        Ok(plan)
    }

    /// Collective symmetry check. `matrix` is required on the root and
    /// ignored elsewhere. Every rank returns the same verdict.
    pub fn is_symmetric<T: Element + Float>(&self, matrix: Option<&Mat<T>>, n: usize) -> Result<bool, XError> {
        let plan = self.plan(n)?;
        let rank = self.comm.rank();
        let mut full = if self.comm.is_root() {
            root_matrix(matrix, n)?.to_row_major()
        } else {
            vec![T::default(); n * n]
        };
        self.comm.broadcast(&mut full, ROOT)?;
        let block = scatter_rows(self.comm, &plan, &full)?;
        let local = kernels::block_is_symmetric(&block, plan.block(rank), &full, n, symmetry_tol::<T>());
        trace!("rank {rank}: local verdict {local}");
        self.comm.all_reduce_and(local)
    }

    /// Collective transpose into the root's persistent `result`. `matrix` and
    /// `result` are required on the root and ignored elsewhere.
    pub fn transpose_into<T: Element>(
        &self,
        matrix: Option<&Mat<T>>,
        result: Option<&mut Mat<T>>,
        n: usize,
    ) -> Result<(), XError> {
        let plan = self.plan(n)?;
        let rows = plan.block(self.comm.rank()).count;
        let full = if self.comm.is_root() {
            root_matrix(matrix, n)?.to_row_major()
        } else {
            Vec::new()
        };
        let block = scatter_rows(self.comm, &plan, &full)?;
        let transposed = kernels::transpose_block(&block, rows, n);
        drop(block);
        let gathered = gather_blocks(self.comm, &plan, &transposed)?;
        if self.comm.is_root() {
            let result = result.ok_or_else(|| XError::InvalidConfig("root rank needs a result matrix".into()))?;
            reassembly::reassemble(&plan, &gathered, result)?;
        }
        Ok(())
    }

    /// Collective transpose. Returns `Some(Aᵀ)` on the root, `None` elsewhere.
    pub fn transpose<T: Element>(&self, matrix: Option<&Mat<T>>, n: usize) -> Result<Option<Mat<T>>, XError> {
        let mut result = self
            .comm
            .is_root()
            .then(|| Mat::from_fn(n, n, |_, _| T::default()));
        self.transpose_into(matrix, result.as_mut(), n)?;
        Ok(result)
    }
}

fn root_matrix<T: Copy>(matrix: Option<&Mat<T>>, n: usize) -> Result<&Mat<T>, XError> {
    let m = matrix.ok_or_else(|| XError::InvalidConfig("root rank needs the input matrix".into()))?;
    let order = m.order()?;
    if order != n {
        return Err(XError::ShapeMismatch { expected: n * n, found: order * order });
    }
    Ok(m)
}
