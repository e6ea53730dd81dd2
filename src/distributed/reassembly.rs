//! Reassembly of gathered transposed blocks into the result matrix.
//!
//! The gather leaves one segment per rank in rank order. Segment `p` holds the
//! transpose of the rows rank `p` owned, column-major within the block, so it
//! fills result *columns* `[offset(p), offset(p) + count(p))`: transposition
//! moves the partitioned axis from rows to columns.

use crate::distributed::partition::{PartitionPlan, SegmentShape, TransferLayout};
use crate::error::XError;
use faer::Mat;

/// Where element `(local_row, col)` of `worker`'s transposed block lands in
/// the result: `(col, offset(worker) + local_row)`.
pub fn destination(plan: &PartitionPlan, worker: usize, local_row: usize, col: usize) -> (usize, usize) {
    (col, plan.block(worker).offset + local_row)
}

/// Position of element `(local_row, col)` of `worker`'s block in the flat
/// buffer described by `layout`.
pub fn source_index(layout: &TransferLayout, worker: usize, local_row: usize, col: usize) -> usize {
    let seg = layout.segment(worker);
    match seg.shape {
        SegmentShape::ColumnMajorBlock { rows, .. } => seg.offset + col * rows + local_row,
        SegmentShape::RowMajor { cols, .. } => seg.offset + local_row * cols + col,
    }
}

/// Scatter the flat `gathered` buffer into `result` (n×n).
pub fn reassemble<T: Copy>(plan: &PartitionPlan, gathered: &[T], result: &mut Mat<T>) -> Result<(), XError> {
    let n = plan.order();
    let layout = plan.gather_layout();
    if gathered.len() != layout.total_len() {
        return Err(XError::ShapeMismatch { expected: layout.total_len(), found: gathered.len() });
    }
    if result.nrows() != n || result.ncols() != n {
        return Err(XError::ShapeMismatch { expected: n * n, found: result.nrows() * result.ncols() });
    }
    for (p, seg) in layout.segments().iter().enumerate() {
        debug_assert_eq!(seg.len, plan.local_len(p));
        for col in 0..n {
            for i in 0..plan.block(p).count {
                let (r, c) = destination(plan, p, i, col);
                result[(r, c)] = gathered[source_index(&layout, p, i, col)];
            }
        }
    }
    Ok(())
}
