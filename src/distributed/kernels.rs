//! Rank-local kernels. No communication happens here.

use crate::distributed::partition::RowBlock;
use num_traits::Float;

/// Transpose a `rows × n` row-major block into its column-major-within-block
/// form: `out[j * rows + i] = block[i * n + j]`.
///
/// A zero-row block yields an empty buffer.
pub fn transpose_block<T: Copy + Default>(block: &[T], rows: usize, n: usize) -> Vec<T> {
    assert_eq!(block.len(), rows * n, "block has incorrect length");
    let mut out = vec![T::default(); rows * n];
    for i in 0..rows {
        let row = &block[i * n..(i + 1) * n];
        for (j, &v) in row.iter().enumerate() {
            out[j * rows + i] = v;
        }
    }
    out
}

/// Check the rows of `block` against the matching columns of the full
/// row-major matrix `full`: `|block[i][j] - full[j][owner.offset + i]| <= tol`.
///
/// Stops at the first mismatch. An empty block is trivially symmetric.
pub fn block_is_symmetric<T: Float>(block: &[T], owner: RowBlock, full: &[T], n: usize, tol: T) -> bool {
    assert_eq!(block.len(), owner.count * n, "block has incorrect length");
    assert_eq!(full.len(), n * n, "full matrix has incorrect length");
    block.chunks_exact(n.max(1)).enumerate().all(|(i, row)| {
        let g = owner.offset + i;
        row.iter()
            .enumerate()
            .all(|(j, &v)| (v - full[j * n + g]).abs() <= tol)
    })
}
