//! Block-row partitioning of an n×n matrix over P workers.
//!
//! Every rank recomputes the same plan from `(n, P)`; the plan itself is never
//! sent over the wire. The first `n mod P` ranks receive `⌊n/P⌋ + 1` rows, the
//! rest `⌊n/P⌋`. When `n < P` the trailing ranks own zero rows.
//!
//! Besides the row blocks the plan derives the two transfer descriptors used by
//! the distribution protocol. Both have the same per-rank lengths but describe
//! different shapes: the scatter moves `rows × n` row-major blocks, the gather
//! moves `n × rows` column-major-within-block transposed blocks.

use crate::error::XError;

/// A contiguous block of rows owned by one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBlock {
    /// Number of rows in the block (may be zero).
    pub count: usize,
    /// Global index of the first row.
    pub offset: usize,
}

impl RowBlock {
    /// Global row indices covered by this block.
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Shape of the payload a transfer segment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    /// `rows × n` values, row-major.
    RowMajor { rows: usize, cols: usize },
    /// `n × rows` values: global column `j`, local row `i` at `j * rows + i`.
    ColumnMajorBlock { cols: usize, rows: usize },
}

/// One rank's slice of a flat transfer buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub offset: usize,
    pub len: usize,
    pub shape: SegmentShape,
}

/// Per-rank segments of one variable-count collective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLayout {
    segments: Vec<Segment>,
}

impl TransferLayout {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, rank: usize) -> &Segment {
        &self.segments[rank]
    }

    /// Element counts, in rank order.
    pub fn counts(&self) -> Vec<usize> {
        self.segments.iter().map(|s| s.len).collect()
    }

    /// Element displacements, in rank order.
    pub fn displs(&self) -> Vec<usize> {
        self.segments.iter().map(|s| s.offset).collect()
    }

    /// Total length of the flat buffer.
    pub fn total_len(&self) -> usize {
        self.segments.last().map_or(0, |s| s.offset + s.len)
    }
}

/// Row-block assignment of an `order × order` matrix to `workers` ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    order: usize,
    blocks: Vec<RowBlock>,
}

impl PartitionPlan {
    /// Build the plan for matrix order `n` and `workers` ranks.
    pub fn new(n: usize, workers: usize) -> Result<Self, XError> {
        if workers == 0 {
            return Err(XError::InvalidConfig("worker count must be positive".into()));
        }
        let base = n / workers;
        let extra = n % workers;
        let mut blocks = Vec::with_capacity(workers);
        let mut offset = 0;
        for rank in 0..workers {
            let count = base + usize::from(rank < extra);
            blocks.push(RowBlock { count, offset });
            offset += count;
        }
        debug_assert_eq!(offset, n);
        Ok(PartitionPlan { order: n, blocks })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn workers(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> &[RowBlock] {
        &self.blocks
    }

    /// The block owned by `rank`.
    ///
    /// # Panics
    /// Panics if `rank >= self.workers()`.
    pub fn block(&self, rank: usize) -> RowBlock {
        self.blocks[rank]
    }

    /// Number of elements rank `rank` holds locally (`rows × n`).
    pub fn local_len(&self, rank: usize) -> usize {
        self.blocks[rank].count * self.order
    }

    /// Descriptor of the row-block scatter: `rows × n` row-major segments.
    pub fn scatter_layout(&self) -> TransferLayout {
        let n = self.order;
        let segments = self
            .blocks
            .iter()
            .map(|b| Segment {
                offset: b.offset * n,
                len: b.count * n,
                shape: SegmentShape::RowMajor { rows: b.count, cols: n },
            })
            .collect();
        TransferLayout { segments }
    }

    /// Descriptor of the transposed-block gather: `n × rows` segments laid out
    /// consecutively in rank order.
    pub fn gather_layout(&self) -> TransferLayout {
        let n = self.order;
        let mut start = 0;
        let segments = self
            .blocks
            .iter()
            .map(|b| {
                let len = n * b.count;
                let seg = Segment {
                    offset: start,
                    len,
                    shape: SegmentShape::ColumnMajorBlock { cols: n, rows: b.count },
                };
                start += len;
                seg
            })
            .collect();
        TransferLayout { segments }
    }
}
