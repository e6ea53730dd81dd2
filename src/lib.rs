//! xpose: symmetry check and transpose of dense square matrices
//!
//! This crate benchmarks three execution strategies for two operations on an n×n
//! matrix: a sequential nested loop, a loop-parallel shared-memory version on rayon,
//! and a distributed-memory version that partitions the matrix into row blocks over a
//! fixed group of workers (in-process threads, or MPI processes with the `mpi` feature).

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod distributed;
pub mod error;
pub mod matrix;
pub mod strategy;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use crate::core::*;
pub use distributed::{DistributedOps, PartitionPlan, RowBlock};
pub use error::*;
pub use matrix::*;
pub use strategy::*;
pub use utils::*;
