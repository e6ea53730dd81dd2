//! Benchmark options.
//!
//! `BenchOptions` gathers everything one benchmark run needs: matrix order,
//! number of trials, which strategy and operations to run, and the sizing of
//! the thread pool or worker group. The `xpose` binary fills it from the
//! command line; library users build it directly.

use crate::error::XError;
use bitflags::bitflags;

/// Execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Single-threaded nested loops
    Sequential,
    /// Loop-parallel on a rayon thread pool
    Shared,
    /// Row-block partitioning over a worker group
    Distributed,
}

/// How the distributed strategy's worker group is realised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Transport {
    /// In-process worker threads
    Threads,
    /// One MPI process per rank (requires the `mpi` feature)
    Mpi,
}

/// Element type of the benchmarked matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Precision {
    /// f32
    Single,
    /// f64
    Double,
}

/// A single benchmarked operation, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Op {
    Symmetry,
    Transpose,
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct BenchOps: u8 {
        const SYMMETRY  = 0b01;
        const TRANSPOSE = 0b10;
    }
}

impl From<Op> for BenchOps {
    fn from(op: Op) -> Self {
        match op {
            Op::Symmetry => BenchOps::SYMMETRY,
            Op::Transpose => BenchOps::TRANSPOSE,
        }
    }
}

/// Benchmark run parameters.
#[derive(Debug, Clone)]
pub struct BenchOptions {
    /// Matrix order n
    pub order: usize,

    /// Number of trials, each on a freshly generated matrix
    pub trials: usize,

    pub strategy: Strategy,

    pub transport: Transport,

    /// Thread-pool size for the shared strategy (default: all CPUs)
    pub threads: Option<usize>,

    /// Group size for the thread transport (default: all CPUs)
    pub workers: Option<usize>,

    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,

    pub precision: Precision,

    pub ops: BenchOps,

    /// Check every transpose against the sequential result
    pub verify: bool,
}

impl Default for BenchOptions {
    fn default() -> Self {
        BenchOptions {
            order: 8,
            trials: 1,
            strategy: Strategy::Distributed,
            transport: Transport::Threads,
            threads: None,
            workers: None,
            seed: None,
            precision: Precision::Double,
            ops: BenchOps::all(),
            verify: false,
        }
    }
}

impl BenchOptions {
    pub fn validate(&self) -> Result<(), XError> {
        if self.order == 0 {
            return Err(XError::InvalidConfig("matrix order must be a positive integer".into()));
        }
        if self.trials == 0 {
            return Err(XError::InvalidConfig("trial count must be a positive integer".into()));
        }
        if self.threads == Some(0) {
            return Err(XError::InvalidConfig("thread count must be a positive integer".into()));
        }
        if self.workers == Some(0) {
            return Err(XError::InvalidConfig("worker count must be a positive integer".into()));
        }
        if self.ops.is_empty() {
            return Err(XError::InvalidConfig("no operation selected".into()));
        }
        if cfg!(not(feature = "rayon")) && self.strategy == Strategy::Shared {
            return Err(XError::Unsupported("shared strategy requires the `rayon` feature"));
        }
        if cfg!(not(feature = "mpi")) && self.transport == Transport::Mpi {
            return Err(XError::Unsupported("MPI transport requires the `mpi` feature"));
        }
        Ok(())
    }

    pub fn threads_or_default(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }

    pub fn workers_or_default(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }
}
