//! Benchmark driver.
//!
//! `BenchContext` runs the configured number of trials. Each trial fills the
//! coordinator's matrix with fresh uniform values in `[0, 1)`, then times the
//! selected operations (symmetry check first, then transpose). The input
//! matrix and the transpose result are allocated once per run and reused by
//! every trial.
//!
//! With the distributed strategy every rank of the group runs the same trial
//! loop, so every rank issues the same collectives in the same order. Only the
//! coordinator generates data, reports trials and returns timings.

use crate::config::{BenchOps, BenchOptions, Strategy, Transport};
use crate::core::traits::MatrixKernels;
use crate::distributed::DistributedOps;
use crate::error::XError;
use crate::matrix::dense::max_abs_diff;
use crate::matrix::MatrixGenerator;
use crate::parallel::{Comm, Element, ThreadGroup, ROOT};
use crate::strategy::Sequential;
use crate::utils::timing::{timed, TrialTimings};
use faer::Mat;
use log::{debug, info};
use num_traits::Float;
use rand::distributions::{Distribution, Standard};

/// Context and configuration for a benchmark run.
pub struct BenchContext {
    opts: BenchOptions,
}

impl BenchContext {
    pub fn new(opts: BenchOptions) -> Result<Self, XError> {
        opts.validate()?;
        Ok(BenchContext { opts })
    }

    pub fn options(&self) -> &BenchOptions {
        &self.opts
    }

    /// Run the configured strategy. `on_trial` is called on the coordinator
    /// after every trial; the coordinator's timings are returned.
    pub fn run<T, F>(&self, on_trial: F) -> Result<Vec<TrialTimings>, XError>
    where
        T: Element + Float,
        Standard: Distribution<T>,
        F: Fn(&TrialTimings) + Sync,
    {
        info!(
            "{:?} strategy: n = {}, {} trial(s), ops = {:?}",
            self.opts.strategy, self.opts.order, self.opts.trials, self.opts.ops
        );
        match (self.opts.strategy, self.opts.transport) {
            (Strategy::Sequential, _) => self.run_kernels::<T, _, _>(&Sequential, on_trial),
            #[cfg(feature = "rayon")]
            (Strategy::Shared, _) => {
                let shared = crate::strategy::SharedMemory::new(self.opts.threads_or_default())?;
                info!("shared memory: {} threads", shared.threads());
                self.run_kernels::<T, _, _>(&shared, on_trial)
            }
            #[cfg(not(feature = "rayon"))]
            (Strategy::Shared, _) => Err(XError::Unsupported("shared strategy requires the `rayon` feature")),
            (Strategy::Distributed, Transport::Threads) => self.run_threads(on_trial),
            #[cfg(feature = "mpi")]
            (Strategy::Distributed, Transport::Mpi) => {
                let comm = crate::parallel::MpiComm::new()?;
                info!("mpi: rank {} of {}", comm.rank(), comm.size());
                self.run_distributed(&comm, on_trial)
            }
            #[cfg(not(feature = "mpi"))]
            (Strategy::Distributed, Transport::Mpi) => {
                Err(XError::Unsupported("MPI transport requires the `mpi` feature"))
            }
        }
    }

    /// Trial loop over a fully materialized matrix.
    pub fn run_kernels<T, K, F>(&self, kernels: &K, mut on_trial: F) -> Result<Vec<TrialTimings>, XError>
    where
        T: Float,
        K: MatrixKernels<T>,
        Standard: Distribution<T>,
        F: FnMut(&TrialTimings),
    {
        let n = self.opts.order;
        let mut generator = MatrixGenerator::new(self.opts.seed);
        let mut matrix = Mat::from_fn(n, n, |_, _| T::zero());
        let mut result = Mat::from_fn(n, n, |_, _| T::zero());
        let mut out = Vec::with_capacity(self.opts.trials);
        for trial in 0..self.opts.trials {
            generator.fill(&mut matrix);
            let mut t = TrialTimings::new(trial);
            if self.opts.ops.contains(BenchOps::SYMMETRY) {
                let (verdict, secs) = timed(|| kernels.is_symmetric(&matrix));
                t.symmetric = Some(verdict?);
                t.symmetry = Some(secs);
            }
            if self.opts.ops.contains(BenchOps::TRANSPOSE) {
                let (res, secs) = timed(|| kernels.transpose_into(&matrix, &mut result));
                res?;
                t.transpose = Some(secs);
                if self.opts.verify {
                    verify_transpose(&matrix, &result)?;
                }
            }
            debug!("trial {trial}: {t:?}");
            on_trial(&t);
            out.push(t);
        }
        Ok(out)
    }

    /// Trial loop on one rank of a worker group. Every rank of the group must
    /// call this with the same options. Returns the timings on the
    /// coordinator and an empty vector elsewhere.
    pub fn run_distributed<C, T, F>(&self, comm: &C, mut on_trial: F) -> Result<Vec<TrialTimings>, XError>
    where
        C: Comm,
        T: Element + Float,
        Standard: Distribution<T>,
        F: FnMut(&TrialTimings),
    {
        let n = self.opts.order;
        let ops = DistributedOps::new(comm);
        let root = comm.is_root();
        let mut generator = root.then(|| MatrixGenerator::new(self.opts.seed));
        let mut matrix = root.then(|| Mat::from_fn(n, n, |_, _| T::zero()));
        let mut result = root.then(|| Mat::from_fn(n, n, |_, _| T::zero()));
        let mut out = Vec::new();
        for trial in 0..self.opts.trials {
            if let (Some(g), Some(m)) = (generator.as_mut(), matrix.as_mut()) {
                g.fill(m);
            }
            let mut t = TrialTimings::new(trial);
            if self.opts.ops.contains(BenchOps::SYMMETRY) {
                comm.barrier()?;
                let (verdict, secs) = timed(|| ops.is_symmetric(matrix.as_ref(), n));
                t.symmetric = Some(verdict?);
                t.symmetry = Some(secs);
            }
            if self.opts.ops.contains(BenchOps::TRANSPOSE) {
                comm.barrier()?;
                let (res, secs) = timed(|| ops.transpose_into(matrix.as_ref(), result.as_mut(), n));
                res?;
                t.transpose = Some(secs);
                if self.opts.verify {
                    verify_collective(comm, matrix.as_ref(), result.as_ref())?;
                }
            }
            if root {
                debug!("trial {trial}: {t:?}");
                on_trial(&t);
                out.push(t);
            }
        }
        Ok(out)
    }

    /// Distributed strategy on an in-process group of worker threads.
    pub fn run_threads<T, F>(&self, on_trial: F) -> Result<Vec<TrialTimings>, XError>
    where
        T: Element + Float,
        Standard: Distribution<T>,
        F: Fn(&TrialTimings) + Sync,
    {
        let group = ThreadGroup::new(self.opts.workers_or_default())?;
        info!("thread group: {} workers", group.workers());
        let per_rank = group.run(|comm| self.run_distributed::<_, T, _>(comm, &on_trial))?;
        let mut per_rank = per_rank.into_iter().collect::<Result<Vec<_>, _>>()?;
        Ok(per_rank.swap_remove(ROOT))
    }
}

fn verify_transpose<T: Float>(a: &Mat<T>, t: &Mat<T>) -> Result<(), XError> {
    let expected = Sequential.transpose(a)?;
    let diff = max_abs_diff(&expected, t)?;
    if diff > T::zero() {
        return Err(XError::Verification(format!(
            "transpose differs from sequential result by {}",
            diff.to_f64().unwrap_or(f64::NAN)
        )));
    }
    Ok(())
}

/// Check the coordinator's result and share the outcome, so every rank
/// leaves the trial loop together when verification fails.
fn verify_collective<C: Comm, T: Float>(comm: &C, matrix: Option<&Mat<T>>, result: Option<&Mat<T>>) -> Result<(), XError> {
    let checked = match (matrix, result) {
        (Some(m), Some(r)) => verify_transpose(m, r),
        _ => Ok(()),
    };
    if comm.all_reduce_and(checked.is_ok())? {
        return Ok(());
    }
    checked?;
    Err(XError::Verification("coordinator rejected the transpose".into()))
}
