//! xpose command-line interface.
//!
//! Prints, for every trial, the elapsed seconds of the symmetry check and of the
//! transpose, one value per line, on the coordinator only:
//! ```sh
//! xpose 1024 --trials 100 --strategy shared --threads 8
//! xpose 1024 --trials 100 --strategy distributed --workers 4
//! mpiexec -n 4 xpose 1024 --trials 100 --transport mpi   # built with --features mpi
//! ```

use clap::Parser;
use xpose::{
    BenchContext, BenchOps, BenchOptions, Op, Precision, Strategy, TimingSummary, TrialTimings,
    Transport,
};

#[derive(Parser)]
#[command(name = "xpose")]
#[command(about = "Symmetry check and transpose benchmark: sequential, shared memory, distributed memory")]
#[command(version)]
struct Cli {
    /// Matrix order n.
    order: usize,
    /// Number of trials, each on a freshly generated matrix.
    #[arg(default_value_t = 1)]
    trials: usize,
    /// Execution strategy.
    #[arg(short, long, value_enum, default_value_t = Strategy::Distributed)]
    strategy: Strategy,
    /// Worker group of the distributed strategy.
    #[arg(long, value_enum, default_value_t = Transport::Threads)]
    transport: Transport,
    /// Thread-pool size of the shared strategy (default: all CPUs).
    #[arg(short, long)]
    threads: Option<usize>,
    /// Number of in-process workers of the distributed strategy (default: all CPUs).
    #[arg(short, long)]
    workers: Option<usize>,
    /// Seed of the matrix generator.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(short, long, value_enum, default_value_t = Precision::Double)]
    precision: Precision,
    /// Operations to time.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [Op::Symmetry, Op::Transpose])]
    ops: Vec<Op>,
    /// Check every transpose against the sequential result.
    #[arg(long)]
    verify: bool,
    /// Print the mean timing of each operation to stderr after the run.
    #[arg(long)]
    summary: bool,
}

impl Cli {
    fn options(&self) -> BenchOptions {
        BenchOptions {
            order: self.order,
            trials: self.trials,
            strategy: self.strategy,
            transport: self.transport,
            threads: self.threads,
            workers: self.workers,
            seed: self.seed,
            precision: self.precision,
            ops: self.ops.iter().copied().map(BenchOps::from).collect(),
            verify: self.verify,
        }
    }
}

fn print_trial(t: &TrialTimings) {
    for secs in t.values() {
        println!("{secs}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let ctx = BenchContext::new(cli.options())?;

    let trials = match ctx.options().precision {
        Precision::Single => ctx.run::<f32, _>(print_trial)?,
        Precision::Double => ctx.run::<f64, _>(print_trial)?,
    };

    // Non-coordinator MPI ranks come back with no trials and stay silent.
    if cli.summary && !trials.is_empty() {
        eprintln!("{}", TimingSummary::from_trials(&trials));
    }
    Ok(())
}
