//! Context module for xpose.
//!
//! This module provides the benchmark context: it owns the run options, picks the
//! execution strategy (sequential, shared memory or distributed) and drives the
//! trials, generating a fresh matrix on the coordinator before each one.
//!
//! Modules:
//! - [`bench_context`]: Contains the `BenchContext` struct.
//!
//! # Example
//! ```rust
//! use xpose::{BenchContext, BenchOptions, Strategy};
//! let opts = BenchOptions { order: 16, trials: 2, strategy: Strategy::Sequential, ..Default::default() };
//! let ctx = BenchContext::new(opts).unwrap();
//! let trials = ctx.run::<f64, _>(|t| println!("{t:?}")).unwrap();
//! assert_eq!(trials.len(), 2);
//! ```

pub mod bench_context;
pub use bench_context::BenchContext;
