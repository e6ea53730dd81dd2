pub mod options;
pub use options::{BenchOps, BenchOptions, Op, Precision, Strategy, Transport};
