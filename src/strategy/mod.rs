//! Baseline strategies operating on a fully materialized matrix.

pub mod sequential;
pub use sequential::Sequential;

#[cfg(feature = "rayon")]
pub mod shared;
#[cfg(feature = "rayon")]
pub use shared::SharedMemory;
