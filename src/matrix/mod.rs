//! Matrix module: dense square matrices, row-major wire buffers and random generation.

pub mod dense;
pub use dense::SquareMatrix;
pub mod generate;
pub use generate::MatrixGenerator;
