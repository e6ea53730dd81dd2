pub mod traits;
pub use traits::{symmetry_tol, MatrixKernels, SYMMETRY_TOL};
