//! Random matrix generation for the benchmark driver.

use faer::Mat;
use rand::distributions::{Distribution, Standard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fills matrices with uniform values in `[0, 1)`.
///
/// With a seed the sequence of generated matrices is reproducible; without
/// one the generator is seeded from the OS.
pub struct MatrixGenerator {
    rng: StdRng,
}

impl MatrixGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        MatrixGenerator { rng }
    }

    /// A fresh `n × n` matrix.
    pub fn generate<T: Copy>(&mut self, n: usize) -> Mat<T>
    where
        Standard: Distribution<T>,
    {
        // Row-major fill order so a seed maps to the same matrix for any storage layout.
        let data: Vec<T> = (0..n * n).map(|_| self.rng.r#gen()).collect();
        Mat::from_fn(n, n, |i, j| data[i * n + j])
    }

    /// Overwrite every entry of `m` in place.
    pub fn fill<T>(&mut self, m: &mut Mat<T>)
    where
        Standard: Distribution<T>,
    {
        for i in 0..m.nrows() {
            for j in 0..m.ncols() {
                m[(i, j)] = self.rng.r#gen();
            }
        }
    }
}
