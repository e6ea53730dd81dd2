//! Cross-strategy agreement: sequential, shared memory and distributed runs
//! must produce the same verdicts and the same transposes.
#![cfg(feature = "rayon")]

use faer::Mat;
use xpose::parallel::{Comm, ThreadGroup};
use xpose::{
    BenchContext, BenchOptions, DistributedOps, MatrixGenerator, MatrixKernels, Sequential,
    SharedMemory, SquareMatrix, Strategy,
};

#[test]
fn all_strategies_transpose_identically() {
    let n = 13;
    let a: Mat<f64> = MatrixGenerator::new(Some(2024)).generate(n);
    let seq = Sequential.transpose(&a).unwrap();
    let shared = SharedMemory::new(4).unwrap().transpose(&a).unwrap();
    let group = ThreadGroup::new(5).unwrap();
    let mut dist = group
        .run(|c| DistributedOps::new(c).transpose(c.is_root().then_some(&a), n).unwrap())
        .unwrap();
    let dist = dist.swap_remove(0).unwrap();
    assert_eq!(seq.to_row_major(), shared.to_row_major());
    assert_eq!(seq.to_row_major(), dist.to_row_major());
}

#[test]
fn all_strategies_agree_on_symmetry() {
    let n = 8;
    let sym = Mat::from_fn(n, n, |i, j| ((i * j) as f64).cos());
    let asym = Mat::from_fn(n, n, |i, j| (i as f64) - (j as f64));
    let shared = SharedMemory::new(3).unwrap();
    for (a, expected) in [(&sym, true), (&asym, false)] {
        assert_eq!(Sequential.is_symmetric(a).unwrap(), expected);
        assert_eq!(shared.is_symmetric(a).unwrap(), expected);
        let group = ThreadGroup::new(3).unwrap();
        let v = group
            .run(|c| DistributedOps::new(c).is_symmetric(c.is_root().then_some(a), n).unwrap())
            .unwrap();
        assert_eq!(v, vec![expected; 3]);
    }
}

#[test]
fn nan_entry_is_asymmetric_everywhere() {
    let n = 3;
    let mut a = Mat::from_fn(n, n, |_, _| 0.5f64);
    a[(0, 1)] = f64::NAN;
    assert!(!Sequential.is_symmetric(&a).unwrap());
    assert!(!SharedMemory::new(2).unwrap().is_symmetric(&a).unwrap());
    let v = ThreadGroup::new(2)
        .unwrap()
        .run(|c| DistributedOps::new(c).is_symmetric(c.is_root().then_some(&a), n).unwrap())
        .unwrap();
    assert_eq!(v, vec![false, false]);
}

#[test]
fn seeded_runs_see_the_same_matrices() {
    // Same seed, same matrices: every strategy reports the same verdicts.
    let base = BenchOptions {
        order: 6,
        trials: 4,
        seed: Some(7),
        workers: Some(3),
        threads: Some(2),
        verify: true,
        ..Default::default()
    };
    let verdicts = |strategy| {
        BenchContext::new(BenchOptions { strategy, ..base.clone() })
            .unwrap()
            .run::<f64, _>(|_| {})
            .unwrap()
            .into_iter()
            .map(|t| t.symmetric)
            .collect::<Vec<_>>()
    };
    let seq = verdicts(Strategy::Sequential);
    assert_eq!(seq, verdicts(Strategy::Shared));
    assert_eq!(seq, verdicts(Strategy::Distributed));
}

#[test]
fn timings_are_non_negative() {
    let opts = BenchOptions { order: 32, trials: 2, workers: Some(2), ..Default::default() };
    let ctx = BenchContext::new(opts).unwrap();
    for t in ctx.run::<f64, _>(|_| {}).unwrap() {
        assert!(t.values().all(|s| s >= 0.0));
        assert_eq!(t.values().count(), 2);
    }
}
