//! Distributed transpose over in-process worker groups of various sizes.
//!
//! These tests check the result on the coordinator against the Faer transpose
//! view and against results for other group sizes, covering uneven splits,
//! one row per worker, and more workers than rows.

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xpose::parallel::{Comm, ThreadGroup};
use xpose::{DistributedOps, SquareMatrix};

/// Random `n × n` matrix from a fixed seed.
fn random_matrix(n: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f64> = (0..n * n).map(|_| rng.r#gen()).collect();
    Mat::from_fn(n, n, |i, j| data[i * n + j])
}

/// Distributed transpose of `a` on `workers` ranks; returns the coordinator's result.
fn transpose_on(a: &Mat<f64>, workers: usize) -> Mat<f64> {
    let n = a.nrows();
    let group = ThreadGroup::new(workers).unwrap();
    let mut out = group
        .run(|c| DistributedOps::new(c).transpose(c.is_root().then_some(a), n).unwrap())
        .unwrap();
    out.swap_remove(0).expect("coordinator holds the result")
}

fn assert_is_transpose(a: &Mat<f64>, t: &Mat<f64>) {
    let at = a.transpose();
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            assert_eq!(t[(i, j)], at[(i, j)], "mismatch at ({i}, {j})");
        }
    }
}

#[test]
fn transpose_matches_faer_for_all_small_groups() {
    for n in 1..=9 {
        let a = random_matrix(n, n as u64);
        for p in 1..=10 {
            let t = transpose_on(&a, p);
            assert_is_transpose(&a, &t);
        }
    }
}

#[test]
fn transpose_twice_is_identity() {
    let a = random_matrix(11, 5);
    for p in 1..=8 {
        let back = transpose_on(&transpose_on(&a, p), p);
        assert_eq!(back.to_row_major(), a.to_row_major(), "p={p}");
    }
}

#[test]
fn result_does_not_depend_on_group_size() {
    let n = 10;
    let a = random_matrix(n, 99);
    let one = transpose_on(&a, 1).to_row_major();
    let three = transpose_on(&a, 3).to_row_major();
    let per_row = transpose_on(&a, n).to_row_major();
    assert_eq!(one, three);
    assert_eq!(one, per_row);
}

#[test]
fn single_element_transposes_to_itself() {
    let a = Mat::from_fn(1, 1, |_, _| 0.25);
    for p in 1..=4 {
        assert_eq!(transpose_on(&a, p)[(0, 0)], 0.25);
    }
}

#[test]
fn idle_workers_do_not_corrupt_result() {
    let a = Mat::from_fn(2, 2, |i, j| (10 * i + j) as f64);
    let t = transpose_on(&a, 5);
    assert_eq!(t.to_row_major(), vec![0.0, 10.0, 1.0, 11.0]);
}

#[test]
fn symmetric_four_by_four_on_two_workers() {
    let m = [
        [1.0, 2.0, 3.0, 4.0],
        [2.0, 5.0, 6.0, 7.0],
        [3.0, 6.0, 8.0, 9.0],
        [4.0, 7.0, 9.0, 10.0],
    ];
    let a = Mat::from_fn(4, 4, |i, j| m[i][j]);
    let t = transpose_on(&a, 2);
    assert_eq!(t.to_row_major(), a.to_row_major());
}

#[test]
fn persistent_result_is_overwritten_each_call() {
    let n = 6;
    let group = ThreadGroup::new(4).unwrap();
    let first = random_matrix(n, 1);
    let second = random_matrix(n, 2);
    let out = group
        .run(|c| {
            let ops = DistributedOps::new(c);
            let mut result = c.is_root().then(|| Mat::from_fn(n, n, |_, _| f64::NAN));
            for a in [&first, &second] {
                ops.transpose_into(c.is_root().then_some(a), result.as_mut(), n).unwrap();
            }
            result
        })
        .unwrap();
    assert_is_transpose(&second, out[0].as_ref().unwrap());
}

#[test]
fn single_precision_transpose() {
    let a = Mat::from_fn(5, 5, |i, j| (i as f32) - 0.5 * (j as f32));
    let group = ThreadGroup::new(3).unwrap();
    let out = group
        .run(|c| DistributedOps::new(c).transpose(c.is_root().then_some(&a), 5).unwrap())
        .unwrap();
    let t = out[0].as_ref().unwrap();
    for i in 0..5 {
        for j in 0..5 {
            assert_eq!(t[(i, j)], a[(j, i)]);
        }
    }
}
