use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use faer::Mat;
use xpose::parallel::{Comm, ThreadGroup};
use xpose::{DistributedOps, MatrixGenerator, MatrixKernels, Sequential, SharedMemory};

fn bench_transpose(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpose");
    let shared = SharedMemory::with_all_cpus().unwrap();
    let workers = ThreadGroup::new(4).unwrap();
    for n in [64, 256, 1024] {
        let a: Mat<f64> = MatrixGenerator::new(Some(1)).generate(n);
        let mut out = Mat::from_fn(n, n, |_, _| 0.0);

        group.bench_with_input(BenchmarkId::new("sequential", n), &a, |ben, a| {
            ben.iter(|| Sequential.transpose_into(black_box(a), &mut out).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("shared", n), &a, |ben, a| {
            ben.iter(|| shared.transpose(black_box(a)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("distributed-4", n), &a, |ben, a| {
            ben.iter(|| {
                workers
                    .run(|comm| DistributedOps::new(comm).transpose(comm.is_root().then_some(a), n).unwrap())
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_symmetry(c: &mut Criterion) {
    let mut group = c.benchmark_group("symmetry");
    let shared = SharedMemory::with_all_cpus().unwrap();
    let workers = ThreadGroup::new(4).unwrap();
    for n in [64, 256, 1024] {
        // Symmetric input forces a full scan.
        let a = Mat::from_fn(n, n, |i, j| ((i + j) as f64).sqrt());

        group.bench_with_input(BenchmarkId::new("sequential", n), &a, |ben, a| {
            ben.iter(|| Sequential.is_symmetric(black_box(a)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("shared", n), &a, |ben, a| {
            ben.iter(|| shared.is_symmetric(black_box(a)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("distributed-4", n), &a, |ben, a| {
            ben.iter(|| {
                workers
                    .run(|comm| DistributedOps::new(comm).is_symmetric(comm.is_root().then_some(a), n).unwrap())
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transpose, bench_symmetry);
criterion_main!(benches);
