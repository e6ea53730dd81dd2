use faer::Mat;
use xpose::matrix::dense::symmetrize;
use xpose::parallel::{Comm, ThreadGroup};
use xpose::{DistributedOps, MatrixGenerator, PartitionPlan};

fn main() {
    let n = 7;
    let workers = 3;

    // the plan every rank derives on its own
    let plan = PartitionPlan::new(n, workers).unwrap();
    for (rank, b) in plan.blocks().iter().enumerate() {
        println!("rank {rank}: rows {:?}", b.rows());
    }

    let a: Mat<f64> = MatrixGenerator::new(Some(42)).generate(n);
    let s = symmetrize(&a).unwrap();

    let group = ThreadGroup::new(workers).unwrap();
    let out = group
        .run(|comm| {
            let ops = DistributedOps::new(comm);
            let root = comm.is_root();
            let sym_a = ops.is_symmetric(root.then_some(&a), n).unwrap();
            let sym_s = ops.is_symmetric(root.then_some(&s), n).unwrap();
            let t = ops.transpose(root.then_some(&a), n).unwrap();
            (sym_a, sym_s, t)
        })
        .unwrap();

    let (sym_a, sym_s, t) = &out[0];
    println!("random matrix symmetric: {sym_a}");
    println!("(A + Aᵀ)/2 symmetric: {sym_s}");
    if let Some(t) = t {
        println!("A[1][4] = {:.4}, Aᵀ[4][1] = {:.4}", a[(1, 4)], t[(4, 1)]);
    }
}
