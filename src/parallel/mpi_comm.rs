//! MPI-based worker group.
//!
//! One OS process per rank, launched with `mpiexec -n P`. Collectives map
//! directly onto `MPI_Bcast`, `MPI_Scatterv`, `MPI_Gatherv` and
//! `MPI_Allreduce(MPI_LAND)`. Only available with the `mpi` feature.
//!
//! MPI is initialised by [`MpiComm::new`] and finalised when the `MpiComm`
//! is dropped, so a process must build exactly one and keep it alive until it
//! exits.
//!
//! # Example
//! ```no_run
//! # #[cfg(feature = "mpi")] {
//! use xpose::parallel::{Comm, MpiComm};
//! let comm = MpiComm::new().unwrap();
//! println!("Rank: {} / {}", comm.rank(), comm.size());
//! comm.barrier().unwrap();
//! # }
//! ```

use super::{check_len, Element};
use crate::distributed::partition::TransferLayout;
use crate::error::XError;
use mpi::collective::SystemOperation;
use mpi::datatype::{Partition, PartitionMut};
use mpi::environment::Universe;
use mpi::topology::{Rank, SimpleCommunicator};
use mpi::traits::*;
use mpi::Count;

/// MPI communicator wrapper for distributed parallelism.
pub struct MpiComm {
    /// The MPI world communicator (all processes in the job).
    world: SimpleCommunicator,
    rank: usize,
    size: usize,
    // Dropped last: finalises MPI.
    _universe: Universe,
}

impl MpiComm {
    /// Initializes MPI and constructs a new `MpiComm` instance.
    pub fn new() -> Result<Self, XError> {
        let universe = mpi::initialize()
            .ok_or_else(|| XError::Comm("MPI is already initialized".into()))?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Ok(MpiComm { world, rank, size, _universe: universe })
    }
}

fn to_counts(values: Vec<usize>) -> Result<Vec<Count>, XError> {
    values
        .into_iter()
        .map(|v| Count::try_from(v).map_err(|_| XError::Comm(format!("count {v} overflows MPI_Count"))))
        .collect()
}

impl super::Comm for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), XError> {
        self.world.barrier();
        Ok(())
    }

    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), XError> {
        self.world.process_at_rank(root as Rank).broadcast_into(buf);
        Ok(())
    }

    fn scatter_varcount<T: Element>(
        &self,
        global: &[T],
        layout: &TransferLayout,
        local: &mut [T],
        root: usize,
    ) -> Result<(), XError> {
        check_len(layout.segment(self.rank).len, local.len())?;
        let root_process = self.world.process_at_rank(root as Rank);
        if self.rank == root {
            check_len(layout.total_len(), global.len())?;
            let counts = to_counts(layout.counts())?;
            let displs = to_counts(layout.displs())?;
            let partition = Partition::new(global, &counts[..], &displs[..]);
            root_process.scatter_varcount_into_root(&partition, local);
        } else {
            root_process.scatter_varcount_into(local);
        }
        Ok(())
    }

    fn gather_varcount<T: Element>(
        &self,
        local: &[T],
        layout: &TransferLayout,
        global: &mut [T],
        root: usize,
    ) -> Result<(), XError> {
        check_len(layout.segment(self.rank).len, local.len())?;
        let root_process = self.world.process_at_rank(root as Rank);
        if self.rank == root {
            check_len(layout.total_len(), global.len())?;
            let counts = to_counts(layout.counts())?;
            let displs = to_counts(layout.displs())?;
            let mut partition = PartitionMut::new(global, &counts[..], &displs[..]);
            root_process.gather_varcount_into_root(local, &mut partition);
        } else {
            root_process.gather_varcount_into(local);
        }
        Ok(())
    }

    fn all_reduce_and(&self, local: bool) -> Result<bool, XError> {
        let mut global = false;
        self.world
            .all_reduce_into(&local, &mut global, SystemOperation::logical_and());
        Ok(global)
    }
}
