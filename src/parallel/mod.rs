//! Worker groups and the collectives the distributed strategy is built on.
//!
//! A group is a fixed set of `size()` ranks. Every method of [`Comm`] except
//! `rank`/`size` is a collective: all ranks must call it, in the same order,
//! or the group deadlocks. There is no timeout and no recovery; only the
//! thread transport notices a rank that has left and fails its peers'
//! pending collectives.

use crate::distributed::partition::TransferLayout;
use crate::error::XError;

/// Rank that owns the full matrix and the result.
pub const ROOT: usize = 0;

/// Element types that can travel through a [`Comm`].
#[cfg(feature = "mpi")]
pub trait Element: Copy + Default + Send + Sync + 'static + mpi::datatype::Equivalence {}
#[cfg(feature = "mpi")]
impl<T: Copy + Default + Send + Sync + 'static + mpi::datatype::Equivalence> Element for T {}

/// Element types that can travel through a [`Comm`].
#[cfg(not(feature = "mpi"))]
pub trait Element: Copy + Default + Send + Sync + 'static {}
#[cfg(not(feature = "mpi"))]
impl<T: Copy + Default + Send + Sync + 'static> Element for T {}

pub trait Comm {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn is_root(&self) -> bool {
        self.rank() == ROOT
    }
    fn barrier(&self) -> Result<(), XError>;
    /// Copy `buf` from `root` into `buf` on every other rank.
    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), XError>;
    /// Variable-count scatter: rank `r` receives `layout.segment(r)` of
    /// `global` into `local`. `global` is only read on `root`.
    fn scatter_varcount<T: Element>(
        &self,
        global: &[T],
        layout: &TransferLayout,
        local: &mut [T],
        root: usize,
    ) -> Result<(), XError>;
    /// Variable-count gather: `local` of rank `r` lands in
    /// `layout.segment(r)` of `global`. `global` is only written on `root`.
    fn gather_varcount<T: Element>(
        &self,
        local: &[T],
        layout: &TransferLayout,
        global: &mut [T],
        root: usize,
    ) -> Result<(), XError>;
    /// Logical AND of `local` over all ranks, returned on every rank.
    fn all_reduce_and(&self, local: bool) -> Result<bool, XError>;
}

pub(crate) fn check_len(expected: usize, found: usize) -> Result<(), XError> {
    if expected != found {
        return Err(XError::ShapeMismatch { expected, found });
    }
    Ok(())
}

pub mod thread_comm;
pub use thread_comm::{ThreadComm, ThreadGroup};

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;
