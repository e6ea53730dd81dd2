//! In-process worker group.
//!
//! Each rank is an OS thread holding a [`ThreadComm`]. Ranks exchange owned
//! buffers over per-rank channels and leave every collective through a shared
//! barrier, so a collective returns only once the whole group has completed
//! it.
//!
//! A rank leaves the group when its `ThreadComm` is dropped, whether it
//! returned normally, returned early with an error or panicked. From then on
//! every collective that still waits on it fails with [`XError::Comm`] instead
//! of blocking, so [`ThreadGroup::run`] always returns.

use super::{check_len, Comm, Element};
use crate::distributed::partition::TransferLayout;
use crate::error::XError;
use std::any::Any;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

enum Envelope {
    Data { from: usize, payload: Box<dyn Any + Send> },
    Left { from: usize },
}

#[derive(Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    // first rank to drop its comm
    left: Option<usize>,
}

struct Shared {
    state: Mutex<BarrierState>,
    released: Condvar,
    inboxes: Vec<Sender<Envelope>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn left_group(from: usize) -> XError {
    XError::Comm(format!("rank {from} left the group"))
}

/// One rank of a [`ThreadGroup`].
pub struct ThreadComm {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
    inbox: Receiver<Envelope>,
}

impl ThreadComm {
    fn send<T: Element>(&self, to: usize, data: Vec<T>) -> Result<(), XError> {
        self.shared.inboxes[to]
            .send(Envelope::Data { from: self.rank, payload: Box::new(data) })
            .map_err(|_| left_group(to))
    }

    fn recv<T: Element>(&self) -> Result<(usize, Vec<T>), XError> {
        // departures are flagged before their envelopes are sent
        if let Some(from) = self.shared.lock().left {
            return Err(left_group(from));
        }
        let env = self
            .inbox
            .recv()
            .map_err(|_| XError::Comm(format!("rank {}: group hung up", self.rank)))?;
        match env {
            Envelope::Data { from, payload } => {
                let data = payload
                    .downcast::<Vec<T>>()
                    .map_err(|_| XError::Comm(format!("rank {}: unexpected payload from rank {from}", self.rank)))?;
                Ok((from, *data))
            }
            Envelope::Left { from } => Err(left_group(from)),
        }
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if state.left.is_none() {
            state.left = Some(self.rank);
        }
        drop(state);
        self.shared.released.notify_all();
        for (to, inbox) in self.shared.inboxes.iter().enumerate() {
            if to != self.rank {
                let _ = inbox.send(Envelope::Left { from: self.rank });
            }
        }
    }
}

impl Comm for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), XError> {
        let mut state = self.shared.lock();
        if let Some(from) = state.left {
            return Err(left_group(from));
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.size {
            state.arrived = 0;
            state.generation += 1;
            self.shared.released.notify_all();
            return Ok(());
        }
        // a completed generation wins over a departure seen afterwards
        while state.generation == generation {
            if let Some(from) = state.left {
                return Err(left_group(from));
            }
            state = self.shared.released.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        Ok(())
    }

    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), XError> {
        if self.rank == root {
            for to in (0..self.size).filter(|&r| r != root) {
                self.send(to, buf.to_vec())?;
            }
        } else {
            let (_, data) = self.recv::<T>()?;
            check_len(buf.len(), data.len())?;
            buf.copy_from_slice(&data);
        }
        self.barrier()
    }

    fn scatter_varcount<T: Element>(
        &self,
        global: &[T],
        layout: &TransferLayout,
        local: &mut [T],
        root: usize,
    ) -> Result<(), XError> {
        let mine = layout.segment(self.rank);
        check_len(mine.len, local.len())?;
        if self.rank == root {
            check_len(layout.total_len(), global.len())?;
            for (to, seg) in layout.segments().iter().enumerate() {
                let chunk = &global[seg.offset..seg.offset + seg.len];
                if to == root {
                    local.copy_from_slice(chunk);
                } else {
                    self.send(to, chunk.to_vec())?;
                }
            }
        } else {
            let (_, data) = self.recv::<T>()?;
            check_len(local.len(), data.len())?;
            local.copy_from_slice(&data);
        }
        self.barrier()
    }

    fn gather_varcount<T: Element>(
        &self,
        local: &[T],
        layout: &TransferLayout,
        global: &mut [T],
        root: usize,
    ) -> Result<(), XError> {
        check_len(layout.segment(self.rank).len, local.len())?;
        if self.rank == root {
            check_len(layout.total_len(), global.len())?;
            let own = layout.segment(root);
            global[own.offset..own.offset + own.len].copy_from_slice(local);
            for _ in 1..self.size {
                let (from, data) = self.recv::<T>()?;
                let seg = layout.segment(from);
                check_len(seg.len, data.len())?;
                global[seg.offset..seg.offset + seg.len].copy_from_slice(&data);
            }
        } else {
            self.send(root, local.to_vec())?;
        }
        self.barrier()
    }

    fn all_reduce_and(&self, local: bool) -> Result<bool, XError> {
        let root = super::ROOT;
        let mut verdict = [local];
        if self.rank == root {
            for _ in 1..self.size {
                let (_, data) = self.recv::<bool>()?;
                verdict[0] &= data.iter().all(|&v| v);
            }
        } else {
            self.send(root, vec![local])?;
        }
        self.barrier()?;
        self.broadcast(&mut verdict, root)?;
        Ok(verdict[0])
    }
}

/// A fixed-size group of in-process ranks.
pub struct ThreadGroup {
    workers: usize,
}

impl ThreadGroup {
    pub fn new(workers: usize) -> Result<Self, XError> {
        if workers == 0 {
            return Err(XError::InvalidConfig("worker count must be positive".into()));
        }
        Ok(ThreadGroup { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Build one connected [`ThreadComm`] per rank, in rank order.
    pub fn comms(&self) -> Vec<ThreadComm> {
        let (inboxes, receivers): (Vec<_>, Vec<_>) =
            (0..self.workers).map(|_| mpsc::channel::<Envelope>()).unzip();
        let shared = Arc::new(Shared {
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
            inboxes,
        });
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ThreadComm {
                rank,
                size: self.workers,
                shared: Arc::clone(&shared),
                inbox,
            })
            .collect()
    }

    /// Run `f` on every rank, each on its own thread, and return the results
    /// in rank order once all ranks have finished. A panicking rank is
    /// reported as [`XError::Comm`] after its peers have been released.
    pub fn run<F, R>(&self, f: F) -> Result<Vec<R>, XError>
    where
        F: Fn(&ThreadComm) -> R + Sync,
        R: Send,
    {
        let comms = self.comms();
        let f = &f;
        std::thread::scope(|s| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| s.spawn(move || f(&comm)))
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(rank, h)| {
                    h.join()
                        .map_err(|_| XError::Comm(format!("rank {rank} panicked")))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::partition::PartitionPlan;

    #[test]
    fn zero_workers_is_rejected() {
        assert!(ThreadGroup::new(0).is_err());
    }

    #[test]
    fn ranks_are_numbered_in_order() {
        let group = ThreadGroup::new(4).unwrap();
        let ranks = group.run(|c| (c.rank(), c.size())).unwrap();
        assert_eq!(ranks, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
    }

    #[test]
    fn broadcast_reaches_every_rank() {
        let group = ThreadGroup::new(3).unwrap();
        let out = group
            .run(|c| {
                let mut buf = if c.is_root() { vec![1.5, 2.5] } else { vec![0.0; 2] };
                c.broadcast(&mut buf, 0).unwrap();
                buf
            })
            .unwrap();
        assert!(out.iter().all(|b| b == &vec![1.5, 2.5]));
    }

    #[test]
    fn scatter_then_gather_restores_buffer() {
        let plan = PartitionPlan::new(5, 3).unwrap();
        let layout = plan.scatter_layout();
        let group = ThreadGroup::new(3).unwrap();
        let out = group
            .run(|c| {
                let global: Vec<u32> = if c.is_root() { (0..25).collect() } else { Vec::new() };
                let mut local = vec![0u32; plan.local_len(c.rank())];
                c.scatter_varcount(&global, &layout, &mut local, 0).unwrap();
                let first = local.first().copied();
                let mut back = if c.is_root() { vec![0u32; 25] } else { Vec::new() };
                c.gather_varcount(&local, &layout, &mut back, 0).unwrap();
                (first, back)
            })
            .unwrap();
        assert_eq!(out[0].0, Some(0));
        assert_eq!(out[1].0, Some(10));
        assert_eq!(out[2].0, Some(20));
        assert_eq!(out[0].1, (0..25).collect::<Vec<u32>>());
        assert!(out[1].1.is_empty());
    }

    #[test]
    fn panicking_rank_releases_its_peers() {
        let group = ThreadGroup::new(3).unwrap();
        let res = group.run(|c| {
            if c.rank() == 1 {
                panic!("rank 1 gives up");
            }
            c.barrier().is_ok()
        });
        assert!(matches!(res, Err(XError::Comm(msg)) if msg.contains("rank 1")));
    }

    #[test]
    fn early_return_fails_pending_collectives() {
        let group = ThreadGroup::new(3).unwrap();
        let out = group
            .run(|c| {
                if c.is_root() {
                    return None;
                }
                let mut buf = [0.0f64; 4];
                Some(c.broadcast(&mut buf, 0).map_err(|e| e.to_string()))
            })
            .unwrap();
        assert!(out[0].is_none());
        for r in &out[1..] {
            assert!(matches!(r, Some(Err(msg)) if msg.contains("rank 0 left")));
        }
    }

    #[test]
    fn repeated_barriers_complete_before_ranks_leave() {
        let group = ThreadGroup::new(4).unwrap();
        let out = group.run(|c| (0..50).all(|_| c.barrier().is_ok())).unwrap();
        assert_eq!(out, vec![true; 4]);
    }

    #[test]
    fn all_reduce_and_is_false_if_any_rank_is_false() {
        let group = ThreadGroup::new(5).unwrap();
        let out = group.run(|c| c.all_reduce_and(c.rank() != 3).unwrap()).unwrap();
        assert_eq!(out, vec![false; 5]);
        let out = group.run(|c| c.all_reduce_and(true).unwrap()).unwrap();
        assert_eq!(out, vec![true; 5]);
    }
}
