//! `PerThreadPolicy` — one locked queue per worker thread.
//!
//! All hosts owned by a worker share its queue, so events between them are
//! totally ordered by time and never need clamping.  Only events between
//! hosts on different workers cross a boundary.

use std::sync::Mutex;

use des_core::{
    DesError, DesResult, Event, HostId, PolicyKind, QueueConfig, ScheduleError, SimTime, Violation,
    WorkerId,
};
use des_queue::{QueueStats, WindowedQueue};

use crate::policy::{clamp, lock};
use crate::{Barrier, Delivery, SchedulingPolicy};

struct WorkerQueue {
    hosts: Vec<HostId>,
    queue: Mutex<WindowedQueue>,
}

pub struct PerThreadPolicy {
    /// Owner of each host, indexed by `HostId`; `INVALID` when unregistered.
    owners:  Vec<WorkerId>,
    workers: Vec<WorkerQueue>,
}

impl PerThreadPolicy {
    pub fn new(workers: usize, config: QueueConfig) -> Self {
        let workers = (0..workers)
            .map(|w| WorkerQueue {
                hosts: Vec::new(),
                queue: Mutex::new(WindowedQueue::new(config, format!("worker-{w}"))),
            })
            .collect();
        Self { owners: Vec::new(), workers }
    }
}

impl SchedulingPolicy for PerThreadPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::PerThread
    }

    fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn add_host(&mut self, host: HostId, worker: WorkerId) -> DesResult<()> {
        let slots = self.workers.len();
        let Some(owner) = self.workers.get_mut(worker.index()) else {
            return Err(DesError::WorkerOutOfRange { worker, slots });
        };
        if host == HostId::INVALID {
            return Err(DesError::Config("cannot register the INVALID host id".into()));
        }
        if self.owners.len() <= host.index() {
            self.owners.resize(host.index() + 1, WorkerId::INVALID);
        }
        if self.owners[host.index()] != WorkerId::INVALID {
            return Err(DesError::Config(format!("{host} registered twice")));
        }
        self.owners[host.index()] = worker;
        owner.hosts.push(host);
        Ok(())
    }

    fn assigned_hosts(&self, worker: WorkerId) -> &[HostId] {
        self.workers.get(worker.index()).map_or(&[], |w| w.hosts.as_slice())
    }

    fn worker_of(&self, host: HostId) -> Option<WorkerId> {
        self.owners.get(host.index()).copied().filter(|&w| w != WorkerId::INVALID)
    }

    fn crosses_boundary(&self, source: HostId, destination: HostId) -> bool {
        self.worker_of(source) != self.worker_of(destination)
    }

    fn push(
        &self,
        event:   Event,
        source:  HostId,
        barrier: Barrier,
    ) -> Result<Delivery, ScheduleError> {
        let destination = event.destination();
        let worker = self.worker_of(destination).ok_or(ScheduleError::UnknownHost(destination))?;
        let (event, clamped) = clamp(event, self.crosses_boundary(source, destination), barrier);
        let time = event.time();
        lock(&self.workers[worker.index()].queue).push(event);
        Ok(Delivery { time, worker, clamped })
    }

    fn pop(&self, worker: WorkerId, barrier: SimTime) -> Result<Option<Event>, Violation> {
        match self.workers.get(worker.index()) {
            Some(w) => lock(&w.queue).pop_before(barrier),
            None    => Ok(None),
        }
    }

    fn next_time(&self, worker: WorkerId) -> SimTime {
        self.workers
            .get(worker.index())
            .map_or(SimTime::MAX, |w| lock(&w.queue).next_time())
    }

    fn queue_stats(&self, worker: WorkerId) -> QueueStats {
        self.workers
            .get(worker.index())
            .map_or_else(QueueStats::default, |w| lock(&w.queue).stats())
    }
}
