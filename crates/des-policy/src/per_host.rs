//! `PerHostPolicy` — one locked queue per host.
//!
//! Each worker walks its assigned hosts round-robin: it drains host `i` up to
//! the barrier, then moves to host `i + 1`.  The cursor rewinds to the first
//! host whenever a new barrier is seen.
//!
//! Since a host's queue is drained in isolation, anything sent from one host
//! to another may arrive after the receiver has already been drained.  Every
//! event with `source != destination` is therefore a crossing event.

use std::sync::Mutex;

use des_core::{
    DesError, DesResult, Event, HostId, PolicyKind, QueueConfig, ScheduleError, SimTime, Violation,
    WorkerId,
};
use des_queue::{QueueStats, WindowedQueue};

use crate::policy::{clamp, lock, sum_stats};
use crate::{Barrier, Delivery, SchedulingPolicy};

struct HostEntry {
    worker: WorkerId,
    queue:  Mutex<WindowedQueue>,
}

#[derive(Default)]
struct Cursor {
    barrier: SimTime,
    index:   usize,
}

#[derive(Default)]
struct WorkerHosts {
    hosts:  Vec<HostId>,
    cursor: Mutex<Cursor>,
}

pub struct PerHostPolicy {
    config:  QueueConfig,
    /// Indexed by `HostId`; `None` for ids never registered.
    hosts:   Vec<Option<HostEntry>>,
    workers: Vec<WorkerHosts>,
}

impl PerHostPolicy {
    pub fn new(workers: usize, config: QueueConfig) -> Self {
        Self {
            config,
            hosts:   Vec::new(),
            workers: (0..workers).map(|_| WorkerHosts::default()).collect(),
        }
    }

    fn entry(&self, host: HostId) -> Option<&HostEntry> {
        self.hosts.get(host.index()).and_then(Option::as_ref)
    }
}

impl SchedulingPolicy for PerHostPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::PerHost
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
        if self.hosts.len() <= host.index() {
            self.hosts.resize_with(host.index() + 1, || None);
        }
        if self.hosts[host.index()].is_some() {
            return Err(DesError::Config(format!("{host} registered twice")));
        }
        owner.hosts.push(host);
        self.hosts[host.index()] = Some(HostEntry {
            worker,
            queue: Mutex::new(WindowedQueue::new(self.config, host.to_string())),
        });
        Ok(())
    }

    fn assigned_hosts(&self, worker: WorkerId) -> &[HostId] {
        self.workers.get(worker.index()).map_or(&[], |w| w.hosts.as_slice())
    }

    fn worker_of(&self, host: HostId) -> Option<WorkerId> {
        self.entry(host).map(|e| e.worker)
    }

    fn crosses_boundary(&self, source: HostId, destination: HostId) -> bool {
        source != destination
    }

    fn push(
        &self,
        event:   Event,
        source:  HostId,
        barrier: Barrier,
    ) -> Result<Delivery, ScheduleError> {
        let destination = event.destination();
        let entry = self.entry(destination).ok_or(ScheduleError::UnknownHost(destination))?;
        let (event, clamped) = clamp(event, self.crosses_boundary(source, destination), barrier);
        let time = event.time();
        lock(&entry.queue).push(event);
        Ok(Delivery { time, worker: entry.worker, clamped })
    }

    fn pop(&self, worker: WorkerId, barrier: SimTime) -> Result<Option<Event>, Violation> {
        let Some(owner) = self.workers.get(worker.index()) else {
            return Ok(None);
        };
        let mut cursor = lock(&owner.cursor);
        if cursor.barrier != barrier {
            *cursor = Cursor { barrier, index: 0 };
        }
        while let Some(&host) = owner.hosts.get(cursor.index) {
            if let Some(entry) = self.entry(host) {
                if let Some(event) = lock(&entry.queue).pop_before(barrier)? {
                    return Ok(Some(event));
                }
            }
            cursor.index += 1;
        }
        Ok(None)
    }

    fn next_time(&self, worker: WorkerId) -> SimTime {
        self.assigned_hosts(worker)
            .iter()
            .filter_map(|&h| self.entry(h))
            .map(|e| lock(&e.queue).next_time())
            .min()
            .unwrap_or(SimTime::MAX)
    }

    fn queue_stats(&self, worker: WorkerId) -> QueueStats {
        self.assigned_hosts(worker)
            .iter()
            .filter_map(|&h| self.entry(h))
            .map(|e| lock(&e.queue).stats())
            .fold(QueueStats::default(), sum_stats)
    }
}
