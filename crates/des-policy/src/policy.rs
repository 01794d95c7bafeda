//! The `SchedulingPolicy` trait and the shared clamp rule.

use std::sync::{Mutex, MutexGuard, PoisonError};

use des_core::{
    DesResult, Event, HostId, PolicyKind, QueueConfig, ScheduleError, SimTime, Violation, WorkerId,
};
use des_queue::QueueStats;

use crate::{PerHostPolicy, PerThreadPolicy};

/// The clamp rule in force while a window runs.
///
/// A crossing event earlier than `end` lands at `floor`.  Crossing events at
/// or after `end` are already causally safe and keep their time.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Barrier {
    pub end:   SimTime,
    /// Never below `end`.
    pub floor: SimTime,
}

impl Barrier {
    /// Nothing is clamped.  Used at setup and in serial mode.
    pub const NONE: Barrier = Barrier { end: SimTime::ZERO, floor: SimTime::ZERO };

    /// Clamp to the barrier itself.
    pub fn at(end: SimTime) -> Self {
        Self { end, floor: end }
    }

    /// Clamp events before `end` up to `floor`.
    pub fn with_floor(end: SimTime, floor: SimTime) -> Self {
        Self { end, floor: floor.max(end) }
    }
}

/// Where and when a pushed event ended up.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Delivery {
    /// The time the event was stored at.
    pub time:    SimTime,
    /// The worker that owns the destination host.
    pub worker:  WorkerId,
    /// `true` if the time was raised to the barrier floor.
    pub clamped: bool,
}

/// Strategy for grouping hosts' events into locked queues.
///
/// Hosts are registered once at setup with [`add_host`][Self::add_host];
/// the assignment never changes afterwards.  After setup the policy is shared
/// by reference across every worker thread.
///
/// # Contract
///
/// - `push` raises any event that crosses a causal boundary and is earlier
///   than `barrier.end` to exactly `barrier.floor`.  Later events keep
///   their time.
/// - `pop` never returns an event at or after `barrier`.
/// - Popped times are non-decreasing per underlying queue; a violation is
///   returned, not papered over.
pub trait SchedulingPolicy: Send + Sync {
    fn kind(&self) -> PolicyKind;

    /// Number of worker slots this policy was built for.
    fn worker_count(&self) -> usize;

    /// Register `host` as owned by `worker`.
    fn add_host(&mut self, host: HostId, worker: WorkerId) -> DesResult<()>;

    /// Hosts owned by `worker`, in registration order.
    fn assigned_hosts(&self, worker: WorkerId) -> &[HostId];

    fn worker_of(&self, host: HostId) -> Option<WorkerId>;

    /// `true` if an event from `source` to `destination` must be clamped.
    fn crosses_boundary(&self, source: HostId, destination: HostId) -> bool;

    /// Enqueue `event` (addressed to `event.destination()`), sent by
    /// `source` while `barrier` is in force.
    fn push(&self, event: Event, source: HostId, barrier: Barrier)
        -> Result<Delivery, ScheduleError>;

    /// The minimum event strictly before `barrier` among `worker`'s queues.
    fn pop(&self, worker: WorkerId, barrier: SimTime) -> Result<Option<Event>, Violation>;

    /// The earliest pending event time among `worker`'s queues, or
    /// `SimTime::MAX` when there is none.
    fn next_time(&self, worker: WorkerId) -> SimTime;

    /// Summed queue counters for `worker`'s queues.
    fn queue_stats(&self, worker: WorkerId) -> QueueStats;
}

/// Build one of the stock policies.
pub fn build_policy(
    kind:    PolicyKind,
    workers: usize,
    config:  QueueConfig,
) -> Box<dyn SchedulingPolicy> {
    match kind {
        PolicyKind::PerHost   => Box::new(PerHostPolicy::new(workers, config)),
        PolicyKind::PerThread => Box::new(PerThreadPolicy::new(workers, config)),
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Raise `event` to `barrier.floor` if it crosses a boundary and would land
/// before `barrier.end`.
pub(crate) fn clamp(event: Event, crossing: bool, barrier: Barrier) -> (Event, bool) {
    if !crossing || event.time() >= barrier.end {
        return (event, false);
    }
    let requested = event.time();
    let (event, clamped) = event.raise_to(barrier.floor);
    if clamped {
        tracing::debug!(
            src = %event.source(),
            dst = %event.destination(),
            %requested,
            end = %barrier.end,
            stored = %event.time(),
            "cross-boundary event clamped to barrier"
        );
    }
    (event, clamped)
}

/// Lock a queue, recovering from poisoning.  A poisoned queue only occurs
/// after a worker panic, at which point the engine is already shutting down.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn sum_stats(a: QueueStats, b: QueueStats) -> QueueStats {
    QueueStats {
        pushed:           a.pushed + b.pushed,
        popped:           a.popped + b.popped,
        intervals_opened: a.intervals_opened + b.intervals_opened,
        intervals_closed: a.intervals_closed + b.intervals_closed,
        discarded:        a.discarded + b.discarded,
    }
}
