//! The per-thread worker: pop, check, execute, repeat until the barrier.
//!
//! # Per-round state machine
//!
//! ```text
//! Idle ──round published──▶ Popping ──event──▶ Executing ──▶ Popping
//!                              │
//!                              └──none before barrier──▶ Drained ──report──▶ Idle
//! any state ──killed──▶ Drained (report and stop early)
//! ```
//!
//! There is no thread-local engine state.  Everything a round needs is in
//! the [`WorkerContext`] owned by the thread and the shared tables passed in
//! explicitly.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use des_core::{Event, HostId, ScheduleError, SimTime, Violation, WorkerId};
use des_host::{Dispatch, EventSink, Host};
use des_policy::{Barrier, SchedulingPolicy};

use crate::engine::Shared;
use crate::sync::{RoundPlan, WorkerFailure, WorkerReport};
use crate::WorkerStats;

/// A worker's view of simulated time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerClock {
    /// Time of the event being executed; `None` between events.
    pub now:           Option<SimTime>,
    /// Time of the last event this worker executed.
    pub last_executed: SimTime,
    /// Upper bound (exclusive) of the current window.
    pub barrier:       SimTime,
}

/// Explicit per-thread state, created once when the worker starts.
#[derive(Debug)]
pub struct WorkerContext {
    pub id:     WorkerId,
    pub clock:  WorkerClock,
    /// Cumulative over every round this worker has run.
    pub totals: WorkerStats,
}

impl WorkerContext {
    pub fn new(id: WorkerId) -> Self {
        Self { id, clock: WorkerClock::default(), totals: WorkerStats::default() }
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Routes events created by host callbacks into the policy.
///
/// Tracks the earliest event handed to another worker this round: that
/// worker may already have reported, so this worker must report it instead.
struct Dispatcher<'a> {
    policy:   &'a dyn SchedulingPolicy,
    worker:   WorkerId,
    source:   HostId,
    barrier:  Barrier,
    min_sent: SimTime,
    clamped:  u64,
}

impl EventSink for Dispatcher<'_> {
    fn deliver(&mut self, event: Event) -> Result<SimTime, ScheduleError> {
        let delivery = self.policy.push(event, self.source, self.barrier)?;
        if delivery.clamped {
            self.clamped += 1;
        }
        if delivery.worker != self.worker {
            self.min_sent = self.min_sent.min(delivery.time);
        }
        Ok(delivery.time)
    }
}

// ── Round ─────────────────────────────────────────────────────────────────────

/// Drain every event before `plan.window.end` from `ctx.id`'s queues.
pub(crate) fn run_round<H: Host>(
    shared: &Shared<H>,
    ctx:    &mut WorkerContext,
    plan:   RoundPlan,
) -> WorkerReport {
    let policy = shared.policy.as_ref();
    ctx.clock.barrier = plan.window.end;

    let mut stats = WorkerStats::default();
    let mut dispatcher = Dispatcher {
        policy,
        worker:   ctx.id,
        source:   HostId::INVALID,
        barrier:  plan.barrier,
        min_sent: SimTime::MAX,
        clamped:  0,
    };

    let outcome = loop {
        if shared.sync.is_killed() {
            break Ok(());
        }
        let event = match policy.pop(ctx.id, plan.window.end) {
            Ok(Some(event)) => event,
            Ok(None) => break Ok(()),
            Err(violation) => break Err(violation),
        };
        if let Err(violation) = execute(shared, ctx, &mut dispatcher, &mut stats, event) {
            break Err(violation);
        }
    };

    stats.events_clamped = dispatcher.clamped;
    ctx.totals.absorb(&stats);
    let next_time = policy.next_time(ctx.id).min(dispatcher.min_sent);
    tracing::trace!(worker = %ctx.id, executed = stats.events_executed, next = %next_time, "window drained");

    WorkerReport {
        worker: ctx.id,
        next_time,
        stats,
        failure: outcome.err().map(WorkerFailure::Violation),
    }
}

fn execute<H: Host>(
    shared:     &Shared<H>,
    ctx:        &mut WorkerContext,
    dispatcher: &mut Dispatcher<'_>,
    stats:      &mut WorkerStats,
    event:      Event,
) -> Result<(), Violation> {
    let host = event.destination();
    let time = event.time();
    if time >= ctx.clock.barrier {
        return Err(Violation::PoppedPastBarrier { host, time, barrier: ctx.clock.barrier });
    }
    let mut slot = shared.hosts.lock(host).ok_or(Violation::MissingHost { host })?;
    if time < slot.meta.last_executed {
        return Err(Violation::TimeReversal { host, time, last: slot.meta.last_executed });
    }

    ctx.clock.now = Some(time);
    dispatcher.source = host;
    let kind = event.action().kind();
    tracing::trace!(%host, %time, kind, "execute");

    match slot.execute(event, dispatcher, shared.heartbeat) {
        Ok(Dispatch::Handled) => stats.events_executed += 1,
        Ok(Dispatch::Dropped) => stats.events_dropped += 1,
        Err(err) => {
            stats.events_executed += 1;
            stats.host_errors += 1;
            slot.meta.stats.errors += 1;
            tracing::warn!(%host, %time, kind, error = %err, "host callback failed");
        }
    }

    ctx.clock.last_executed = time;
    ctx.clock.now = None;
    Ok(())
}

// ── Thread entry ──────────────────────────────────────────────────────────────

/// Run `run_round` with panics turned into a failure report.
pub(crate) fn run_round_guarded<H: Host>(
    shared: &Shared<H>,
    ctx:    &mut WorkerContext,
    plan:   RoundPlan,
) -> WorkerReport {
    let id = ctx.id;
    match catch_unwind(AssertUnwindSafe(|| run_round(shared, ctx, plan))) {
        Ok(report) => report,
        Err(payload) => {
            shared.sync.kill();
            let message = panic_message(payload.as_ref());
            tracing::error!(worker = %id, %message, "worker panicked");
            WorkerReport::panicked(id, message)
        }
    }
}

/// Body of a worker OS thread.
pub(crate) fn worker_main<H: Host>(shared: Arc<Shared<H>>, id: WorkerId) {
    let mut ctx = WorkerContext::new(id);
    let mut seen = 0;
    tracing::debug!(worker = %id, hosts = shared.policy.assigned_hosts(id).len(), "worker started");
    while let Some((round, plan)) = shared.sync.wait_for_round(seen) {
        seen = round;
        let report = run_round_guarded(&shared, &mut ctx, plan);
        shared.sync.finish(report);
    }
    tracing::debug!(worker = %id, executed = ctx.totals.events_executed, "worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
