//! Driver ↔ worker barrier.
//!
//! One mutex guards the round state; two condvars carry the two directions:
//! `go` wakes workers when a round is published, `done` wakes the driver when
//! the last worker reports.  The kill flag lives outside the mutex so workers
//! can poll it between events without contention.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use des_core::{SimTime, Violation, Window, WorkerId};
use des_policy::Barrier;

use crate::WorkerStats;

/// Lock `mutex`, recovering from poisoning.  Poisoning only follows a worker
/// panic, which already puts the engine on its kill path.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a worker needs to run one round.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RoundPlan {
    pub window:  Window,
    /// Clamp rule for events crossing a causal boundary.
    pub barrier: Barrier,
}

#[derive(Debug)]
pub(crate) enum WorkerFailure {
    Violation(Violation),
    Panicked(String),
}

#[derive(Debug)]
pub(crate) struct WorkerReport {
    pub worker:    WorkerId,
    /// Earliest pending event this worker knows about.
    pub next_time: SimTime,
    pub stats:     WorkerStats,
    pub failure:   Option<WorkerFailure>,
}

impl WorkerReport {
    pub(crate) fn panicked(worker: WorkerId, message: String) -> Self {
        Self {
            worker,
            next_time: SimTime::MAX,
            stats:     WorkerStats::default(),
            failure:   Some(WorkerFailure::Panicked(message)),
        }
    }
}

#[derive(Default)]
struct RoundState {
    round:    u64,
    plan:     Option<RoundPlan>,
    pending:  usize,
    reports:  Vec<WorkerReport>,
    shutdown: bool,
}

pub(crate) struct WindowSync {
    workers: usize,
    state:   Mutex<RoundState>,
    go:      Condvar,
    done:    Condvar,
    killed:  Arc<AtomicBool>,
}

impl WindowSync {
    pub(crate) fn new(workers: usize) -> Self {
        Self {
            workers,
            state:  Mutex::new(RoundState::default()),
            go:     Condvar::new(),
            done:   Condvar::new(),
            killed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Publish a new round to every worker.
    pub(crate) fn start_round(&self, plan: RoundPlan) {
        let mut state = lock(&self.state);
        state.round += 1;
        state.plan = Some(plan);
        state.pending = self.workers;
        state.reports.clear();
        self.go.notify_all();
    }

    /// Block until a round newer than `seen` is published.  Returns the round
    /// number and plan, or `None` on shutdown.
    pub(crate) fn wait_for_round(&self, seen: u64) -> Option<(u64, RoundPlan)> {
        let mut state = lock(&self.state);
        loop {
            if state.shutdown {
                return None;
            }
            if state.round > seen {
                if let Some(plan) = state.plan {
                    return Some((state.round, plan));
                }
            }
            state = self.go.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(crate) fn finish(&self, report: WorkerReport) {
        let mut state = lock(&self.state);
        state.reports.push(report);
        state.pending = state.pending.saturating_sub(1);
        if state.pending == 0 {
            self.done.notify_all();
        }
    }

    /// Block until every worker has reported; returns the reports ordered by
    /// worker.
    pub(crate) fn wait_done(&self) -> Vec<WorkerReport> {
        let mut state = lock(&self.state);
        while state.pending > 0 {
            state = self.done.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        let mut reports = std::mem::take(&mut state.reports);
        reports.sort_by_key(|r| r.worker);
        reports
    }

    /// Release every waiting worker for good.
    pub(crate) fn shutdown(&self) {
        let mut state = lock(&self.state);
        state.shutdown = true;
        self.go.notify_all();
    }

    pub(crate) fn kill(&self) {
        self.killed.store(true, Ordering::Release);
    }

    pub(crate) fn is_killed(&self) -> bool {
        self.killed.load(Ordering::Acquire)
    }

    pub(crate) fn kill_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.killed)
    }
}
