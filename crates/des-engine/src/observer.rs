//! Engine observer trait and the summaries it receives.

use des_core::{SimTime, Window};
use des_queue::QueueStats;

/// Per-worker execution counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Events handed to a host callback.
    pub events_executed: u64,
    /// Events discarded because their host was not running.
    pub events_dropped:  u64,
    /// Deliveries whose time was raised to the cross-boundary floor.
    pub events_clamped:  u64,
    /// Host callbacks that returned an error.
    pub host_errors:     u64,
}

impl WorkerStats {
    pub fn absorb(&mut self, other: &WorkerStats) {
        self.events_executed += other.events_executed;
        self.events_dropped += other.events_dropped;
        self.events_clamped += other.events_clamped;
        self.host_errors += other.host_errors;
    }
}

/// What happened in one window, summed over every worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    /// 1-based round number.
    pub round:           u64,
    pub window:          Window,
    pub events_executed: u64,
    pub events_dropped:  u64,
    pub events_clamped:  u64,
    pub host_errors:     u64,
    /// Start of the following window, or `None` if the run finished.
    pub next_start:      Option<SimTime>,
}

/// Totals for a complete run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rounds:        u64,
    pub totals:        WorkerStats,
    /// Indexed by `WorkerId`.
    pub workers:       Vec<WorkerStats>,
    /// Queue counters for each worker's queues, indexed by `WorkerId`.
    pub queues:        Vec<QueueStats>,
    /// Barrier of the last window that ran.
    pub final_barrier: SimTime,
    pub min_time_jump: u64,
}

/// Callbacks invoked by [`Engine::run`][crate::Engine::run] and
/// [`Engine::step`][crate::Engine::step] at every window boundary.
///
/// All methods default to no-ops.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl EngineObserver for Progress {
///     fn on_window_end(&mut self, round: &RoundSummary) {
///         println!("{}: {} events", round.window, round.events_executed);
///     }
/// }
/// ```
pub trait EngineObserver {
    /// Called after the window is published, before any worker runs.
    fn on_window_start(&mut self, _window: Window) {}

    /// Called after every worker has drained the window.
    fn on_window_end(&mut self, _round: &RoundSummary) {}

    /// Called once when `run` returns successfully.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// An [`EngineObserver`] that does nothing.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}
