//! Global window pacing.
//!
//! The coordinator is plain data: it never touches a thread or a queue.  The
//! engine feeds it the workers' reports and it decides the next window.
//!
//! # Minimum time jump
//!
//! ```text
//! min_time_jump = max(configured floor, observed topology latency | default)
//! ```
//!
//! The observed latency may only be tightened, and only until the first
//! window opens.  After that it is frozen: every event already in flight was
//! clamped against the old bound, so relaxing or tightening it mid-run would
//! invalidate the clamp.

use des_core::time::NANOS_PER_MILLI;
use des_core::{EngineConfig, SimTime, Violation, Window, WorkerId};

/// Outcome of one `run_window` call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum WindowResult {
    /// Another window is open; call `run_window` again.
    Continue,
    /// No more events before the end time, or the run was stopped.
    Finished,
}

/// Outcome of a topology latency report.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MinJumpUpdate {
    /// The observed bound was set or lowered to `now_ns`.
    Tightened { now_ns: u64 },
    /// The candidate was not smaller than the current bound, or not positive.
    Unchanged,
    /// The first window has already opened; the report was ignored.
    Frozen,
}

#[derive(Clone, Debug)]
pub struct Coordinator {
    window:            Window,
    end_time:          SimTime,
    /// Operator floor in ns; 0 means none.
    min_jump_config:   u64,
    min_jump_observed: Option<u64>,
    min_jump_default:  u64,
    frozen:            bool,
    killed:            bool,
}

impl Coordinator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window:            Window::default(),
            end_time:          config.end_time(),
            min_jump_config:   config.min_run_ahead_ns(),
            min_jump_observed: None,
            min_jump_default:  config.default_min_jump_ns(),
            frozen:            false,
            killed:            false,
        }
    }

    /// `max(configured floor, observed latency)`, with the default standing
    /// in for the observed latency until the topology reports one.
    pub fn min_time_jump(&self) -> u64 {
        let observed = self.min_jump_observed.unwrap_or(self.min_jump_default);
        observed.max(self.min_jump_config).max(1)
    }

    /// Offer a topology link latency in milliseconds.
    pub fn update_min_time_jump(&mut self, candidate_ms: f64) -> MinJumpUpdate {
        if self.frozen {
            tracing::warn!(
                candidate_ms,
                current_ns = self.min_time_jump(),
                "min time jump is frozen once execution starts; update ignored"
            );
            return MinJumpUpdate::Frozen;
        }
        if !(candidate_ms.is_finite() && candidate_ms > 0.0) {
            return MinJumpUpdate::Unchanged;
        }
        let candidate_ns = ((candidate_ms * NANOS_PER_MILLI as f64).round() as u64).max(1);
        match self.min_jump_observed {
            Some(current) if candidate_ns >= current => MinJumpUpdate::Unchanged,
            _ => {
                self.min_jump_observed = Some(candidate_ns);
                tracing::debug!(observed_ns = candidate_ns, effective_ns = self.min_time_jump(), "min time jump tightened");
                MinJumpUpdate::Tightened { now_ns: candidate_ns }
            }
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze the min jump and open the first window at `start`.  Returns the
    /// window, or `None` if there is nothing to run.
    pub fn open(&mut self, start: SimTime) -> Option<Window> {
        self.frozen = true;
        match self.advance(start) {
            WindowResult::Continue => Some(self.window),
            WindowResult::Finished => None,
        }
    }

    /// Open the single unbounded window `[0, end_time)` used when no worker
    /// threads run.
    pub fn open_unbounded(&mut self) -> Option<Window> {
        self.frozen = true;
        self.window = Window::new(SimTime::ZERO, self.end_time);
        if self.window.is_empty() {
            self.killed = true;
            return None;
        }
        Some(self.window)
    }

    /// The barrier step: every worker has drained the current window and
    /// reported its earliest pending event.
    ///
    /// A report below the window end means an event was left behind, which
    /// is fatal.
    pub fn on_window_drained(
        &mut self,
        reports: &[(WorkerId, SimTime)],
    ) -> Result<WindowResult, Violation> {
        if let Some(&(worker, reported)) = reports.iter().find(|(_, t)| *t < self.window.end) {
            self.killed = true;
            return Err(Violation::MissedEvent { worker, reported, window_end: self.window.end });
        }
        let start = reports.iter().map(|&(_, t)| t).min().unwrap_or(SimTime::MAX);
        Ok(self.advance(start))
    }

    fn advance(&mut self, start: SimTime) -> WindowResult {
        if self.killed {
            return WindowResult::Finished;
        }
        let end = start.saturating_add(self.min_time_jump()).min(self.end_time);
        if start >= end {
            self.killed = true;
            return WindowResult::Finished;
        }
        debug_assert!(start >= self.window.start, "window start moved backwards");
        self.window = Window::new(start, end);
        WindowResult::Continue
    }

    /// Stop advancing.  Idempotent.
    pub fn kill(&mut self) {
        self.killed = true;
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// The current (or last) window.
    pub fn window(&self) -> Window {
        self.window
    }

    pub fn end_time(&self) -> SimTime {
        self.end_time
    }
}
