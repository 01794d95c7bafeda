//! The common queue interface and its runtime-selected implementation.

use des_core::{Event, QueueMode};

use crate::{FlatQueue, IntervalQueue};

/// Diagnostic counters.  Not used for correctness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub pushed:           u64,
    pub popped:           u64,
    pub intervals_opened: u64,
    pub intervals_closed: u64,
    /// Events still queued in an interval when it was ended.
    pub discarded:        u64,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Capability set shared by every per-host event queue.
///
/// # Contract
///
/// - At most one interval is current.  Opening a second one before the first
///   is ended is a programming error and panics.
/// - `pop` only returns events of the current interval.
/// - Among events of one interval, `pop` returns them in `Event` order.
pub trait EventQueue {
    /// Insert `event` into the bucket for `interval`, creating it lazily.
    fn push(&mut self, event: Event, interval: u64);

    /// Make `interval` current.  An interval with no events is a legal,
    /// empty current interval.
    ///
    /// # Panics
    /// Panics if another interval is still current.
    fn start_interval(&mut self, interval: u64);

    /// Detach and discard `interval`.  Leftover events are a scheduling bug;
    /// debug builds panic on them.
    fn end_interval(&mut self, interval: u64);

    /// Remove and return the minimum event of the current interval.
    fn pop(&mut self) -> Option<Event>;

    /// The minimum event of the current interval.  If that is empty, the
    /// minimum of the lowest non-empty interval.  Diagnostics and
    /// next-time queries only.
    fn peek(&self) -> Option<&Event>;

    /// The minimum event of the current interval only.
    fn peek_current(&self) -> Option<&Event>;

    /// The interval currently open, if any.
    fn current_interval(&self) -> Option<u64>;

    /// The lowest interval that holds at least one event.
    fn first_interval(&self) -> Option<u64>;

    /// Total queued events across all intervals.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> QueueStats;
}

// ── HostQueue ─────────────────────────────────────────────────────────────────

/// An [`EventQueue`] whose representation is chosen at runtime from
/// [`QueueMode`].
#[derive(Debug)]
pub enum HostQueue {
    Interval(IntervalQueue),
    Flat(FlatQueue),
}

impl HostQueue {
    pub fn new(mode: QueueMode) -> Self {
        match mode {
            QueueMode::Interval => HostQueue::Interval(IntervalQueue::new()),
            QueueMode::Flat     => HostQueue::Flat(FlatQueue::new()),
        }
    }

    pub fn mode(&self) -> QueueMode {
        match self {
            HostQueue::Interval(_) => QueueMode::Interval,
            HostQueue::Flat(_)     => QueueMode::Flat,
        }
    }
}

/// Forward a call to whichever variant is live.
macro_rules! delegate {
    ($self:ident, $q:ident => $body:expr) => {
        match $self {
            HostQueue::Interval($q) => $body,
            HostQueue::Flat($q)     => $body,
        }
    };
}

impl EventQueue for HostQueue {
    fn push(&mut self, event: Event, interval: u64) {
        delegate!(self, q => q.push(event, interval))
    }

    fn start_interval(&mut self, interval: u64) {
        delegate!(self, q => q.start_interval(interval))
    }

    fn end_interval(&mut self, interval: u64) {
        delegate!(self, q => q.end_interval(interval))
    }

    fn pop(&mut self) -> Option<Event> {
        delegate!(self, q => q.pop())
    }

    fn peek(&self) -> Option<&Event> {
        delegate!(self, q => q.peek())
    }

    fn peek_current(&self) -> Option<&Event> {
        delegate!(self, q => q.peek_current())
    }

    fn current_interval(&self) -> Option<u64> {
        delegate!(self, q => q.current_interval())
    }

    fn first_interval(&self) -> Option<u64> {
        delegate!(self, q => q.first_interval())
    }

    fn len(&self) -> usize {
        delegate!(self, q => q.len())
    }

    fn stats(&self) -> QueueStats {
        delegate!(self, q => q.stats())
    }
}
