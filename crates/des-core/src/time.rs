//! Simulation time model.
//!
//! # Design
//!
//! Time is an absolute count of simulated nanoseconds held in `SimTime`.
//! `SimTime::MAX` doubles as "infinity": it is what an empty queue reports as
//! its next event time, and what an unbounded end time is configured as.
//!
//! Using an integer nanosecond count as the canonical unit means all window
//! arithmetic is exact and comparisons are O(1).  Additions that could reach
//! infinity saturate instead of wrapping.

use std::fmt;

pub const NANOS_PER_MILLI: u64 = 1_000_000;
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation timestamp in nanoseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// Infinity.  Never a valid event time.
    pub const MAX: SimTime = SimTime(u64::MAX);

    #[inline]
    pub fn from_nanos(ns: u64) -> SimTime {
        SimTime(ns)
    }

    #[inline]
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(NANOS_PER_MILLI))
    }

    #[inline]
    pub fn from_secs(secs: u64) -> SimTime {
        SimTime(secs.saturating_mul(NANOS_PER_SEC))
    }

    #[inline]
    pub fn as_nanos(self) -> u64 {
        self.0
    }

    /// `true` for the infinity sentinel.
    #[inline]
    pub fn is_max(self) -> bool {
        self.0 == u64::MAX
    }

    /// Return the time `delay` nanoseconds after `self`, or `None` on
    /// overflow.
    #[inline]
    pub fn checked_add(self, delay: u64) -> Option<SimTime> {
        self.0.checked_add(delay).map(SimTime)
    }

    /// Like [`checked_add`][Self::checked_add] but clamps at infinity.
    #[inline]
    pub fn saturating_add(self, delay: u64) -> SimTime {
        SimTime(self.0.saturating_add(delay))
    }

    /// Nanoseconds elapsed from `earlier` to `self`, or `None` if `earlier`
    /// is later.
    #[inline]
    pub fn since(self, earlier: SimTime) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    /// Saturating: `MAX + n == MAX`.
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        self.saturating_add(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            return write!(f, "t=inf");
        }
        let secs = self.0 / NANOS_PER_SEC;
        let nanos = self.0 % NANOS_PER_SEC;
        write!(f, "t={secs}.{nanos:09}s")
    }
}

// ── Window ────────────────────────────────────────────────────────────────────

/// A half-open execution window `[start, end)`.  `end` is the barrier.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Window {
    pub start: SimTime,
    pub end:   SimTime,
}

impl Window {
    pub fn new(start: SimTime, end: SimTime) -> Self {
        Self { start, end }
    }

    /// `true` if `time` lies inside `[start, end)`.
    #[inline]
    pub fn contains(&self, time: SimTime) -> bool {
        self.start <= time && time < self.end
    }

    /// A window with no room to execute anything.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
