//! Engine configuration.
//!
//! These are plain initialization values.  Parsing them from a file or a
//! command line belongs to the application; the optional `serde` feature
//! makes that a one-liner.

use crate::time::{NANOS_PER_MILLI, NANOS_PER_SEC};
use crate::{DesError, DesResult, SimTime};

// ── Queue configuration ──────────────────────────────────────────────────────

/// Which per-queue data structure holds pending events.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QueueMode {
    /// One min-heap per coarse time interval (default).
    #[default]
    Interval,
    /// A single flat min-heap.  Cheaper when few future events are pending.
    Flat,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueConfig {
    pub mode:              QueueMode,
    /// Width of one bucketing interval.  Default: 1 s.
    pub interval_width_ns: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            mode:              QueueMode::Interval,
            interval_width_ns: NANOS_PER_SEC,
        }
    }
}

impl QueueConfig {
    /// The interval that `time` falls into.
    #[inline]
    pub fn interval_of(&self, time: SimTime) -> u64 {
        time.0 / self.interval_width_ns
    }

    /// First instant of `interval`.
    #[inline]
    pub fn interval_start(&self, interval: u64) -> SimTime {
        SimTime(interval.saturating_mul(self.interval_width_ns))
    }
}

// ── Policy selection ─────────────────────────────────────────────────────────

/// How hosts' events are grouped into locked queues.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PolicyKind {
    /// One queue per host; workers round-robin their hosts.
    PerHost,
    /// One queue per worker thread shared by all its hosts (default).
    #[default]
    PerThread,
}

// ── EngineConfig ─────────────────────────────────────────────────────────────

/// Top-level engine configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Worker thread count.  `0` runs everything on the calling thread with
    /// an unbounded window.
    pub num_workers: u32,

    /// Operator floor on the minimum time jump, in milliseconds.  `0` means
    /// "no floor".
    pub min_run_ahead_ms: u64,

    /// Simulation end time (exclusive).  `u64::MAX` runs until no events
    /// remain.
    pub end_time_ns: u64,

    /// Minimum time jump used until the topology reports a link latency.
    /// Default: 10 ms.
    pub default_min_jump_ms: u64,

    /// Master RNG seed.  The same seed and host→worker assignment always
    /// produce identical results.
    pub seed: u64,

    pub policy: PolicyKind,

    pub queue: QueueConfig,

    /// If set, every booted host emits a heartbeat this often.
    pub heartbeat_interval_ns: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_workers:           0,
            min_run_ahead_ms:      0,
            end_time_ns:           u64::MAX,
            default_min_jump_ms:   10,
            seed:                  0,
            policy:                PolicyKind::PerThread,
            queue:                 QueueConfig::default(),
            heartbeat_interval_ns: None,
        }
    }
}

impl EngineConfig {
    /// The instant at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_time(&self) -> SimTime {
        SimTime(self.end_time_ns)
    }

    /// `true` when no worker threads are spawned.
    #[inline]
    pub fn is_single_threaded(&self) -> bool {
        self.num_workers == 0
    }

    /// Number of worker contexts that own hosts (at least one).
    #[inline]
    pub fn worker_slots(&self) -> usize {
        self.num_workers.max(1) as usize
    }

    pub fn min_run_ahead_ns(&self) -> u64 {
        self.min_run_ahead_ms.saturating_mul(NANOS_PER_MILLI)
    }

    pub fn default_min_jump_ns(&self) -> u64 {
        self.default_min_jump_ms.saturating_mul(NANOS_PER_MILLI)
    }

    /// Check invariants that the engine relies on.
    pub fn validate(&self) -> DesResult<()> {
        if self.end_time_ns == 0 {
            return Err(DesError::Config("end_time_ns must be positive".into()));
        }
        if self.queue.interval_width_ns == 0 {
            return Err(DesError::Config("queue.interval_width_ns must be positive".into()));
        }
        if self.default_min_jump_ms == 0 {
            return Err(DesError::Config("default_min_jump_ms must be positive".into()));
        }
        match self.heartbeat_interval_ns {
            Some(0) => {
                return Err(DesError::Config("heartbeat_interval_ns must be positive".into()));
            }
            Some(_) if self.end_time_ns == u64::MAX => {
                return Err(DesError::Config(
                    "heartbeats need a finite end_time_ns or the run never ends".into(),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}
