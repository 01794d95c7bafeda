//! Error taxonomy shared by every `des-*` crate.
//!
//! - [`Violation`]: a broken causal-safety invariant.  Always fatal; the
//!   engine stops every worker and returns it to the driver.
//! - [`ScheduleError`]: a bad request from host code.  Returned to the caller
//!   of `schedule_event`, never fatal to the engine.
//! - [`DesError`]: setup and configuration failures.

use thiserror::Error;

use crate::{HostId, SimTime, WorkerId};

/// A causal-consistency violation.  The simulation cannot continue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{host}: popped event at {time} at or past barrier {barrier}")]
    PoppedPastBarrier {
        host:    HostId,
        time:    SimTime,
        barrier: SimTime,
    },

    #[error("{host}: event at {time} precedes last executed event at {last}")]
    TimeReversal {
        host: HostId,
        time: SimTime,
        last: SimTime,
    },

    #[error("queue {queue} popped {time} after already popping {last}")]
    NonMonotonicQueue {
        queue: String,
        time:  SimTime,
        last:  SimTime,
    },

    #[error("{worker} reported next event at {reported}, before the window end {window_end}")]
    MissedEvent {
        worker:     WorkerId,
        reported:   SimTime,
        window_end: SimTime,
    },

    #[error("{host}: event addressed to a host with no table slot")]
    MissingHost { host: HostId },
}

/// A scheduling request that the engine refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("requested time {requested} is before the current time {now}")]
    InPast { requested: SimTime, now: SimTime },

    #[error("delay of {delay}ns from {now} overflows simulation time")]
    Overflow { now: SimTime, delay: u64 },

    #[error("unknown host {0}")]
    UnknownHost(HostId),
}

/// Setup-time errors.
#[derive(Debug, Error)]
pub enum DesError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("host {0} not found")]
    HostNotFound(HostId),

    #[error("worker {worker} out of range (engine has {slots} worker slots)")]
    WorkerOutOfRange { worker: WorkerId, slots: usize },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Shorthand result type for setup paths in all `des-*` crates.
pub type DesResult<T> = Result<T, DesError>;
