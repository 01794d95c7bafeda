use des_core::{HostId, ScheduleError};
use thiserror::Error;

/// An error raised by host application code.
///
/// These never stop the engine: the worker logs them, counts them in
/// [`HostStats`][crate::HostStats], and moves on to the next event.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("application error: {0}")]
    App(String),

    #[error("malformed packet from {from}: {reason}")]
    Malformed { from: HostId, reason: String },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type HostResult<T> = Result<T, HostError>;
