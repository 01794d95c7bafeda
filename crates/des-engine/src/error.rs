use des_core::{DesError, Violation, WorkerId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A causal-consistency check failed.  The run cannot continue.
    #[error("causality violation: {0}")]
    Violation(#[from] Violation),

    #[error("{worker} panicked: {message}")]
    WorkerPanicked { worker: WorkerId, message: String },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error(transparent)]
    Setup(#[from] DesError),
}

pub type EngineResult<T> = Result<T, EngineError>;
