//! The `TraceWriter` trait implemented by trace backends.

use crate::{OutputResult, WindowRow, WorkerRow};

/// Sink for run traces.
///
/// Errors are stored by [`TraceObserver`][crate::TraceObserver] rather than
/// interrupting the run.
pub trait TraceWriter {
    /// Write one row per completed window.
    fn write_window(&mut self, row: &WindowRow) -> OutputResult<()>;

    /// Write the per-worker totals at the end of a run.
    fn write_workers(&mut self, rows: &[WorkerRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
