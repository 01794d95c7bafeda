//! `TraceObserver<W>` — bridges `EngineObserver` to a `TraceWriter`.

use des_core::SimTime;
use des_engine::{EngineObserver, RoundSummary, RunSummary};

use crate::row::{WindowRow, WorkerRow};
use crate::writer::TraceWriter;
use crate::{OutputError, OutputResult};

/// An [`EngineObserver`] that writes one row per window and the per-worker
/// totals to any [`TraceWriter`].
///
/// Observer callbacks cannot fail, so the first write error is stored.  After
/// `engine.run()` returns, check it with [`take_error`][Self::take_error].
pub struct TraceObserver<W: TraceWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: TraceWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: TraceWriter> EngineObserver for TraceObserver<W> {
    fn on_window_end(&mut self, round: &RoundSummary) {
        let row = WindowRow {
            round:           round.round,
            window_start_ns: round.window.start.as_nanos(),
            window_end_ns:   round.window.end.as_nanos(),
            events_executed: round.events_executed,
            events_dropped:  round.events_dropped,
            events_clamped:  round.events_clamped,
            host_errors:     round.host_errors,
            next_start_ns:   round.next_start.unwrap_or(SimTime::MAX).as_nanos(),
        };
        let result = self.writer.write_window(&row);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        let rows: Vec<WorkerRow> = summary
            .workers
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let queue = summary.queues.get(i).copied().unwrap_or_default();
                WorkerRow {
                    worker:          i as u32,
                    events_executed: w.events_executed,
                    events_dropped:  w.events_dropped,
                    events_clamped:  w.events_clamped,
                    host_errors:     w.host_errors,
                    queue_pushed:    queue.pushed,
                    queue_popped:    queue.popped,
                }
            })
            .collect();
        let result = self.writer.write_workers(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
