//! CSV trace backend.
//!
//! Creates two files in the configured output directory:
//! - `windows.csv`
//! - `workers.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::TraceWriter;
use crate::{OutputResult, WindowRow, WorkerRow};

pub struct CsvTraceWriter {
    windows:  Writer<File>,
    workers:  Writer<File>,
    finished: bool,
}

impl CsvTraceWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut windows = Writer::from_path(dir.join("windows.csv"))?;
        windows.write_record([
            "round",
            "window_start_ns",
            "window_end_ns",
            "events_executed",
            "events_dropped",
            "events_clamped",
            "host_errors",
            "next_start_ns",
        ])?;

        let mut workers = Writer::from_path(dir.join("workers.csv"))?;
        workers.write_record([
            "worker",
            "events_executed",
            "events_dropped",
            "events_clamped",
            "host_errors",
            "queue_pushed",
            "queue_popped",
        ])?;

        Ok(Self { windows, workers, finished: false })
    }
}

impl TraceWriter for CsvTraceWriter {
    fn write_window(&mut self, row: &WindowRow) -> OutputResult<()> {
        self.windows.write_record(&[
            row.round.to_string(),
            row.window_start_ns.to_string(),
            row.window_end_ns.to_string(),
            row.events_executed.to_string(),
            row.events_dropped.to_string(),
            row.events_clamped.to_string(),
            row.host_errors.to_string(),
            row.next_start_ns.to_string(),
        ])?;
        Ok(())
    }

    fn write_workers(&mut self, rows: &[WorkerRow]) -> OutputResult<()> {
        for row in rows {
            self.workers.write_record(&[
                row.worker.to_string(),
                row.events_executed.to_string(),
                row.events_dropped.to_string(),
                row.events_clamped.to_string(),
                row.host_errors.to_string(),
                row.queue_pushed.to_string(),
                row.queue_popped.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.windows.flush()?;
        self.workers.flush()?;
        Ok(())
    }
}
