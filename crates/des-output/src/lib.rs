//! `des-output` — run traces for the des scheduler.
//!
//! | Writer            | Files created                     |
//! |-------------------|-----------------------------------|
//! | [`CsvTraceWriter`] | `windows.csv`, `workers.csv`     |
//!
//! Writers implement [`TraceWriter`] and are driven by [`TraceObserver`],
//! which implements `des_engine::EngineObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use des_output::{CsvTraceWriter, TraceObserver};
//!
//! let writer = CsvTraceWriter::new(Path::new("./trace"))?;
//! let mut obs = TraceObserver::new(writer);
//! engine.run(&mut obs)?;
//! if let Some(e) = obs.take_error() { eprintln!("trace error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvTraceWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TraceObserver;
pub use row::{WindowRow, WorkerRow};
pub use writer::TraceWriter;
