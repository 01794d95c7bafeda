//! `des-engine` — window coordinator and worker loop for the des scheduler.
//!
//! # Round structure
//!
//! ```text
//! driver                              worker w (one OS thread each)
//! ──────                              ─────────────────────────────
//! run_window():
//!   open / advance window [s, e)
//!   publish round ───────────────────▶ clock.barrier = e
//!                                      loop:
//!                                        killed?         → stop
//!                                        pop(w, e)       → None → drained
//!                                        check time order, execute on host
//!                                          new events → policy.push(.., floor = e + jump)
//!   wait for every worker ◀─────────── report min(next_time(w), min sent to others)
//!   new start = min(reports)
//!   new end   = min(start + jump, end_time)
//!   start >= end → Finished, else Continue
//! ```
//!
//! With `num_workers = 0` the calling thread is the only worker, the window
//! is `[0, end_time)` and nothing is clamped.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use des_core::EngineConfig;
//! use des_engine::{EngineBuilder, NoopObserver};
//!
//! let mut engine = EngineBuilder::new(config)
//!     .host(PingHost::new(HostId(1)))
//!     .host(PingHost::new(HostId(0)))
//!     .build()?;
//! engine.report_topology_min_latency(2.5);
//! let summary = engine.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod observer;
pub mod worker;

mod host_table;
mod sync;


pub use builder::EngineBuilder;
pub use coordinator::{Coordinator, MinJumpUpdate, WindowResult};
pub use engine::{Engine, StopHandle};
pub use error::{EngineError, EngineResult};
pub use observer::{EngineObserver, NoopObserver, RoundSummary, RunSummary, WorkerStats};
pub use worker::{WorkerClock, WorkerContext};
