//! `des-host` — the boundary between the scheduler and host applications.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`model`]   | `Host` trait — what a virtual host does when an event reaches it  |
//! | [`context`] | `HostContext<'a>`, `EventSink` — explicit handle for scheduling   |
//! | [`slot`]    | `HostSlot<H>`, `HostMeta`, `HostStats` — per-host state + dispatch |
//! | [`noop`]    | `NoopHost` — boots and ignores everything                         |
//! | [`error`]   | `HostError`, `HostResult<T>`                                      |
//!
//! # Design notes
//!
//! There is no thread-local "current host" or "current worker".  Every
//! callback receives a [`HostContext`] that carries the executing host, the
//! current time, and a `&mut dyn EventSink` through which new events leave.
//! The worker that builds the context owns the host exclusively for the
//! duration of the call, so a `Host` only needs to be `Send`.

pub mod context;
pub mod error;
pub mod model;
pub mod noop;
pub mod slot;


pub use context::{EventSink, HostContext};
pub use error::{HostError, HostResult};
pub use model::Host;
pub use noop::NoopHost;
pub use slot::{Dispatch, HostMeta, HostSlot, HostStats, RunState};
