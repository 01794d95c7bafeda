//! `des-policy` — which locked queue holds a host's events, and when a
//! delivery must be pushed forward in time.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`policy`]      | `SchedulingPolicy`, `Barrier`, `Delivery`, `build_policy` |
//! | [`per_host`]    | `PerHostPolicy` — one queue per host, round-robin pop     |
//! | [`per_thread`]  | `PerThreadPolicy` — one queue per worker thread           |
//!
//! # Causal boundary
//!
//! An event crosses a causal boundary when the receiving queue may already
//! have been drained past the event's time by the time it arrives:
//!
//! | Policy        | Boundary crossed when                               |
//! |---------------|-----------------------------------------------------|
//! | per-host      | `source != destination`                             |
//! | per-thread    | `worker(source) != worker(destination)`             |
//!
//! Crossing events earlier than the window barrier are raised to the
//! caller's floor (the barrier itself, or further).  Everything else is
//! delivered untouched.
//!
//! # Locking
//!
//! `push` may run on any worker thread; `pop` only on the owning one.  Each
//! queue sits behind its own `Mutex`, so pushes to different queues never
//! contend.

pub mod per_host;
pub mod per_thread;
pub mod policy;

#[cfg(test)]
mod tests;

pub use per_host::PerHostPolicy;
pub use per_thread::PerThreadPolicy;
pub use policy::{Barrier, Delivery, SchedulingPolicy, build_policy};
