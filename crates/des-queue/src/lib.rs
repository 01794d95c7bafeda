//! `des-queue` — per-host event priority queues.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`queue`]     | `EventQueue` trait, `HostQueue` (runtime-selected), `QueueStats` |
//! | [`interval`]  | `IntervalQueue` (`BTreeMap<interval, BinaryHeap<Event>>`)   |
//! | [`flat`]      | `FlatQueue` (one `BinaryHeap` for every interval)           |
//! | [`windowed`]  | `WindowedQueue` — "pop the next event before barrier T"     |
//!
//! # Interval model (summary)
//!
//! Simulation time is cut into fixed-width intervals.  A queue has at most
//! one *current* interval and only ever pops from it:
//!
//! ```text
//! interval_id   = time / interval_width
//! start(k)      → k becomes current (must not already have one open)
//! pop()         → min of k's bucket, or None — never looks at k+1
//! end(k)        → k's bucket is detached and discarded
//! ```
//!
//! [`WindowedQueue`] drives the open/close script so callers only ever ask
//! for "the next event before the barrier".

pub mod flat;
pub mod interval;
pub mod queue;
pub mod windowed;

#[cfg(test)]
mod tests;

pub use flat::FlatQueue;
pub use interval::IntervalQueue;
pub use queue::{EventQueue, HostQueue, QueueStats};
pub use windowed::WindowedQueue;
