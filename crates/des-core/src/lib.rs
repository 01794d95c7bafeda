//! `des-core` — foundational types for the `des` parallel discrete-event
//! scheduler.
//!
//! This crate is a dependency of every other `des-*` crate.  It intentionally
//! has no `des-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `HostId`, `WorkerId`                                      |
//! | [`time`]        | `SimTime`, `Window`                                       |
//! | [`event`]       | `Event`, `EventAction`, `Packet`, `PacketId`              |
//! | [`config`]      | `EngineConfig`, `PolicyKind`, `QueueConfig`, `QueueMode`  |
//! | [`rng`]         | `HostRng` (per-host deterministic stream)                 |
//! | [`error`]       | `DesError`, `Violation`, `ScheduleError`                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to config and ID types.     |

pub mod config;
pub mod error;
pub mod event;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{EngineConfig, PolicyKind, QueueConfig, QueueMode};
pub use error::{DesError, DesResult, ScheduleError, Violation};
pub use event::{Event, EventAction, Packet, PacketId};
pub use ids::{HostId, WorkerId};
pub use rng::HostRng;
pub use time::{SimTime, Window};
