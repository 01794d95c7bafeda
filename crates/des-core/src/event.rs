//! Events — the unit of work the scheduler moves between hosts.
//!
//! An [`Event`] is immutable once it has been handed to a queue: the only
//! mutation allowed is [`Event::raise_to`], which consumes the event before it
//! is enqueued (used when a cross-boundary delivery is clamped).
//!
//! Ordering is `(time, sequence, source)`.  Sequences are allocated per source
//! host, so events from one source keep their insertion order and the source
//! id breaks any remaining tie; no two distinct events compare equal.

use std::cmp::Ordering;

use crate::{HostId, SimTime};

// ── Packet ────────────────────────────────────────────────────────────────────

/// Identifier of a packet, unique per source host.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct PacketId {
    pub source: HostId,
    pub serial: u64,
}

/// Opaque payload carried between hosts.
///
/// The scheduler never looks inside `payload`; protocol semantics belong to
/// the host application.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Packet {
    pub id:          PacketId,
    pub source:      HostId,
    pub destination: HostId,
    /// Time at which the sending host emitted the packet.
    pub sent_at:     SimTime,
    pub payload:     Vec<u8>,
}

// ── EventAction ───────────────────────────────────────────────────────────────

/// The closed set of things an event can ask its destination host to do.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EventAction {
    /// Start the host's application.
    Boot,
    /// Stop the host's application; later timers and packets are dropped.
    Shutdown,
    /// Periodic host status report.
    Heartbeat,
    /// A timer the host armed for itself.
    Timer { id: u64 },
    /// A packet arriving from another (or the same) host.
    Packet(Packet),
}

impl EventAction {
    /// Short static label, for logs and stats.
    pub fn kind(&self) -> &'static str {
        match self {
            EventAction::Boot        => "boot",
            EventAction::Shutdown    => "shutdown",
            EventAction::Heartbeat   => "heartbeat",
            EventAction::Timer { .. } => "timer",
            EventAction::Packet(_)   => "packet",
        }
    }
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// A scheduled action for one host at one instant.
#[derive(Clone, Debug)]
pub struct Event {
    time:        SimTime,
    sequence:    u64,
    source:      HostId,
    destination: HostId,
    action:      EventAction,
}

impl Event {
    pub fn new(
        time:        SimTime,
        sequence:    u64,
        source:      HostId,
        destination: HostId,
        action:      EventAction,
    ) -> Self {
        Self { time, sequence, source, destination, action }
    }

    #[inline]
    pub fn time(&self) -> SimTime {
        self.time
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline]
    pub fn source(&self) -> HostId {
        self.source
    }

    #[inline]
    pub fn destination(&self) -> HostId {
        self.destination
    }

    #[inline]
    pub fn action(&self) -> &EventAction {
        &self.action
    }

    /// Consume the event, yielding its action for execution.
    pub fn into_action(self) -> EventAction {
        self.action
    }

    /// Move the event no earlier than `floor`.  Returns the event and whether
    /// its time changed.
    pub fn raise_to(mut self, floor: SimTime) -> (Self, bool) {
        if self.time < floor {
            self.time = floor;
            (self, true)
        } else {
            (self, false)
        }
    }

    #[inline]
    fn key(&self) -> (SimTime, u64, HostId) {
        (self.time, self.sequence, self.source)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
