//! Per-host state and event dispatch.
//!
//! A [`HostSlot`] pairs the application (`H: Host`) with the bookkeeping the
//! scheduler needs about it ([`HostMeta`]).  Keeping the two in separate
//! fields lets [`HostSlot::execute`] borrow the application mutably for the
//! callback while the [`HostContext`] borrows the metadata.

use des_core::{Event, EventAction, HostId, HostRng, SimTime};

use crate::{EventSink, Host, HostContext, HostResult};

/// Lifecycle of a host's application.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum RunState {
    /// Not booted yet.
    #[default]
    Pending,
    Running,
    Stopped,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostStats {
    pub events_executed:  u64,
    pub timers_fired:     u64,
    pub packets_sent:     u64,
    pub packets_received: u64,
    /// Events that reached the host while it was not running.
    pub events_dropped:   u64,
    /// Errors returned by application callbacks.
    pub errors:           u64,
}

/// Scheduler-side bookkeeping for one host.
pub struct HostMeta {
    pub id:            HostId,
    pub name:          String,
    pub rng:           HostRng,
    pub state:         RunState,
    /// Time of the last event executed on this host.
    pub last_executed: SimTime,
    pub stats:         HostStats,
    next_sequence:     u64,
    next_packet:       u64,
}

impl HostMeta {
    pub fn new(id: HostId, name: impl Into<String>, seed: u64) -> Self {
        Self {
            id,
            name:          name.into(),
            rng:           HostRng::new(seed, id),
            state:         RunState::Pending,
            last_executed: SimTime::ZERO,
            stats:         HostStats::default(),
            next_sequence: 0,
            next_packet:   0,
        }
    }

    /// Allocate the next tie-break sequence number for an event this host
    /// creates.
    pub fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    pub(crate) fn next_packet_serial(&mut self) -> u64 {
        let serial = self.next_packet;
        self.next_packet += 1;
        serial
    }
}

/// What happened to an event handed to [`HostSlot::execute`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Dispatch {
    /// The application callback ran.
    Handled,
    /// The host was not in a state to accept the event.
    Dropped,
}

/// A host application plus its scheduler bookkeeping.
pub struct HostSlot<H: Host> {
    pub app:  H,
    pub meta: HostMeta,
}

impl<H: Host> HostSlot<H> {
    pub fn new(app: H, meta: HostMeta) -> Self {
        Self { app, meta }
    }

    /// Run `event` against this host.
    ///
    /// The caller is responsible for time-order checks; this only routes the
    /// action to the right callback.  `heartbeat` is the heartbeat period, if
    /// heartbeats are enabled.
    pub fn execute(
        &mut self,
        event:     Event,
        sink:      &mut dyn EventSink,
        heartbeat: Option<u64>,
    ) -> HostResult<Dispatch> {
        let now = event.time();
        let action = event.into_action();
        self.meta.last_executed = now;

        let accepts = match (&action, self.meta.state) {
            (EventAction::Boot, RunState::Running) => false,
            (EventAction::Boot, _)                 => true,
            (EventAction::Shutdown, state)         => state == RunState::Running,
            (_, state)                             => state == RunState::Running,
        };
        if !accepts {
            self.meta.stats.events_dropped += 1;
            tracing::trace!(host = %self.meta.id, %now, kind = action.kind(), "event dropped");
            return Ok(Dispatch::Dropped);
        }
        self.meta.stats.events_executed += 1;

        let app = &mut self.app;
        let mut ctx = HostContext::new(now, &mut self.meta, sink);
        match action {
            EventAction::Boot => {
                ctx.meta_mut().state = RunState::Running;
                if let Some(period) = heartbeat {
                    let host = ctx.host();
                    ctx.schedule_event(EventAction::Heartbeat, period, host)?;
                }
                app.on_boot(&mut ctx)?;
            }
            EventAction::Shutdown => {
                app.on_shutdown(&mut ctx)?;
                ctx.meta_mut().state = RunState::Stopped;
            }
            EventAction::Heartbeat => {
                let meta = ctx.meta_mut();
                let stats = meta.stats;
                tracing::info!(
                    host = %meta.id,
                    name = %meta.name,
                    %now,
                    executed = stats.events_executed,
                    sent = stats.packets_sent,
                    received = stats.packets_received,
                    errors = stats.errors,
                    "heartbeat"
                );
                if let Some(period) = heartbeat {
                    let host = ctx.host();
                    ctx.schedule_event(EventAction::Heartbeat, period, host)?;
                }
                app.on_heartbeat(&mut ctx)?;
            }
            EventAction::Timer { id } => {
                ctx.meta_mut().stats.timers_fired += 1;
                app.on_timer(id, &mut ctx)?;
            }
            EventAction::Packet(packet) => {
                ctx.meta_mut().stats.packets_received += 1;
                app.on_packet(packet, &mut ctx)?;
            }
        }
        Ok(Dispatch::Handled)
    }
}
