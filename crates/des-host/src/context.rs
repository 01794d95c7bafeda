//! The explicit per-event context handed to every [`Host`][crate::Host]
//! callback.

use des_core::{Event, EventAction, HostId, HostRng, Packet, PacketId, ScheduleError, SimTime};

use crate::HostMeta;

/// Where newly created events go.
///
/// The engine implements this on its per-worker dispatcher, which routes the
/// event through the scheduling policy and applies any cross-boundary clamp.
/// Tests implement it on a plain `Vec`.
pub trait EventSink {
    /// Enqueue `event`.  Returns the time it was stored at, which may be
    /// later than requested.
    fn deliver(&mut self, event: Event) -> Result<SimTime, ScheduleError>;
}

impl EventSink for Vec<Event> {
    fn deliver(&mut self, event: Event) -> Result<SimTime, ScheduleError> {
        let time = event.time();
        self.push(event);
        Ok(time)
    }
}

/// Everything a host callback may use while one event executes.
///
/// # Lifetimes
///
/// The borrows live for exactly one event execution.  The worker holds the
/// host's slot lock for that span, so nothing else can observe `meta`.
pub struct HostContext<'a> {
    now:  SimTime,
    meta: &'a mut HostMeta,
    sink: &'a mut dyn EventSink,
}

impl<'a> HostContext<'a> {
    pub fn new(now: SimTime, meta: &'a mut HostMeta, sink: &'a mut dyn EventSink) -> Self {
        Self { now, meta, sink }
    }

    /// The host this event is executing on.
    #[inline]
    pub fn host(&self) -> HostId {
        self.meta.id
    }

    /// The time of the event being executed.
    #[inline]
    pub fn current_time(&self) -> SimTime {
        self.now
    }

    pub(crate) fn meta_mut(&mut self) -> &mut HostMeta {
        self.meta
    }

    /// This host's deterministic RNG.
    #[inline]
    pub fn rng(&mut self) -> &mut HostRng {
        &mut self.meta.rng
    }

    /// Schedule `action` on `destination`, `delay` nanoseconds from now.
    ///
    /// A delay of 0 is legal and runs after the current event.  The returned
    /// time is where the event was actually stored.
    pub fn schedule_event(
        &mut self,
        action:      EventAction,
        delay:       u64,
        destination: HostId,
    ) -> Result<SimTime, ScheduleError> {
        let time = self
            .now
            .checked_add(delay)
            .filter(|t| !t.is_max())
            .ok_or(ScheduleError::Overflow { now: self.now, delay })?;
        self.schedule_at(action, time, destination)
    }

    /// Schedule `action` on `destination` at the absolute `time`.
    pub fn schedule_at(
        &mut self,
        action:      EventAction,
        time:        SimTime,
        destination: HostId,
    ) -> Result<SimTime, ScheduleError> {
        if time < self.now {
            return Err(ScheduleError::InPast { requested: time, now: self.now });
        }
        if time.is_max() {
            return Err(ScheduleError::Overflow { now: self.now, delay: time.0 - self.now.0 });
        }
        let sequence = self.meta.next_sequence();
        let event = Event::new(time, sequence, self.meta.id, destination, action);
        self.sink.deliver(event)
    }

    /// Arm a timer on this host.
    pub fn set_timer(&mut self, delay: u64, timer_id: u64) -> Result<SimTime, ScheduleError> {
        let host = self.meta.id;
        self.schedule_event(EventAction::Timer { id: timer_id }, delay, host)
    }

    /// Send `payload` to `destination`, arriving `latency` nanoseconds from
    /// now (or later, if the delivery is clamped).
    pub fn send_packet(
        &mut self,
        destination: HostId,
        payload:     Vec<u8>,
        latency:     u64,
    ) -> Result<SimTime, ScheduleError> {
        let packet = Packet {
            id:          PacketId { source: self.meta.id, serial: self.meta.next_packet_serial() },
            source:      self.meta.id,
            destination,
            sent_at:     self.now,
            payload,
        };
        let arrival = self.schedule_event(EventAction::Packet(packet), latency, destination)?;
        self.meta.stats.packets_sent += 1;
        Ok(arrival)
    }
}
