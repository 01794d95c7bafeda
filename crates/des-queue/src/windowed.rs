//! `WindowedQueue` — "give me the next event strictly before the barrier".
//!
//! Wraps a [`HostQueue`] together with the interval width and drives the
//! interval open/close script on the caller's behalf:
//!
//! ```text
//! pop_before(T):
//!   current interval has an event e:   e.time < T → pop e;  else → None
//!   current interval exhausted:        next = lowest interval with events
//!                                      start(next) < T → end(current), start(next), retry
//!                                      otherwise       → None
//! ```
//!
//! It also remembers the last popped time so a non-monotonic pop, which can
//! only come from a scheduling bug upstream, is reported as a
//! [`Violation`] instead of silently reordering causality.

use des_core::{Event, QueueConfig, SimTime, Violation};

use crate::{EventQueue, HostQueue, QueueStats};

#[derive(Debug)]
pub struct WindowedQueue {
    queue:       HostQueue,
    config:      QueueConfig,
    last_popped: SimTime,
    /// Human-readable owner label used in violation reports.
    label:       String,
}

impl WindowedQueue {
    pub fn new(config: QueueConfig, label: impl Into<String>) -> Self {
        Self {
            queue:       HostQueue::new(config.mode),
            config,
            last_popped: SimTime::ZERO,
            label:       label.into(),
        }
    }

    /// Insert `event` under the interval its time falls into.
    pub fn push(&mut self, event: Event) {
        let interval = self.config.interval_of(event.time());
        self.queue.push(event, interval);
    }

    /// Remove and return the minimum event with `time < barrier`.
    pub fn pop_before(&mut self, barrier: SimTime) -> Result<Option<Event>, Violation> {
        loop {
            if let Some(head) = self.queue.peek_current() {
                if head.time() >= barrier {
                    return Ok(None);
                }
                let Some(event) = self.queue.pop() else {
                    return Ok(None);
                };
                if event.time() < self.last_popped {
                    return Err(Violation::NonMonotonicQueue {
                        queue: self.label.clone(),
                        time:  event.time(),
                        last:  self.last_popped,
                    });
                }
                self.last_popped = event.time();
                return Ok(Some(event));
            }

            let Some(next) = self.queue.first_interval() else {
                return Ok(None);
            };
            if self.config.interval_start(next) >= barrier {
                return Ok(None);
            }
            if let Some(current) = self.queue.current_interval() {
                self.queue.end_interval(current);
            }
            self.queue.start_interval(next);
        }
    }

    /// Time of the earliest pending event, or `SimTime::MAX` when empty.
    pub fn next_time(&self) -> SimTime {
        self.queue.peek().map_or(SimTime::MAX, Event::time)
    }

    pub fn last_popped(&self) -> SimTime {
        self.last_popped
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
