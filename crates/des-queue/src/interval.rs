//! `IntervalQueue` — events bucketed by coarse time interval.
//!
//! # Why this exists
//!
//! A host can accumulate events arbitrarily far in the future (long timers,
//! retransmission deadlines).  With one flat heap, every push and pop pays
//! for those far-future entries even though only the near-term ones can run
//! this window.
//!
//! `IntervalQueue` keeps one small min-heap per interval in a `BTreeMap` and
//! only ever pops from the current one.  Far-future buckets sit untouched
//! until their interval opens.
//!
//! # Performance note
//!
//! Push is O(log B + log n) where B is the number of non-empty intervals and
//! n the bucket size.  Pop is O(log n) in the current bucket only.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use des_core::Event;

use crate::{EventQueue, QueueStats};

type Bucket = BinaryHeap<Reverse<Event>>;

#[derive(Debug)]
struct Current {
    id:     u64,
    bucket: Bucket,
}

/// A priority queue of events partitioned by interval.
#[derive(Debug, Default)]
pub struct IntervalQueue {
    /// Non-current buckets.  Every bucket here holds at least one event.
    buckets: BTreeMap<u64, Bucket>,
    current: Option<Current>,
    /// Cached total event count for O(1) `len()`.
    total:   usize,
    stats:   QueueStats,
}

impl IntervalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of intervals holding events, the current one included.
    pub fn interval_count(&self) -> usize {
        let current = self.current.as_ref().is_some_and(|c| !c.bucket.is_empty());
        self.buckets.len() + usize::from(current)
    }
}

impl EventQueue for IntervalQueue {
    fn push(&mut self, event: Event, interval: u64) {
        match &mut self.current {
            Some(cur) if cur.id == interval => cur.bucket.push(Reverse(event)),
            _ => self.buckets.entry(interval).or_default().push(Reverse(event)),
        }
        self.total += 1;
        self.stats.pushed += 1;
    }

    fn start_interval(&mut self, interval: u64) {
        if let Some(cur) = &self.current {
            panic!(
                "interval {interval} opened while interval {} is still current",
                cur.id
            );
        }
        let bucket = self.buckets.remove(&interval).unwrap_or_default();
        self.current = Some(Current { id: interval, bucket });
        self.stats.intervals_opened += 1;
    }

    fn end_interval(&mut self, interval: u64) {
        let leftover = match &self.current {
            Some(cur) if cur.id == interval => {
                self.current.take().map_or(0, |c| c.bucket.len())
            }
            _ => self.buckets.remove(&interval).map_or(0, |b| b.len()),
        };
        debug_assert!(
            leftover == 0,
            "interval {interval} ended with {leftover} unexecuted events"
        );
        if leftover > 0 {
            tracing::error!(interval, leftover, "interval ended with unexecuted events");
        }
        self.total -= leftover;
        self.stats.discarded += leftover as u64;
        self.stats.intervals_closed += 1;
    }

    fn pop(&mut self) -> Option<Event> {
        let Reverse(event) = self.current.as_mut()?.bucket.pop()?;
        self.total -= 1;
        self.stats.popped += 1;
        Some(event)
    }

    fn peek(&self) -> Option<&Event> {
        if let Some(event) = self.peek_current() {
            return Some(event);
        }
        self.buckets
            .values()
            .find_map(|bucket| bucket.peek())
            .map(|Reverse(event)| event)
    }

    fn peek_current(&self) -> Option<&Event> {
        self.current
            .as_ref()?
            .bucket
            .peek()
            .map(|Reverse(event)| event)
    }

    fn current_interval(&self) -> Option<u64> {
        self.current.as_ref().map(|c| c.id)
    }

    fn first_interval(&self) -> Option<u64> {
        let current = self
            .current
            .as_ref()
            .filter(|c| !c.bucket.is_empty())
            .map(|c| c.id);
        let stored = self.buckets.keys().next().copied();
        match (current, stored) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn len(&self) -> usize {
        self.total
    }

    fn stats(&self) -> QueueStats {
        self.stats
    }
}
