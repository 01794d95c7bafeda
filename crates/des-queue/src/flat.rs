//! `FlatQueue` — a single min-heap with no bucketing.
//!
//! Each entry carries the interval it was pushed under and the heap orders by
//! `(interval, event)`, so the interval contract of [`EventQueue`] still
//! holds: `pop` refuses to hand out anything outside the current interval.
//! What is saved is the bucket bookkeeping, which pays off when the causal
//! horizon is short and few future events are pending.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use des_core::Event;

use crate::{EventQueue, QueueStats};

#[derive(Debug, Default)]
pub struct FlatQueue {
    heap:    BinaryHeap<Reverse<(u64, Event)>>,
    current: Option<u64>,
    stats:   QueueStats,
}

impl FlatQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn top(&self) -> Option<(u64, &Event)> {
        self.heap.peek().map(|Reverse((interval, event))| (*interval, event))
    }
}

impl EventQueue for FlatQueue {
    fn push(&mut self, event: Event, interval: u64) {
        self.heap.push(Reverse((interval, event)));
        self.stats.pushed += 1;
    }

    fn start_interval(&mut self, interval: u64) {
        if let Some(open) = self.current {
            panic!("interval {interval} opened while interval {open} is still current");
        }
        self.current = Some(interval);
        self.stats.intervals_opened += 1;
    }

    fn end_interval(&mut self, interval: u64) {
        if self.current == Some(interval) {
            self.current = None;
        }
        // Entries of an ended interval can never be popped again.
        let mut leftover = 0u64;
        while self.top().is_some_and(|(iv, _)| iv == interval) {
            self.heap.pop();
            leftover += 1;
        }
        debug_assert!(
            leftover == 0,
            "interval {interval} ended with {leftover} unexecuted events"
        );
        if leftover > 0 {
            tracing::error!(interval, leftover, "interval ended with unexecuted events");
        }
        self.stats.discarded += leftover;
        self.stats.intervals_closed += 1;
    }

    fn pop(&mut self) -> Option<Event> {
        self.peek_current()?;
        let Reverse((_, event)) = self.heap.pop()?;
        self.stats.popped += 1;
        Some(event)
    }

    fn peek(&self) -> Option<&Event> {
        self.top().map(|(_, event)| event)
    }

    fn peek_current(&self) -> Option<&Event> {
        let current = self.current?;
        self.top()
            .filter(|(interval, _)| *interval == current)
            .map(|(_, event)| event)
    }

    fn current_interval(&self) -> Option<u64> {
        self.current
    }

    fn first_interval(&self) -> Option<u64> {
        self.top().map(|(interval, _)| interval)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn stats(&self) -> QueueStats {
        self.stats
    }
}
