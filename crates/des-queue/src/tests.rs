//! Unit tests for des-queue.
//!
//! Most behavioral tests run against both representations through
//! [`HostQueue`], since the two must satisfy the same contract.

use des_core::{Event, EventAction, HostId, QueueConfig, QueueMode, SimTime};

use crate::{EventQueue, HostQueue};

// ── Helpers ───────────────────────────────────────────────────────────────────

const MODES: [QueueMode; 2] = [QueueMode::Interval, QueueMode::Flat];

fn ev(time: u64, seq: u64) -> Event {
    Event::new(SimTime(time), seq, HostId(0), HostId(0), EventAction::Timer { id: seq })
}

/// Intervals are 100 ns wide in these tests: `[0,100)` is 0, `[100,200)` is 1.
fn width_100(mode: QueueMode) -> QueueConfig {
    QueueConfig { mode, interval_width_ns: 100 }
}

fn drain(q: &mut HostQueue) -> Vec<Event> {
    std::iter::from_fn(|| q.pop()).collect()
}

// ── EventQueue contract ──────────────────────────────────────────────────────

#[cfg(test)]
mod contract {
    use super::*;

    #[test]
    fn pops_within_interval_are_monotonic() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            for (i, t) in [50, 10, 90, 10, 30, 70].into_iter().enumerate() {
                q.push(ev(t, i as u64), 0);
            }
            q.start_interval(0);
            let times: Vec<u64> = drain(&mut q).iter().map(|e| e.time().0).collect();
            assert_eq!(times, vec![10, 10, 30, 50, 70, 90], "{mode:?}");
        }
    }

    #[test]
    fn equal_times_pop_in_push_order() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            q.push(ev(40, 0), 0); // A
            q.push(ev(40, 1), 0); // B
            q.push(ev(40, 2), 0); // C
            q.start_interval(0);
            let seqs: Vec<u64> = drain(&mut q).iter().map(Event::sequence).collect();
            assert_eq!(seqs, vec![0, 1, 2], "{mode:?}");
        }
    }

    #[test]
    fn pop_never_crosses_into_next_interval() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            q.start_interval(0);
            q.push(ev(150, 0), 1);

            // Interval 0 is current and empty: nothing comes out.
            assert!(q.pop().is_none(), "{mode:?}");
            assert_eq!(q.len(), 1);

            q.end_interval(0);
            q.start_interval(1);
            let popped = q.pop().expect("event in interval 1");
            assert_eq!(popped.time(), SimTime(150), "{mode:?}");
        }
    }

    #[test]
    fn pop_without_current_interval_is_none() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            q.push(ev(5, 0), 0);
            assert!(q.pop().is_none(), "{mode:?}");
        }
    }

    #[test]
    fn starting_an_interval_with_no_bucket_is_legal() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            q.start_interval(7);
            assert_eq!(q.current_interval(), Some(7));
            assert!(q.pop().is_none());
            q.end_interval(7);
            assert_eq!(q.current_interval(), None);
        }
    }

    #[test]
    fn push_into_current_interval_is_poppable() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            q.start_interval(0);
            q.push(ev(20, 0), 0);
            assert_eq!(q.pop().map(|e| e.time()), Some(SimTime(20)), "{mode:?}");
        }
    }

    #[test]
    fn peek_falls_back_to_lowest_future_interval() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            q.push(ev(950, 0), 9);
            q.push(ev(420, 1), 4);
            q.start_interval(0);
            assert!(q.peek_current().is_none());
            assert_eq!(q.peek().map(|e| e.time()), Some(SimTime(420)), "{mode:?}");
            assert_eq!(q.first_interval(), Some(4));
        }
    }

    #[test]
    fn peek_prefers_current_interval() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            q.push(ev(60, 0), 0);
            q.push(ev(150, 1), 1);
            q.start_interval(0);
            assert_eq!(q.peek().map(|e| e.time()), Some(SimTime(60)), "{mode:?}");
        }
    }

    #[test]
    fn stats_track_lifecycle() {
        for mode in MODES {
            let mut q = HostQueue::new(mode);
            q.push(ev(1, 0), 0);
            q.push(ev(2, 1), 0);
            q.start_interval(0);
            drain(&mut q);
            q.end_interval(0);
            let s = q.stats();
            assert_eq!((s.pushed, s.popped), (2, 2), "{mode:?}");
            assert_eq!((s.intervals_opened, s.intervals_closed), (1, 1));
            assert_eq!(s.discarded, 0);
        }
    }

    #[test]
    #[should_panic(expected = "still current")]
    fn double_start_interval_panics_bucketed() {
        let mut q = HostQueue::new(QueueMode::Interval);
        q.start_interval(0);
        q.start_interval(1);
    }

    #[test]
    #[should_panic(expected = "still current")]
    fn double_start_interval_panics_flat() {
        let mut q = HostQueue::new(QueueMode::Flat);
        q.start_interval(0);
        q.start_interval(1);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "unexecuted events")]
    fn ending_interval_with_leftovers_is_fatal_in_debug() {
        let mut q = HostQueue::new(QueueMode::Interval);
        q.push(ev(10, 0), 0);
        q.start_interval(0);
        q.end_interval(0);
    }
}

// ── IntervalQueue specifics ──────────────────────────────────────────────────

#[cfg(test)]
mod bucketed {
    use super::*;
    use crate::IntervalQueue;

    #[test]
    fn buckets_created_lazily() {
        let mut q = IntervalQueue::new();
        assert_eq!(q.interval_count(), 0);
        q.push(ev(10, 0), 0);
        q.push(ev(20, 1), 0);
        q.push(ev(510, 2), 5);
        assert_eq!(q.interval_count(), 2);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn ended_interval_is_detached() {
        let mut q = IntervalQueue::new();
        q.push(ev(10, 0), 0);
        q.start_interval(0);
        q.pop();
        q.end_interval(0);
        assert_eq!(q.interval_count(), 0);
        assert!(q.is_empty());
    }
}

// ── WindowedQueue ────────────────────────────────────────────────────────────

#[cfg(test)]
mod windowed {
    use des_core::Violation;

    use super::*;
    use crate::WindowedQueue;

    #[test]
    fn pops_only_before_barrier() {
        for mode in MODES {
            let mut q = WindowedQueue::new(width_100(mode), "host-0");
            q.push(ev(30, 0));
            q.push(ev(120, 1));
            q.push(ev(250, 2));

            let first = q.pop_before(SimTime(150)).unwrap().unwrap();
            assert_eq!(first.time(), SimTime(30));
            let second = q.pop_before(SimTime(150)).unwrap().unwrap();
            assert_eq!(second.time(), SimTime(120));
            assert!(q.pop_before(SimTime(150)).unwrap().is_none(), "{mode:?}");
            assert_eq!(q.next_time(), SimTime(250));

            let third = q.pop_before(SimTime(1_000)).unwrap().unwrap();
            assert_eq!(third.time(), SimTime(250));
            assert_eq!(q.next_time(), SimTime::MAX);
        }
    }

    #[test]
    fn event_exactly_at_barrier_is_deferred() {
        for mode in MODES {
            let mut q = WindowedQueue::new(width_100(mode), "host-0");
            q.push(ev(100, 0));
            assert!(q.pop_before(SimTime(100)).unwrap().is_none(), "{mode:?}");
            assert!(q.pop_before(SimTime(101)).unwrap().is_some());
        }
    }

    #[test]
    fn skips_empty_intervals() {
        for mode in MODES {
            let mut q = WindowedQueue::new(width_100(mode), "host-0");
            q.push(ev(5, 0));
            q.push(ev(9_050, 1));
            assert_eq!(q.pop_before(SimTime::MAX).unwrap().map(|e| e.time()), Some(SimTime(5)));
            assert_eq!(
                q.pop_before(SimTime::MAX).unwrap().map(|e| e.time()),
                Some(SimTime(9_050)),
                "{mode:?}"
            );
        }
    }

    #[test]
    fn late_push_into_open_interval_is_seen() {
        for mode in MODES {
            let mut q = WindowedQueue::new(width_100(mode), "host-0");
            q.push(ev(10, 0));
            q.pop_before(SimTime(100)).unwrap();
            q.push(ev(10, 1));
            let again = q.pop_before(SimTime(100)).unwrap().unwrap();
            assert_eq!(again.sequence(), 1, "{mode:?}");
        }
    }

    #[test]
    fn backwards_pop_is_a_violation() {
        for mode in MODES {
            let mut q = WindowedQueue::new(width_100(mode), "host-0");
            q.push(ev(350, 0));
            q.pop_before(SimTime(1_000)).unwrap();
            // A push into an interval that has already been passed.
            q.push(ev(40, 1));
            let err = q.pop_before(SimTime(1_000)).unwrap_err();
            assert!(
                matches!(err, Violation::NonMonotonicQueue { time: SimTime(40), last: SimTime(350), .. }),
                "{mode:?}: {err:?}"
            );
        }
    }

    #[test]
    fn determinism_across_runs() {
        fn run(mode: QueueMode) -> Vec<(u64, u64)> {
            let mut q = WindowedQueue::new(width_100(mode), "host-0");
            for (i, t) in [505, 3, 505, 77, 3, 1_200, 77].into_iter().enumerate() {
                q.push(ev(t, i as u64));
            }
            std::iter::from_fn(|| q.pop_before(SimTime::MAX).unwrap())
                .map(|e| (e.time().0, e.sequence()))
                .collect()
        }
        let bucketed = run(QueueMode::Interval);
        assert_eq!(bucketed, run(QueueMode::Interval));
        assert_eq!(bucketed, run(QueueMode::Flat));
        assert_eq!(
            bucketed,
            vec![(3, 1), (3, 4), (77, 3), (77, 6), (505, 0), (505, 2), (1_200, 5)]
        );
    }
}
