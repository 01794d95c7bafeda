//! Unit tests for des-policy.

use des_core::{Event, EventAction, HostId, PolicyKind, QueueConfig, ScheduleError, SimTime, WorkerId};

use crate::{Barrier, PerHostPolicy, PerThreadPolicy, SchedulingPolicy, build_policy};

// ── Helpers ───────────────────────────────────────────────────────────────────

const KINDS: [PolicyKind; 2] = [PolicyKind::PerHost, PolicyKind::PerThread];

fn ev(time: u64, seq: u64, src: u32, dst: u32) -> Event {
    Event::new(SimTime(time), seq, HostId(src), HostId(dst), EventAction::Timer { id: seq })
}

/// Hosts 0 and 1 on worker 0, hosts 2 and 3 on worker 1.
fn two_by_two(kind: PolicyKind) -> Box<dyn SchedulingPolicy> {
    let mut p = build_policy(kind, 2, QueueConfig::default());
    for h in 0..4u32 {
        p.add_host(HostId(h), WorkerId(h / 2)).unwrap();
    }
    p
}

fn drain(p: &dyn SchedulingPolicy, worker: u32, barrier: u64) -> Vec<u64> {
    let mut out = Vec::new();
    while let Some(e) = p.pop(WorkerId(worker), SimTime(barrier)).unwrap() {
        out.push(e.time().0);
    }
    out
}

// ── Registration ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod registration {
    use super::*;

    #[test]
    fn assignment_is_recorded() {
        for kind in KINDS {
            let p = two_by_two(kind);
            assert_eq!(p.kind(), kind);
            assert_eq!(p.worker_count(), 2);
            assert_eq!(p.assigned_hosts(WorkerId(1)), &[HostId(2), HostId(3)]);
            assert_eq!(p.worker_of(HostId(1)), Some(WorkerId(0)));
            assert_eq!(p.worker_of(HostId(9)), None);
        }
    }

    #[test]
    fn out_of_range_worker_is_rejected() {
        let mut p = PerThreadPolicy::new(2, QueueConfig::default());
        assert!(p.add_host(HostId(0), WorkerId(2)).is_err());
        let mut p = PerHostPolicy::new(2, QueueConfig::default());
        assert!(p.add_host(HostId(0), WorkerId(5)).is_err());
    }

    #[test]
    fn duplicate_host_is_rejected() {
        for kind in KINDS {
            let mut p = build_policy(kind, 2, QueueConfig::default());
            p.add_host(HostId(0), WorkerId(0)).unwrap();
            assert!(p.add_host(HostId(0), WorkerId(1)).is_err());
        }
    }

    #[test]
    fn push_to_unknown_host_is_an_error() {
        for kind in KINDS {
            let p = two_by_two(kind);
            let err = p.push(ev(5, 0, 0, 7), HostId(0), Barrier::NONE).unwrap_err();
            assert_eq!(err, ScheduleError::UnknownHost(HostId(7)));
        }
    }
}

// ── Clamping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod clamping {
    use super::*;

    #[test]
    fn crossing_events_are_raised_to_barrier() {
        for kind in KINDS {
            let p = two_by_two(kind);
            let d = p.push(ev(999, 0, 0, 2), HostId(0), Barrier::at(SimTime(1_000))).unwrap();
            assert!(d.clamped);
            assert_eq!(d.time, SimTime(1_000));
        }
    }

    #[test]
    fn crossing_events_before_end_land_on_floor() {
        for kind in KINDS {
            let p = two_by_two(kind);
            // Host 0 (worker 0) → host 2 (worker 1) crosses under both policies.
            let barrier = Barrier::with_floor(SimTime(1_000_000), SimTime(11_000_000));
            let d = p.push(ev(999_999, 0, 0, 2), HostId(0), barrier).unwrap();
            assert!(d.clamped);
            assert_eq!(d.time, SimTime(11_000_000));
            assert_eq!(d.worker, WorkerId(1));
            assert_eq!(p.next_time(WorkerId(1)), SimTime(11_000_000));
        }
    }

    #[test]
    fn crossing_events_at_end_are_untouched_by_floor() {
        for kind in KINDS {
            let p = two_by_two(kind);
            let barrier = Barrier::with_floor(SimTime(1_000_000), SimTime(11_000_000));
            let d = p.push(ev(1_000_000, 0, 0, 2), HostId(0), barrier).unwrap();
            assert!(!d.clamped);
            assert_eq!(d.time, SimTime(1_000_000));
            let d = p.push(ev(5_000_000, 1, 0, 2), HostId(0), barrier).unwrap();
            assert!(!d.clamped);
            assert_eq!(d.time, SimTime(5_000_000));
        }
    }

    #[test]
    fn floor_below_end_is_raised_to_end() {
        let barrier = Barrier::with_floor(SimTime(100), SimTime(10));
        assert_eq!(barrier.floor, SimTime(100));
    }

    #[test]
    fn crossing_events_past_barrier_are_untouched() {
        for kind in KINDS {
            let p = two_by_two(kind);
            let d = p.push(ev(20_000_000, 0, 0, 2), HostId(0), Barrier::at(SimTime(11_000_000))).unwrap();
            assert!(!d.clamped);
            assert_eq!(d.time, SimTime(20_000_000));
        }
    }

    #[test]
    fn self_events_are_never_clamped() {
        for kind in KINDS {
            let p = two_by_two(kind);
            let d = p.push(ev(5, 0, 1, 1), HostId(1), Barrier::at(SimTime(1_000))).unwrap();
            assert!(!d.clamped);
            assert_eq!(d.time, SimTime(5));
        }
    }

    #[test]
    fn same_worker_boundary_depends_on_policy() {
        // Hosts 0 and 1 share worker 0.
        let per_thread = two_by_two(PolicyKind::PerThread);
        assert!(!per_thread.crosses_boundary(HostId(0), HostId(1)));
        let d = per_thread.push(ev(5, 0, 0, 1), HostId(0), Barrier::at(SimTime(1_000))).unwrap();
        assert!(!d.clamped);

        let per_host = two_by_two(PolicyKind::PerHost);
        assert!(per_host.crosses_boundary(HostId(0), HostId(1)));
        let d = per_host.push(ev(5, 0, 0, 1), HostId(0), Barrier::at(SimTime(1_000))).unwrap();
        assert!(d.clamped);
        assert_eq!(d.time, SimTime(1_000));
    }

    #[test]
    fn zero_barrier_never_clamps() {
        for kind in KINDS {
            let p = two_by_two(kind);
            let d = p.push(ev(0, 0, 0, 3), HostId(0), Barrier::NONE).unwrap();
            assert!(!d.clamped);
        }
    }

    #[tracing_test::traced_test]
    #[test]
    fn clamping_is_logged() {
        let p = two_by_two(PolicyKind::PerThread);
        p.push(ev(10, 0, 0, 2), HostId(0), Barrier::at(SimTime(500))).unwrap();
        assert!(logs_contain("cross-boundary event clamped to barrier"));
    }
}

// ── Popping ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod popping {
    use super::*;

    #[test]
    fn pop_never_reaches_the_barrier() {
        for kind in KINDS {
            let p = two_by_two(kind);
            for (i, t) in [100u64, 999, 1_000, 1_001, 5_000].into_iter().enumerate() {
                p.push(ev(t, i as u64, 0, 0), HostId(0), Barrier::NONE).unwrap();
            }
            assert_eq!(drain(p.as_ref(), 0, 1_000), vec![100, 999]);
            assert_eq!(p.next_time(WorkerId(0)), SimTime(1_000));
            assert_eq!(drain(p.as_ref(), 0, 10_000), vec![1_000, 1_001, 5_000]);
        }
    }

    #[test]
    fn per_thread_pops_in_time_order_across_hosts() {
        let p = two_by_two(PolicyKind::PerThread);
        p.push(ev(30, 0, 0, 0), HostId(0), Barrier::NONE).unwrap();
        p.push(ev(10, 0, 1, 1), HostId(1), Barrier::NONE).unwrap();
        p.push(ev(20, 1, 0, 0), HostId(0), Barrier::NONE).unwrap();
        assert_eq!(drain(p.as_ref(), 0, 100), vec![10, 20, 30]);
    }

    #[test]
    fn per_host_drains_hosts_round_robin() {
        let p = two_by_two(PolicyKind::PerHost);
        p.push(ev(30, 0, 0, 0), HostId(0), Barrier::NONE).unwrap();
        p.push(ev(10, 0, 1, 1), HostId(1), Barrier::NONE).unwrap();
        p.push(ev(20, 1, 0, 0), HostId(0), Barrier::NONE).unwrap();
        // Host 0 first, then host 1.
        assert_eq!(drain(p.as_ref(), 0, 100), vec![20, 30, 10]);
    }

    #[test]
    fn per_host_cursor_rewinds_on_new_barrier() {
        let p = two_by_two(PolicyKind::PerHost);
        p.push(ev(10, 0, 0, 0), HostId(0), Barrier::NONE).unwrap();
        assert_eq!(drain(p.as_ref(), 0, 100), vec![10]);

        // Host 0 gets new work for the next window; the cursor must revisit it.
        p.push(ev(150, 1, 0, 0), HostId(0), Barrier::NONE).unwrap();
        assert_eq!(drain(p.as_ref(), 0, 100), Vec::<u64>::new());
        assert_eq!(drain(p.as_ref(), 0, 200), vec![150]);
    }

    #[test]
    fn next_time_is_infinite_when_empty() {
        for kind in KINDS {
            let p = two_by_two(kind);
            assert_eq!(p.next_time(WorkerId(0)), SimTime::MAX);
            assert_eq!(p.next_time(WorkerId(7)), SimTime::MAX);
        }
    }

    #[test]
    fn queue_stats_sum_over_hosts() {
        let p = two_by_two(PolicyKind::PerHost);
        p.push(ev(10, 0, 0, 0), HostId(0), Barrier::NONE).unwrap();
        p.push(ev(10, 0, 1, 1), HostId(1), Barrier::NONE).unwrap();
        drain(p.as_ref(), 0, 100);
        let stats = p.queue_stats(WorkerId(0));
        assert_eq!(stats.pushed, 2);
        assert_eq!(stats.popped, 2);
    }

    #[test]
    fn concurrent_pushes_all_arrive_in_order() {
        for kind in KINDS {
            let p = two_by_two(kind);
            std::thread::scope(|s| {
                for src in 0..4u32 {
                    let p = p.as_ref();
                    s.spawn(move || {
                        for i in 0..250u64 {
                            let t = 1_000_000 + i * 4 + src as u64;
                            p.push(ev(t, i, src, 2), HostId(src), Barrier::at(SimTime(1_000_000))).unwrap();
                        }
                    });
                }
            });
            let times = drain(p.as_ref(), 1, u64::MAX);
            assert_eq!(times.len(), 1_000);
            assert!(times.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
