//! The `Engine` struct and its window loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use des_core::{EngineConfig, HostId, SimTime, Window, WorkerId};
use des_host::{Host, HostSlot};
use des_policy::{Barrier, SchedulingPolicy};
use rustc_hash::FxHashMap;

use crate::host_table::HostTable;
use crate::sync::{RoundPlan, WindowSync, WorkerFailure, WorkerReport};
use crate::worker::{self, WorkerContext};
use crate::{
    Coordinator, EngineError, EngineObserver, EngineResult, MinJumpUpdate, NoopObserver,
    RoundSummary, RunSummary, WindowResult, WorkerStats,
};

/// State shared by the driver and every worker thread.
pub(crate) struct Shared<H: Host> {
    pub(crate) hosts:     HostTable<H>,
    pub(crate) policy:    Box<dyn SchedulingPolicy>,
    pub(crate) sync:      WindowSync,
    pub(crate) heartbeat: Option<u64>,
}

/// Stops a running engine from any thread.
///
/// Workers notice between events; the current `run_window` call returns
/// `Finished` once every worker has reported.
#[derive(Clone, Debug)]
pub struct StopHandle {
    killed: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.killed.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.killed.load(Ordering::Acquire)
    }
}

/// The scheduler: a coordinator, its worker threads, and every host.
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].  Drive it with
/// [`run_window`][Self::run_window] in a loop, or [`run`][Self::run] to
/// completion.  Dropping the engine stops and joins its threads.
pub struct Engine<H: Host> {
    config:      EngineConfig,
    shared:      Arc<Shared<H>>,
    coordinator: Coordinator,
    threads:     Vec<JoinHandle<()>>,
    /// The calling thread's worker context in single-threaded mode.
    serial:      Option<WorkerContext>,
    names:       FxHashMap<String, HostId>,
    rounds:      u64,
    opened:      bool,
    finished:    bool,
    workers:     Vec<WorkerStats>,
    last_round:  Option<RoundSummary>,
}

impl<H: Host> Engine<H> {
    /// Assemble the engine and spawn its worker threads.
    pub(crate) fn start(
        config: EngineConfig,
        policy: Box<dyn SchedulingPolicy>,
        slots:  Vec<HostSlot<H>>,
        names:  FxHashMap<String, HostId>,
    ) -> EngineResult<Self> {
        let worker_slots = policy.worker_count();
        let shared = Arc::new(Shared {
            hosts:     HostTable::new(slots),
            policy,
            sync:      WindowSync::new(worker_slots),
            heartbeat: config.heartbeat_interval_ns,
        });
        let serial = config.is_single_threaded().then(|| WorkerContext::new(WorkerId(0)));

        let mut engine = Self {
            coordinator: Coordinator::new(&config),
            config,
            shared,
            threads:     Vec::with_capacity(worker_slots),
            serial,
            names,
            rounds:      0,
            opened:      false,
            finished:    false,
            workers:     vec![WorkerStats::default(); worker_slots],
            last_round:  None,
        };

        if engine.serial.is_none() {
            for w in 0..worker_slots {
                let shared = Arc::clone(&engine.shared);
                let id = WorkerId(w as u32);
                let handle = std::thread::Builder::new()
                    .name(format!("des-worker-{w}"))
                    .spawn(move || worker::worker_main(shared, id))?;
                engine.threads.push(handle);
            }
        }

        tracing::info!(
            workers = engine.config.num_workers,
            hosts = engine.shared.hosts.len(),
            policy = ?engine.shared.policy.kind(),
            end = %engine.config.end_time(),
            seed = engine.config.seed,
            "engine ready"
        );
        Ok(engine)
    }

    // ── Setup-time collaborator surface ───────────────────────────────────

    /// Offer a topology link latency (milliseconds) to tighten the minimum
    /// time jump.  Only effective before the first window opens.
    pub fn report_topology_min_latency(&mut self, milliseconds: f64) -> MinJumpUpdate {
        self.coordinator.update_min_time_jump(milliseconds)
    }

    pub fn min_time_jump(&self) -> u64 {
        self.coordinator.min_time_jump()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle { killed: self.shared.sync.kill_flag() }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// The most recent window.
    pub fn window(&self) -> Window {
        self.coordinator.window()
    }

    /// Simulated time up to which every event has executed: the barrier of
    /// the last completed window, or zero before the first.
    pub fn current_time(&self) -> SimTime {
        match self.last_round {
            Some(ref r) => r.window.end,
            None => SimTime::ZERO,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn host_count(&self) -> usize {
        self.shared.hosts.len()
    }

    pub fn host_id(&self, name: &str) -> Option<HostId> {
        self.names.get(name).copied()
    }

    pub fn worker_of(&self, host: HostId) -> Option<WorkerId> {
        self.shared.policy.worker_of(host)
    }

    pub fn last_round(&self) -> Option<&RoundSummary> {
        self.last_round.as_ref()
    }

    /// Read a host's slot between windows.
    pub fn inspect_host<R>(&self, host: HostId, f: impl FnOnce(&HostSlot<H>) -> R) -> Option<R> {
        self.shared.hosts.lock(host).map(|slot| f(&*slot))
    }

    /// Totals so far.
    pub fn summary(&self) -> RunSummary {
        let mut totals = WorkerStats::default();
        for w in &self.workers {
            totals.absorb(w);
        }
        let queues = (0..self.workers.len())
            .map(|w| self.shared.policy.queue_stats(WorkerId(w as u32)))
            .collect();
        RunSummary {
            rounds:        self.rounds,
            totals,
            workers:       self.workers.clone(),
            queues,
            final_barrier: self.last_round.as_ref().map_or(SimTime::ZERO, |r| r.window.end),
            min_time_jump: self.coordinator.min_time_jump(),
        }
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Run one window on every worker and advance.
    pub fn run_window(&mut self) -> EngineResult<WindowResult> {
        self.step(&mut NoopObserver)
    }

    /// Like [`run_window`][Self::run_window], with observer callbacks.
    pub fn step<O: EngineObserver>(&mut self, observer: &mut O) -> EngineResult<WindowResult> {
        if self.finished {
            return Ok(WindowResult::Finished);
        }
        if self.shared.sync.is_killed() {
            self.coordinator.kill();
        }
        if !self.opened {
            self.open_first_window();
        }
        if self.coordinator.is_killed() {
            return Ok(self.finish());
        }

        let window = self.coordinator.window();
        // Crossing events before the barrier land one full jump past it.
        let barrier = match self.serial {
            Some(_) => Barrier::NONE,
            None => Barrier::with_floor(
                window.end,
                window.end.saturating_add(self.coordinator.min_time_jump()),
            ),
        };
        observer.on_window_start(window);
        let reports = self.run_round(RoundPlan { window, barrier });
        self.rounds += 1;

        let mut round_stats = WorkerStats::default();
        for r in &reports {
            round_stats.absorb(&r.stats);
            if let Some(total) = self.workers.get_mut(r.worker.index()) {
                total.absorb(&r.stats);
            }
        }
        if let Some(err) = Self::first_failure(reports.iter()) {
            tracing::error!(round = self.rounds, %window, error = %err, "simulation aborted");
            self.abort();
            return Err(err);
        }

        let result = if self.shared.sync.is_killed() {
            tracing::info!(round = self.rounds, %window, "stop requested");
            self.coordinator.kill();
            WindowResult::Finished
        } else {
            let next: Vec<(WorkerId, SimTime)> =
                reports.iter().map(|r| (r.worker, r.next_time)).collect();
            match self.coordinator.on_window_drained(&next) {
                Ok(result) => result,
                Err(violation) => {
                    tracing::error!(round = self.rounds, %window, error = %violation, "simulation aborted");
                    self.abort();
                    return Err(violation.into());
                }
            }
        };

        let summary = RoundSummary {
            round:           self.rounds,
            window,
            events_executed: round_stats.events_executed,
            events_dropped:  round_stats.events_dropped,
            events_clamped:  round_stats.events_clamped,
            host_errors:     round_stats.host_errors,
            next_start:      match result {
                WindowResult::Continue => Some(self.coordinator.window().start),
                WindowResult::Finished => None,
            },
        };
        tracing::debug!(
            round = summary.round,
            %window,
            executed = summary.events_executed,
            clamped = summary.events_clamped,
            "window complete"
        );
        observer.on_window_end(&summary);
        self.last_round = Some(summary);

        if result == WindowResult::Finished {
            self.finish();
        }
        Ok(result)
    }

    /// Run windows until `Finished`.
    pub fn run<O: EngineObserver>(&mut self, observer: &mut O) -> EngineResult<RunSummary> {
        while self.step(observer)? == WindowResult::Continue {}
        let summary = self.summary();
        observer.on_sim_end(&summary);
        Ok(summary)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn open_first_window(&mut self) {
        self.opened = true;
        if self.coordinator.is_killed() {
            tracing::info!("stop requested before the first window; nothing run");
            return;
        }
        let window = match self.serial {
            Some(_) => self.coordinator.open_unbounded(),
            None => {
                let start = (0..self.workers.len())
                    .map(|w| self.shared.policy.next_time(WorkerId(w as u32)))
                    .min()
                    .unwrap_or(SimTime::MAX);
                self.coordinator.open(start)
            }
        };
        match window {
            Some(window) => tracing::info!(
                %window,
                min_jump_ns = self.coordinator.min_time_jump(),
                "simulation started"
            ),
            None => tracing::info!("no events to run"),
        }
    }

    fn run_round(&mut self, plan: RoundPlan) -> Vec<WorkerReport> {
        match self.serial {
            Some(ref mut ctx) => vec![worker::run_round_guarded(&self.shared, ctx, plan)],
            None => {
                self.shared.sync.start_round(plan);
                self.shared.sync.wait_done()
            }
        }
    }

    /// A violation wins over a panic; otherwise the lowest worker's panic.
    fn first_failure<'a>(reports: impl Iterator<Item = &'a WorkerReport>) -> Option<EngineError> {
        let mut panicked = None;
        for r in reports {
            match r.failure {
                Some(WorkerFailure::Violation(ref v)) => return Some(EngineError::Violation(v.clone())),
                Some(WorkerFailure::Panicked(ref message)) if panicked.is_none() => {
                    panicked = Some(EngineError::WorkerPanicked {
                        worker:  r.worker,
                        message: message.clone(),
                    });
                }
                _ => {}
            }
        }
        panicked
    }

    fn abort(&mut self) {
        self.shared.sync.kill();
        self.coordinator.kill();
        self.finished = true;
    }

    fn finish(&mut self) -> WindowResult {
        if !self.finished {
            self.finished = true;
            let s = self.summary();
            tracing::info!(
                rounds = s.rounds,
                executed = s.totals.events_executed,
                clamped = s.totals.events_clamped,
                host_errors = s.totals.host_errors,
                "simulation finished"
            );
        }
        WindowResult::Finished
    }
}

impl<H: Host> Drop for Engine<H> {
    fn drop(&mut self) {
        self.shared.sync.kill();
        self.shared.sync.shutdown();
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("worker thread exited by panic");
            }
        }
    }
}
