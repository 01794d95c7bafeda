//! Fluent builder for constructing an [`Engine`].

use des_core::{
    DesError, EngineConfig, Event, EventAction, HostId, PolicyKind, SimTime, WorkerId,
};
use des_host::{Host, HostMeta, HostSlot};
use des_policy::{Barrier, SchedulingPolicy, build_policy};
use rustc_hash::FxHashMap;

use crate::{Engine, EngineResult};

struct PendingHost<H> {
    app:    H,
    name:   String,
    boot:   SimTime,
    worker: Option<WorkerId>,
}

/// Fluent builder for [`Engine<H>`].
///
/// Hosts are numbered in the order they are added: the first is `HostId(0)`.
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                                  |
/// |---------------------------|------------------------------------------|
/// | `.host_at(app, t)`        | `.host(app)` boots at time 0             |
/// | `.host_named(n, app, t)`  | name `"host-{id}"`                       |
/// | `.assign(host, worker)`   | round-robin: `HostId(i)` → `i % workers` |
/// | `.shutdown_at(host, t)`   | hosts run until the end time             |
/// | `.policy(p)`              | built from `config.policy`               |
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = EngineBuilder::new(config)
///     .host(Pinger::new(HostId(1)))
///     .host(Ponger)
///     .assign(HostId(1), WorkerId(1))
///     .shutdown_at(HostId(0), SimTime::from_secs(30))
///     .build()?;
/// engine.run(&mut NoopObserver)?;
/// ```
pub struct EngineBuilder<H: Host> {
    config:    EngineConfig,
    hosts:     Vec<PendingHost<H>>,
    shutdowns: Vec<(HostId, SimTime)>,
    policy:    Option<Box<dyn SchedulingPolicy>>,
}

impl<H: Host> EngineBuilder<H> {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, hosts: Vec::new(), shutdowns: Vec::new(), policy: None }
    }

    /// Add a host that boots at time 0.
    pub fn host(self, app: H) -> Self {
        self.host_at(app, SimTime::ZERO)
    }

    /// Add a host that boots at `boot`.
    pub fn host_at(self, app: H, boot: SimTime) -> Self {
        let name = format!("host-{}", self.hosts.len());
        self.host_named(name, app, boot)
    }

    pub fn host_named(mut self, name: impl Into<String>, app: H, boot: SimTime) -> Self {
        self.hosts.push(PendingHost { app, name: name.into(), boot, worker: None });
        self
    }

    /// Pin `host` to `worker` instead of the round-robin default.  Ignored
    /// for hosts that were never added.
    pub fn assign(mut self, host: HostId, worker: WorkerId) -> Self {
        if let Some(h) = self.hosts.get_mut(host.index()) {
            h.worker = Some(worker);
        }
        self
    }

    /// Deliver a shutdown event to `host` at `time`.
    pub fn shutdown_at(mut self, host: HostId, time: SimTime) -> Self {
        self.shutdowns.push((host, time));
        self
    }

    /// Use a custom policy.  It must be built for `config.worker_slots()`
    /// workers and have no hosts registered yet.
    pub fn policy(mut self, policy: Box<dyn SchedulingPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Validate inputs, register hosts with the policy, queue the bootstrap
    /// events, and start the worker threads.
    pub fn build(self) -> EngineResult<Engine<H>> {
        self.config.validate()?;
        let slots = self.config.worker_slots();

        // ── Resolve the policy ────────────────────────────────────────────
        let mut policy = match self.policy {
            Some(p) => {
                if p.worker_count() != slots {
                    return Err(DesError::Config(format!(
                        "custom policy has {} worker slots, engine needs {slots}",
                        p.worker_count()
                    ))
                    .into());
                }
                if self.config.is_single_threaded() && p.kind() == PolicyKind::PerHost {
                    return Err(DesError::Config(
                        "single-threaded mode needs one shared queue; per-host policy rejected".into(),
                    )
                    .into());
                }
                p
            }
            None => {
                let mut kind = self.config.policy;
                if self.config.is_single_threaded() && kind == PolicyKind::PerHost {
                    tracing::info!("single-threaded mode: using the per-thread policy");
                    kind = PolicyKind::PerThread;
                }
                build_policy(kind, slots, self.config.queue)
            }
        };

        // ── Register hosts ────────────────────────────────────────────────
        let mut names = FxHashMap::default();
        let mut host_slots = Vec::with_capacity(self.hosts.len());
        let mut boots = Vec::with_capacity(self.hosts.len());
        for (i, pending) in self.hosts.into_iter().enumerate() {
            let id = HostId::try_from(i)
                .map_err(|_| DesError::Config(format!("too many hosts ({i})")))?;
            let worker = pending.worker.unwrap_or(WorkerId((i % slots) as u32));
            policy.add_host(id, worker)?;
            if names.insert(pending.name.clone(), id).is_some() {
                return Err(DesError::Config(format!("duplicate host name {:?}", pending.name)).into());
            }
            host_slots.push(HostSlot::new(pending.app, HostMeta::new(id, pending.name, self.config.seed)));
            boots.push(pending.boot);
        }

        // ── Bootstrap events ──────────────────────────────────────────────
        //
        // Sequence numbers come from the destination host's own counter so
        // they are the first entries in that host's deterministic stream.
        let mut bootstrap = Vec::with_capacity(boots.len() + self.shutdowns.len());
        for (slot, boot) in host_slots.iter_mut().zip(boots) {
            bootstrap.push(bootstrap_event(&mut slot.meta, boot, EventAction::Boot)?);
        }
        for (host, time) in self.shutdowns {
            let slot = host_slots.get_mut(host.index()).ok_or(DesError::HostNotFound(host))?;
            bootstrap.push(bootstrap_event(&mut slot.meta, time, EventAction::Shutdown)?);
        }
        for event in bootstrap {
            let source = event.source();
            policy.push(event, source, Barrier::NONE).map_err(DesError::from)?;
        }

        Engine::start(self.config, policy, host_slots, names)
    }
}

fn bootstrap_event(meta: &mut HostMeta, time: SimTime, action: EventAction) -> EngineResult<Event> {
    if time.is_max() {
        return Err(DesError::Config(format!("{}: {} event at infinity", meta.id, action.kind())).into());
    }
    Ok(Event::new(time, meta.next_sequence(), meta.id, meta.id, action))
}
