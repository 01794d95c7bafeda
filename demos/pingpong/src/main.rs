//! pingpong — smallest runnable demo of the des parallel scheduler.
//!
//! Pairs of hosts volley a counter back and forth over a jittered link whose
//! base latency is reported to the engine as the topology minimum.
//! With an even worker count each pair spans two workers, so every volley
//! crosses a worker boundary.  No link is shorter than the reported minimum,
//! so volleys land at or past the barrier and `events clamped` stays at 0.
//!
//! ```text
//! cargo run -p pingpong                    # built-in defaults
//! cargo run -p pingpong -- pingpong.json   # DemoConfig as JSON
//! RUST_LOG=des_engine=debug cargo run -p pingpong
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use des_core::time::NANOS_PER_MILLI;
use des_core::{EngineConfig, HostId, Packet, SimTime};
use des_engine::EngineBuilder;
use des_host::{Host, HostContext, HostError, HostResult};
use des_output::{CsvTraceWriter, TraceObserver};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(default)]
struct DemoConfig {
    engine:      EngineConfig,
    /// Number of host pairs.
    pairs:       u32,
    /// One-way link latency, also reported as the topology minimum.
    latency_ms:  f64,
    /// Volleys per pair before the receiver stops replying.
    max_volleys: u64,
    output_dir:  PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                num_workers: 2,
                end_time_ns: 2_000 * NANOS_PER_MILLI,
                seed:        42,
                ..EngineConfig::default()
            },
            pairs:       4,
            latency_ms:  25.0,
            max_volleys: 50,
            output_dir:  PathBuf::from("output/pingpong"),
        }
    }
}

fn load_config() -> Result<DemoConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(DemoConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

// ── Host application ──────────────────────────────────────────────────────────

struct Player {
    peer:        HostId,
    serves:      bool,
    latency_ns:  u64,
    /// Up to this much extra delay per packet, drawn from the host's RNG.
    jitter_ns:   u64,
    max_volleys: u64,
    last_seen:   u64,
}

impl Player {
    fn send(&self, count: u64, ctx: &mut HostContext<'_>) -> HostResult<()> {
        let delay = ctx.rng().jitter_ns(self.latency_ns, self.jitter_ns);
        ctx.send_packet(self.peer, count.to_le_bytes().to_vec(), delay)?;
        Ok(())
    }
}

impl Host for Player {
    fn on_boot(&mut self, ctx: &mut HostContext<'_>) -> HostResult<()> {
        if self.serves {
            self.send(1, ctx)?;
        }
        Ok(())
    }

    fn on_packet(&mut self, packet: Packet, ctx: &mut HostContext<'_>) -> HostResult<()> {
        let bytes: [u8; 8] = packet.payload.as_slice().try_into().map_err(|_| HostError::Malformed {
            from:   packet.source,
            reason: format!("expected 8 bytes, got {}", packet.payload.len()),
        })?;
        let count = u64::from_le_bytes(bytes);
        self.last_seen = count;
        if count < self.max_volleys {
            self.send(count + 1, ctx)?;
        }
        Ok(())
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let demo = load_config()?;
    if demo.pairs == 0 {
        bail!("pairs must be at least 1");
    }
    let latency_ns = (demo.latency_ms * NANOS_PER_MILLI as f64) as u64;

    println!("=== pingpong — des parallel scheduler ===");
    println!(
        "Pairs: {}  |  Workers: {}  |  Latency: {} ms  |  End: {}",
        demo.pairs,
        demo.engine.num_workers,
        demo.latency_ms,
        SimTime(demo.engine.end_time_ns)
    );

    // 1. Hosts 2k and 2k+1 play each other; 2k serves.
    let mut builder = EngineBuilder::new(demo.engine.clone());
    for k in 0..demo.pairs {
        for (me, peer) in [(2 * k, 2 * k + 1), (2 * k + 1, 2 * k)] {
            let player = Player {
                peer:        HostId(peer),
                serves:      me == 2 * k,
                latency_ns,
                jitter_ns:   latency_ns / 10,
                max_volleys: demo.max_volleys,
                last_seen:   0,
            };
            builder = builder.host_named(format!("player-{me}"), player, SimTime::ZERO);
        }
    }
    let mut engine = builder.build()?;

    // 2. The topology's shortest link bounds how far workers may run ahead.
    let update = engine.report_topology_min_latency(demo.latency_ms);
    println!("Min time jump: {} ns ({update:?})", engine.min_time_jump());

    // 3. Trace output.
    std::fs::create_dir_all(&demo.output_dir)?;
    let writer = CsvTraceWriter::new(Path::new(&demo.output_dir))?;
    let mut obs = TraceObserver::new(writer);

    // 4. Run.
    let t0 = Instant::now();
    let summary = engine.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("trace error: {e}");
    }

    // 5. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  windows         : {}", summary.rounds);
    println!("  events executed : {}", summary.totals.events_executed);
    println!("  events clamped  : {}", summary.totals.events_clamped);
    println!("  final barrier   : {}", summary.final_barrier);
    println!("  trace           : {}", demo.output_dir.display());
    println!();

    println!("{:<12} {:<8} {:<8} {:<8}", "Host", "Worker", "Sent", "Volley");
    println!("{}", "-".repeat(38));
    for i in 0..engine.host_count() as u32 {
        let host = HostId(i);
        let worker = engine.worker_of(host).map_or_else(|| "-".to_string(), |w| w.0.to_string());
        let row = engine.inspect_host(host, |slot| {
            (slot.meta.name.clone(), slot.meta.stats.packets_sent, slot.app.last_seen)
        });
        if let Some((name, sent, seen)) = row {
            println!("{name:<12} {worker:<8} {sent:<8} {seen:<8}");
        }
    }

    Ok(())
}
