#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless harness that drives the spawn director against an in-memory
//! world, killing enemies at random so the population keeps churning.

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use survivor_core::{Command, EnemyKind, Position};
use survivor_system_spawning::{DirectorConfig, DirectorSnapshot, SpawnDirector, TickInput};
use survivor_world::{self as world, query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

const ORBIT_RADIUS: f32 = 600.0;
const ORBIT_SPEED: f64 = 0.2;

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless spawn director simulation", long_about = None)]
struct CliArgs {
    /// Seed for spawn selection, placement and simulated kills.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 300.0)]
    duration: f64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// TOML file overriding the default director configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Probability per tick that one live enemy is destroyed.
    #[arg(long, default_value_t = 0.05)]
    kill_rate: f64,
    /// Seconds between player level-ups; zero keeps the player at level one.
    #[arg(long, default_value_t = 45.0)]
    level_every: f64,
    /// Seconds between logged director snapshots; zero disables them.
    #[arg(long, default_value_t = 10.0)]
    report_every: f64,
    /// Tracing filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Debug, PartialEq)]
struct Summary {
    spawned: BTreeMap<EnemyKind, u32>,
    destroyed: u32,
    peak_live: usize,
    world_live: usize,
    snapshot: DirectorSnapshot,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    install_tracing(&args.log);

    let config = match &args.config {
        Some(path) => DirectorConfig::from_file(path)
            .with_context(|| format!("failed to load director config {}", path.display()))?,
        None => DirectorConfig::default(),
    };
    let summary = simulate(&args, config)?;
    print_summary(&args, &summary);
    Ok(())
}

fn install_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

fn simulate(args: &CliArgs, config: DirectorConfig) -> Result<Summary> {
    ensure!(args.tick_ms > 0, "--tick-ms must be positive");
    ensure!(
        args.duration.is_finite() && args.duration >= 0.0,
        "--duration must be a non-negative number of seconds"
    );
    ensure!(
        (0.0..=1.0).contains(&args.kill_rate),
        "--kill-rate must lie within [0, 1]"
    );

    let mut world = World::with_bounds(config.world);
    let mut director =
        SpawnDirector::with_seed(config, args.seed).context("invalid director config")?;
    let mut kills = ChaCha8Rng::seed_from_u64(args.seed.rotate_left(17));

    let dt = Duration::from_millis(args.tick_ms);
    let steps = (args.duration * 1_000.0 / args.tick_ms as f64).ceil() as u64;
    let center = query::bounds(&world).center();
    let mut next_report = args.report_every;
    let mut spawned = BTreeMap::new();
    let mut destroyed = 0;
    let mut peak_live = 0;

    info!(seed = args.seed, steps, "simulation started");
    for _ in 0..steps {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { dt }, &mut events);
        let elapsed = query::elapsed(&world).as_secs_f64();
        world::apply(
            &mut world,
            Command::MovePlayer {
                position: orbit(center, elapsed),
            },
            &mut events,
        );
        if args.level_every > 0.0 {
            let level = 1 + (elapsed / args.level_every) as u32;
            world::apply(&mut world, Command::SetPlayerLevel { level }, &mut events);
        }

        let input = TickInput::new(
            dt,
            query::player_position(&world),
            query::player_level(&world),
        );
        let report = director.tick(input, &mut world);
        for spawn in &report.dispatched {
            *spawned.entry(spawn.request.kind).or_insert(0) += 1;
        }
        peak_live = peak_live.max(query::live_population(&world));

        let live = query::live_population(&world);
        if live > 0 && kills.gen_bool(args.kill_rate) {
            let handles = query::enemy_handles(&world);
            if let Some(&handle) = handles.get(kills.gen_range(0..live)) {
                world::apply(&mut world, Command::DestroyEnemy { handle }, &mut events);
                destroyed += 1;
            }
        }
        director.handle_events(&events);

        if args.report_every > 0.0 && elapsed >= next_report {
            log_snapshot(&director.snapshot());
            next_report += args.report_every;
        }
    }

    Ok(Summary {
        spawned,
        destroyed,
        peak_live,
        world_live: query::live_population(&world),
        snapshot: director.snapshot(),
    })
}

fn orbit(center: Position, elapsed: f64) -> Position {
    let angle = (elapsed * ORBIT_SPEED) as f32;
    center.offset(ORBIT_RADIUS * angle.cos(), ORBIT_RADIUS * angle.sin())
}

fn log_snapshot(snapshot: &DirectorSnapshot) {
    info!(
        elapsed = snapshot.elapsed,
        budget = snapshot.budget,
        rate = snapshot.rate,
        phase = ?snapshot.phase.name,
        chaos = snapshot.phase.chaos_active,
        live = snapshot.total_live,
        pending = snapshot.pending,
        "director snapshot"
    );
}

fn print_summary(args: &CliArgs, summary: &Summary) {
    println!(
        "simulated {:.1}s with seed {:#x}",
        summary.snapshot.elapsed, args.seed
    );
    for (kind, count) in &summary.spawned {
        println!("  {kind:<9} spawned {count}");
    }
    println!(
        "destroyed {}, peak live {}, live at end {}",
        summary.destroyed, summary.peak_live, summary.snapshot.total_live
    );
    println!(
        "budget {:.2} at {:.2} pts/s, pool {:?}",
        summary.snapshot.budget, summary.snapshot.rate, summary.snapshot.pool
    );
}
