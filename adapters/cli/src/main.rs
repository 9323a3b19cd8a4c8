#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Maze Chase game.

mod settings;

use std::{fs::File, io::BufWriter, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use maze_chase_core::{AgentId, Command, Event};
use maze_chase_system_brains::Wanderer;
use maze_chase_system_controller::{Config as ControllerConfig, Controller};
use maze_chase_system_perception::PerceptionSet;
use maze_chase_world::{self as world, query, World};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use settings::Settings;

/// Runs a game with wandering agents for a fixed number of ticks.
#[derive(Debug, Parser)]
#[command(name = "maze-chase", version, about)]
struct Args {
    /// Level file to play.
    #[arg(long)]
    level: PathBuf,

    /// TOML file overriding the default game settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Number of ghosts to spawn.
    #[arg(long, default_value_t = 4)]
    ghosts: usize,

    /// Seed overriding the settings file and the built-in default.
    #[arg(long)]
    seed: Option<u64>,

    /// Writes the player's perception log as CSV to this path.
    #[arg(long)]
    record: Option<PathBuf>,
}

/// Entry point for the Maze Chase command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut config = settings.world_config()?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let seed = config.seed();

    let mut world = World::load(&args.level, config)
        .with_context(|| format!("failed to build world from {}", args.level.display()))?;
    let mut controller = Controller::new(ControllerConfig::new(settings.contact_passes()));
    let mut events = Vec::new();

    world::apply(&mut world, Command::SpawnPlayer, &mut events);
    let Some(player) = spawned_agent(&events) else {
        bail!("level refused to spawn the player");
    };
    controller.register(player, Wanderer::new(seed), PerceptionSet::standard(seed));
    if args.record.is_some() {
        let _ = controller.record(player);
    }

    for index in 0..args.ghosts {
        events.clear();
        world::apply(&mut world, Command::SpawnGhost, &mut events);
        match spawned_agent(&events) {
            Some(ghost) => controller.register(
                ghost,
                Wanderer::new(seed.wrapping_add(index as u64 + 1)),
                PerceptionSet::new(),
            ),
            None => warn!(index, "ghost spawn rejected"),
        }
    }

    let dt = Duration::from_millis(args.tick_ms);
    events.clear();
    for _ in 0..args.ticks {
        controller.update(&mut world, dt, &mut events);
        if query::status(&world).is_over() {
            break;
        }
    }

    let status = query::status(&world);
    let eaten = events
        .iter()
        .filter(|event| matches!(event, Event::FoodEaten { .. }))
        .count();
    info!(ticks = controller.ticks(), "simulation stopped");
    println!(
        "ticks: {}\nelapsed: {:.2}s\nscore: {}\nlives: {}\nfood eaten: {eaten}\nfood remaining: {}",
        controller.ticks(),
        query::elapsed(&world).as_secs_f32(),
        status.score,
        status.lives,
        status.food_remaining,
    );
    match status.outcome {
        Some(outcome) => println!("outcome: {outcome:?}"),
        None => println!("outcome: unfinished"),
    }

    if let (Some(path), Some(log)) = (&args.record, controller.log(player)) {
        let file = File::create(path)
            .with_context(|| format!("failed to create recording {}", path.display()))?;
        log.write_csv(BufWriter::new(file))
            .with_context(|| format!("failed to write recording {}", path.display()))?;
        info!(rows = log.len(), path = %path.display(), "recording written");
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn spawned_agent(events: &[Event]) -> Option<AgentId> {
    events.iter().find_map(|event| match event {
        Event::PlayerSpawned { agent, .. } | Event::GhostSpawned { agent, .. } => Some(*agent),
        _ => None,
    })
}
