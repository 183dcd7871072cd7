#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a match against the reference board.

mod layout_transfer;
mod replay;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lane_tactics_core::{Player, Settings, StrategyConfig, UnitCatalog};
use lane_tactics_system_driver::TurnDriver;
use lane_tactics_world::World;
use tracing_subscriber::EnvFilter;

use crate::layout_transfer::LayoutSnapshot;
use crate::replay::FrameLog;

const DEFAULT_LOG_FILTER: &str = "lane_tactics=info";

/// Plans turns for a two-lane match and prints what each turn did.
#[derive(Debug, Parser)]
#[command(name = "lane-tactics", version)]
struct Cli {
    /// Strategy tuning in TOML; built-in defaults when omitted.
    #[arg(long)]
    strategy: Option<PathBuf>,
    /// Game configuration JSON carrying the unit table.
    #[arg(long = "game-config")]
    game_config: Option<PathBuf>,
    /// Number of turns to plan.
    #[arg(long, default_value_t = 10)]
    turns: u32,
    /// Recorded action frames, one JSON document per line, fed after the matching turn.
    #[arg(long)]
    frames: Option<PathBuf>,
    /// Layout transfer string seeding the opponent's structures.
    #[arg(long = "opponent-layout")]
    opponent_layout: Option<String>,
    /// Log filter; overrides `RUST_LOG`.
    #[arg(long)]
    log: Option<String>,
}

/// Entry point for the lane-tactics command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    let settings = load_settings(&cli)?;
    let mut world = World::new(settings.catalog.clone());
    if let Some(layout) = &cli.opponent_layout {
        let snapshot =
            LayoutSnapshot::decode(layout).context("decoding the opponent layout string")?;
        let placed = replay::seed_opponent(&mut world, &snapshot);
        tracing::info!(placed, "opponent layout seeded");
    }
    let frames = match &cli.frames {
        Some(path) => FrameLog::load(path)?,
        None => FrameLog::default(),
    };

    let mut driver = TurnDriver::new(settings);
    for report in replay::run(&mut driver, &mut world, &frames, cli.turns) {
        println!("{}", replay::describe(&report));
    }

    let [walls, supports, turrets] = replay::structure_counts(&world, Player::Own);
    println!("final walls={walls} supports={supports} turrets={turrets}");
    let layout = LayoutSnapshot::capture(&world.structures(Player::Own))
        .encode()
        .context("encoding the final layout")?;
    println!("{layout}");
    Ok(())
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let strategy = match &cli.strategy {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading strategy from {}", path.display()))?;
            StrategyConfig::from_toml_str(&source)
                .with_context(|| format!("parsing strategy from {}", path.display()))?
        }
        None => StrategyConfig::default(),
    };
    let catalog = match &cli.game_config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading game configuration from {}", path.display()))?;
            UnitCatalog::from_game_config(&source)
                .with_context(|| format!("parsing game configuration from {}", path.display()))?
        }
        None => UnitCatalog::default(),
    };
    Ok(Settings::new(strategy, catalog))
}
