//! arena-run: headless runner for tankwar levels.
//!
//! Usage:
//!   arena-run run --level levels/arena.json --ticks 500 --every 50
//!   arena-run check --level levels/arena.json

use std::path::PathBuf;
use std::process;

use glam::Vec3;
use tracing_subscriber::EnvFilter;

use tankwar_core::commands::SimCommand;
use tankwar_core::config::LevelConfig;
use tankwar_sim::{SimConfig, SimulationEngine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "arena-run: tankwar headless arena runner\n\
         \n\
         Commands:\n\
         \n\
         run       Load a level and print snapshots as JSON lines\n\
         \n\
           --level <path>     Level file (JSON)\n\
           --ticks <N>        Ticks to simulate (default: 500)\n\
           --every <N>        Print every Nth snapshot (default: 50)\n\
           --seed <N>         RNG seed, unless the level sets one (default: 42)\n\
           --drive <x,z>      Constant player velocity\n\
         \n\
         check     Parse and validate a level file\n\
         \n\
           --level <path>     Level file (JSON)\n\
         \n\
         Log verbosity follows RUST_LOG (default: info).\n"
    );
}

fn parse_flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_number<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    match parse_flag(args, name) {
        Some(raw) => match raw.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: {name} expects a number, got {raw}");
                process::exit(1);
            }
        },
        None => default,
    }
}

fn parse_drive(args: &[String]) -> Option<Vec3> {
    let raw = parse_flag(args, "--drive")?;
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        return None;
    }
    let x: f32 = parts[0].parse().ok()?;
    let z: f32 = parts[1].parse().ok()?;
    Some(Vec3::new(x, 0.0, z))
}

fn load_level(args: &[String]) -> LevelConfig {
    let path = match parse_flag(args, "--level") {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("Error: --level <path> is required");
            process::exit(1);
        }
    };
    match LevelConfig::load(&path) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error loading {}: {e}", path.display());
            process::exit(1);
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let level = load_level(args);
    let ticks: u64 = parse_number(args, "--ticks", 500);
    let every: u64 = parse_number::<u64>(args, "--every", 50).max(1);
    let seed: u64 = parse_number(args, "--seed", 42);

    let mut engine = SimulationEngine::from_level(
        SimConfig {
            seed,
            ..Default::default()
        },
        &level,
    );
    if let Some(velocity) = parse_drive(args) {
        engine.queue_command(SimCommand::SetPlayerVelocity { velocity });
    }

    tracing::info!(ticks, agents = engine.registry().len(), "running");
    for _ in 0..ticks {
        let snapshot = engine.tick();
        let print = snapshot.time.tick % every == 0 || !snapshot.events.is_empty();
        if !print {
            continue;
        }
        match serde_json::to_string(&snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                eprintln!("Error encoding snapshot: {e}");
                process::exit(1);
            }
        }
    }

    let time = engine.time();
    tracing::info!(
        tick = time.tick,
        elapsed_secs = time.elapsed_secs,
        survivors = engine.registry().len(),
        "done"
    );
}

// --- Check command ---

fn cmd_check(args: &[String]) {
    let level = load_level(args);
    eprintln!(
        "OK: {} agent(s), {} obstacle(s), {} player spawn(s)",
        level.agents.len(),
        level.obstacles.len(),
        level.player_spawns.len()
    );
    for (index, spawn) in level.agents.iter().enumerate() {
        eprintln!(
            "  [{index}] {:?} at {} ({} waypoint(s))",
            spawn.config.archetype,
            spawn.position,
            spawn.waypoints.len()
        );
    }
}
