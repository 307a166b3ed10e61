//! Grassveil - headless session driver
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --ticks <N>       Frames to simulate at 16 ms each (default: 3600)
//!   --config <PATH>   Session config JSON (default: built-in defaults)
//!   --seed <SEED>     Overrides the config seed

use std::path::PathBuf;
use std::time::Instant;

use grassveil::core::logging;
use grassveil::core::types::{ActorId, Vec3};
use grassveil::math::{heading_of, planar};
use grassveil::session::{FrameInput, Session, SessionConfig, SessionEvent};

const FRAME_MS: f64 = 16.0;
const WALK_RADIUS: f32 = 8.0;
const WALK_SPEED: f32 = 0.06;

fn main() {
    logging::init();
    log::info!("Grassveil starting...");

    let args: Vec<String> = std::env::args().collect();
    let ticks = parse_value_arg::<u64>(&args, "--ticks", "-t").unwrap_or(3600);

    let mut config = match parse_value_arg::<PathBuf>(&args, "--config", "-c") {
        Some(path) => {
            log::info!("Loading config from: {}", path.display());
            match SessionConfig::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("Failed to load {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => SessionConfig::default(),
    };
    if let Some(seed) = parse_value_arg::<u64>(&args, "--seed", "-s") {
        config.seed = seed;
    }

    let mut session = Session::new(config, ActorId::from("local"));
    let start = Instant::now();
    let mut captures = 0usize;
    let mut reports = 0usize;

    for frame in 0..ticks {
        let (position, facing) = scripted_walk(frame);
        let report = session.frame(FrameInput {
            position,
            facing,
            elapsed_ms: FRAME_MS,
        });

        if let Some(tier) = report.tier {
            log::info!("[frame {}] noise {:.1} -> {}", frame, report.noise, tier.label());
        }

        for event in session.drain_events() {
            match event {
                SessionEvent::LocalMoved(_) => reports += 1,
                SessionEvent::Captured(c) => {
                    captures += 1;
                    log::warn!("[frame {}] {} captured by {}", frame, c.actor, c.mob);
                }
            }
        }
    }

    let stats = session.stats();
    log::info!(
        "Simulated {} frames in {:.2?} ({} position reports, {} captures)",
        ticks,
        start.elapsed(),
        reports,
        captures
    );
    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode stats: {}", e),
    }
}

/// Local actor walks a circle around the field centre, facing along its path.
fn scripted_walk(frame: u64) -> (Vec3, f32) {
    let angle = frame as f32 * WALK_SPEED / WALK_RADIUS;
    let position = Vec3::new(angle.cos() * WALK_RADIUS, 0.2, angle.sin() * WALK_RADIUS);
    let tangent = Vec3::new(-angle.sin(), 0.0, angle.cos());
    (position, heading_of(planar(tangent)))
}

/// Parse `--flag <value>` (or its short form) from the command line.
fn parse_value_arg<T: std::str::FromStr>(args: &[String], long: &str, short: &str) -> Option<T> {
    for i in 0..args.len() {
        if args[i] == long || args[i] == short {
            if let Some(value) = args.get(i + 1) {
                return value.parse().ok();
            }
        }
    }
    None
}
