//! Topdown Racer headless runner
//!
//! Races the AI roster and an autopilot "player" on a generated oval and
//! prints the results table. Usage:
//!
//!     topdown-racer [settings.json] [weights.json]

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use topdown_racer::maps::{MapConfig, Spawn};
use topdown_racer::ranking::{best_player_rank, standings};
use topdown_racer::sim::{
    CollisionField, GameSimulation, Line, PlayerKeys, Policy, PolicyParams, RayCaster, TickInput,
};
use topdown_racer::{RaceSession, RaceSettings};

const TRACK_WIDTH: usize = 800;
const TRACK_HEIGHT: usize = 600;

/// Elliptical ring road around the centre of the field
fn oval_track() -> anyhow::Result<(MapConfig, CollisionField)> {
    let (cx, cy) = (TRACK_WIDTH as f32 / 2.0, TRACK_HEIGHT as f32 / 2.0);
    let inside = |col: usize, row: usize, a: f32, b: f32| {
        let dx = (col as f32 - cx) / a;
        let dy = (row as f32 - cy) / b;
        dx * dx + dy * dy <= 1.0
    };
    let field = CollisionField::from_fn(TRACK_WIDTH, TRACK_HEIGHT, |col, row| {
        !inside(col, row, 370.0, 270.0) || inside(col, row, 250.0, 170.0)
    })?;

    let map = MapConfig {
        name: "Oval".to_string(),
        spawn: Spawn {
            x: cx,
            y: cy - 220.0,
            start_angle: 0.0,
        },
        end_line: Line::from_points((cx + 50.0, 20.0), (cx + 50.0, 140.0)),
        false_end_line: Line::from_points((cx + 70.0, 20.0), (cx + 70.0, 140.0)),
        start_before_end_line: true,
        collision_mask: String::new(),
        background: String::new(),
    };
    Ok((map, field))
}

/// Steer toward whichever side has more room
fn autopilot(sim: &GameSimulation, eyes: &RayCaster) -> PlayerKeys {
    let Some(player) = sim.cars_players().first() else {
        return PlayerKeys::default();
    };
    let car = player.car();
    let readings = eyes.cast(car.field(), &car.pose());
    let (right, ahead, left) = (readings[0], readings[1], readings[2]);
    PlayerKeys {
        accelerate: ahead > 1.0 || car.velocity() < 1.5,
        brake: ahead < 0.3,
        left: left > right + 0.05,
        right: right > left + 0.05,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Topdown Racer (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => RaceSettings::load(Path::new(&path))
            .with_context(|| format!("loading settings from {path}"))?,
        None => RaceSettings::default(),
    };

    let policy = match args.next() {
        Some(path) => {
            let params = PolicyParams::load(Path::new(&path))
                .with_context(|| format!("loading weights from {path}"))?;
            Policy::new(settings.ai_structure.network.clone(), &params)?
        }
        None => {
            log::warn!("No weights given, AI drivers use a random network");
            let mut rng = Pcg32::seed_from_u64(settings.seed);
            Policy::random(settings.ai_structure.network.clone(), &mut rng)?
        }
    };

    let (map, field) = oval_track()?;
    let session = RaceSession::new(vec![map], settings);
    let mut sim = session
        .create_game_simulation(Arc::new(field), Arc::new(policy))
        .context("building race")?;

    let eyes = RayCaster::new(vec![-35.0, 0.0, 35.0], 100.0, 2.0);
    while !sim.is_finished() {
        let keys = autopilot(&sim, &eyes);
        sim.step(&TickInput::single(keys));
    }
    log::info!("Race over after {} ticks", sim.current_timestep());

    let max_laps = session.max_laps() as usize;
    let table = standings(&sim);
    for row in &table {
        println!(
            "{:>2}. {:<20} {:>9.1}  {}",
            row.rank,
            row.name,
            row.distance,
            row.lap_cells(max_laps).join("  ")
        );
    }
    if let Some(rank) = best_player_rank(&table) {
        println!("You placed {rank} of {}", table.len());
    }
    Ok(())
}
