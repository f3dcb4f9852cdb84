//! Headless match runner
//!
//! Plays a match with a scripted player roster against the greedy enemy AI
//! and prints the final summary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use hexhold::core::types::{EntityId, Faction};
use hexhold::economy::{Tech, TechGate};
use hexhold::entity::{CombatEntity, UnitKind};
use hexhold::map::{HexCoord, StructureKind};
use hexhold::{Result, Simulation, SimulationConfig};
use serde::Serialize;

/// Run a headless hex strategy match
#[derive(Parser, Debug)]
#[command(name = "hexhold")]
#[command(about = "Run a headless match and print the outcome")]
struct Args {
    /// TOML config file (missing keys keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the turn limit
    #[arg(long)]
    turns: Option<u32>,

    /// Override the seed
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated milliseconds per update
    #[arg(long, default_value_t = 250)]
    step_ms: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Write the final state as a JSON save
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Serialize)]
struct MatchResult {
    seed: u64,
    max_turns: u32,
    #[serde(flatten)]
    summary: hexhold::SimulationSummary,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hexhold=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(turns) = args.turns {
        config.max_turns = turns;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut sim = Simulation::new(config)?;
    deploy_rosters(&mut sim);

    let step = Duration::from_millis(args.step_ms);
    let warning_steps = sim.config().spawn.warning_delay_ms / args.step_ms.max(1) + 1;
    while !sim.is_finished() {
        play_player_phase(&mut sim);
        // let a delayed spawn land before the turn ends
        for _ in 0..warning_steps {
            if sim.scheduler().pending_count() == 0 {
                break;
            }
            sim.update(step);
        }
        sim.end_turn();
        sim.run_enemy_phase(step);
    }

    if let Some(path) = &args.save {
        sim.save().write_to(path)?;
    }

    let result = MatchResult {
        seed: sim.config().seed,
        max_turns: sim.config().max_turns,
        summary: sim.summary(),
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let s = &result.summary;
        println!("Turn:          {}", s.turn);
        println!("Player units:  {}", s.player_units);
        println!("Enemy units:   {}", s.enemy_units);
        println!("Hostiles:      {} ({} spawn attempts)", s.active_hostiles, s.spawn_attempts);
        println!("Score:         {} vs {}", s.score, s.enemy_score);
        println!("Revealed:      {} tiles", s.revealed_tiles);
    }

    Ok(())
}

/// Player squad around the center, enemy squad on the far edge
fn deploy_rosters(sim: &mut Simulation) {
    let player = [
        (UnitKind::Soldier, HexCoord::new(0, 0)),
        (UnitKind::Shooter, HexCoord::new(1, -1)),
        (UnitKind::scout(), HexCoord::new(-1, 0)),
        (UnitKind::builder(), HexCoord::new(0, 1)),
        (UnitKind::Bomber, HexCoord::new(1, 0)),
    ];
    for (kind, coord) in player {
        if let Err(err) = sim.deploy(CombatEntity::new(kind, Faction::Player).with_position(coord)) {
            tracing::warn!(?kind, %coord, error = %err, "could not deploy player unit");
        }
    }

    let mut far = sim.map().open_tiles();
    far.sort_by_key(|c| std::cmp::Reverse(c.distance(&HexCoord::default())));
    for (kind, coord) in [UnitKind::Soldier, UnitKind::Bomber, UnitKind::Shooter]
        .into_iter()
        .zip(far)
    {
        if let Err(err) = sim.deploy(CombatEntity::new(kind, Faction::Enemy).with_position(coord)) {
            tracing::warn!(?kind, %coord, error = %err, "could not deploy enemy unit");
        }
    }

    sim.place_structure(HexCoord::new(0, 1), StructureKind::Camp);
    sim.unlock_tech(Tech::Fishing);
}

/// Attack whatever is in range, scout outward, build, develop
fn play_player_phase(sim: &mut Simulation) {
    for id in sim.registry().faction_ids(Faction::Player) {
        let Some(unit) = sim.registry().get(id).cloned() else {
            continue; // lost to splash earlier in this phase
        };
        let Some(from) = unit.position else {
            continue;
        };

        match unit.kind {
            UnitKind::Builder { .. } => {
                let camp = sim.map().get(from).and_then(|t| t.structure) == Some(StructureKind::Camp);
                if camp {
                    let _ = sim.upgrade_structure(id);
                }
            }
            UnitKind::Scout { .. } => scout_outward(sim, id, from),
            _ => {
                let min = min_range(sim, &unit);
                let target = sim
                    .registry()
                    .iter()
                    .filter(|e| Faction::Player.is_hostile_to(e.faction))
                    .filter_map(|e| e.position.map(|p| (from.distance(&p), e.id)))
                    .filter(|(d, _)| *d <= unit.attack_range && *d >= min)
                    .max_by_key(|(d, _)| *d)
                    .map(|(_, target)| target);
                if let Some(target) = target {
                    let _ = sim.attack(id, target);
                }
            }
        }
    }

    let developable: Vec<_> = sim
        .map()
        .tiles()
        .into_iter()
        .filter(|t| {
            t.resource
                .is_some_and(|r| r.required_tech().map_or(true, |tech| sim.techs().is_unlocked(tech)))
        })
        .map(|t| t.coord)
        .collect();
    if let Some(coord) = developable.first() {
        if sim.ledger().action_points() >= sim.config().development.ap_cost {
            let _ = sim.develop_tile(*coord);
        }
    }
}

fn min_range(sim: &Simulation, unit: &CombatEntity) -> u32 {
    match unit.kind {
        UnitKind::Shooter => sim.config().shooter_min_range,
        _ => 1,
    }
}

fn scout_outward(sim: &mut Simulation, id: EntityId, from: HexCoord) {
    let mut candidates = from.neighbors().to_vec();
    candidates.sort_by_key(|c| {
        (
            !sim.fog().is_revealed(*c),
            c.distance(&HexCoord::default()),
        )
    });
    if let Some(dest) = candidates
        .into_iter()
        .rev()
        .find(|c| sim.map().get(*c).is_some_and(|t| t.can_enter(Some(id))))
    {
        let _ = sim.move_unit(id, dest);
    }
}
