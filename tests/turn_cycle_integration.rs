//! Turn cycle integration tests

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use hexhold::core::types::Faction;
use hexhold::entity::{CombatEntity, UnitKind};
use hexhold::events::{handler, ActionPointsChanged, EnemyPhaseStarted, TurnLimitReached, TurnStarted};
use hexhold::map::{HexCoord, HexMap};
use hexhold::turn::{IdleAi, TurnPhase};
use hexhold::{ActionError, Simulation, SimulationConfig};

fn sim_with(config: SimulationConfig) -> Simulation {
    Simulation::with_map(config, HexMap::new(5))
        .unwrap()
        .with_enemy_ai(Box::new(IdleAi::default()))
}

fn play_turn(sim: &mut Simulation) {
    sim.end_turn();
    sim.run_enemy_phase(Duration::from_millis(16));
}

#[test]
fn test_full_match_runs_thirty_turns() {
    let mut sim = sim_with(SimulationConfig::default());

    let started = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&started);
    let on_start = handler(move |e: &TurnStarted| {
        sink.borrow_mut().push(e.turn);
        Ok(())
    });
    sim.bus().subscribe(&on_start);

    let limit = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&limit);
    let on_limit = handler(move |e: &TurnLimitReached| {
        *sink.borrow_mut() = Some(e.final_turn);
        Ok(())
    });
    sim.bus().subscribe(&on_limit);

    let mut guard = 0;
    while !sim.is_finished() && guard < 100 {
        play_turn(&mut sim);
        guard += 1;
    }

    assert_eq!(guard, 30);
    assert_eq!(*started.borrow(), (2..=30).collect::<Vec<_>>());
    assert_eq!(*limit.borrow(), Some(30));
    assert_eq!(sim.phase(), TurnPhase::Finished);
}

#[test]
fn test_end_turn_twice_starts_one_enemy_phase() {
    let mut sim = sim_with(SimulationConfig::default());
    let phases = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&phases);
    let on_phase = handler(move |_: &EnemyPhaseStarted| {
        *counter.borrow_mut() += 1;
        Ok(())
    });
    sim.bus().subscribe(&on_phase);

    assert!(sim.end_turn());
    assert!(!sim.end_turn());
    assert_eq!(*phases.borrow(), 1);
    assert_eq!(sim.phase(), TurnPhase::Enemy);
}

#[test]
fn test_action_points_granted_each_turn() {
    let config = SimulationConfig {
        starting_action_points: 1,
        action_points_per_turn: 2,
        ..SimulationConfig::default()
    };
    let mut sim = sim_with(config);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let on_points = handler(move |e: &ActionPointsChanged| {
        sink.borrow_mut().push(e.action_points);
        Ok(())
    });
    sim.bus().subscribe(&on_points);

    play_turn(&mut sim);
    play_turn(&mut sim);
    assert_eq!(*seen.borrow(), vec![3, 5]);
}

#[test]
fn test_finished_match_refuses_commands() {
    let config = SimulationConfig {
        max_turns: 1,
        ..SimulationConfig::default()
    };
    let mut sim = sim_with(config);
    let soldier = sim
        .deploy(CombatEntity::new(UnitKind::Soldier, Faction::Player).with_position(HexCoord::new(0, 0)))
        .unwrap();

    play_turn(&mut sim);
    assert!(sim.is_finished());
    assert_eq!(sim.current_turn(), 2);
    assert_eq!(
        sim.move_unit(soldier, HexCoord::new(1, 0)),
        Err(ActionError::GameOver)
    );
    assert!(!sim.end_turn());
}
