//! Simulation: owns every service and drives the turn loop
//!
//! Player commands are accepted only during the player phase and only for
//! player units. [`Simulation::update`] advances the simulation clock, runs
//! hostile spawns that have come due and steps the enemy AI while it has the
//! initiative.

use std::rc::Rc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::clock::SimClock;
use crate::core::config::SimulationConfig;
use crate::core::error::{ActionError, Result};
use crate::core::types::{EntityId, Faction, Turn};
use crate::economy::development::{develop_tile, DevelopmentRules};
use crate::economy::ledger::ResourceLedger;
use crate::economy::tech::{Tech, TechTree};
use crate::entity::combat::{AttackOutcome, Battlefield, CombatRules, MoveOutcome};
use crate::entity::registry::EntityRegistry;
use crate::entity::unit::CombatEntity;
use crate::events::{EventBus, HostileSpawned, StructureUpgraded, TileDeveloped};
use crate::map::fog::FogOfWar;
use crate::map::grid::HexMap;
use crate::map::hex::HexCoord;
use crate::map::tile::StructureKind;
use crate::save::SaveRecord;
use crate::spawn::provider::{RandomHostileSpawner, SpawnProvider};
use crate::spawn::scheduler::HostileSpawnScheduler;
use crate::turn::ai::{AiProgress, EnemyController, GreedyEnemyAi};
use crate::turn::cycle::{PhaseOutcome, TurnCycle, TurnPhase};

/// Upper bound on AI steps in [`Simulation::run_enemy_phase`]
const MAX_AI_STEPS: usize = 10_000;

/// Snapshot of the headline numbers, for logs and the runner's JSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub turn: Turn,
    pub phase: TurnPhase,
    pub finished: bool,
    pub player_units: usize,
    pub enemy_units: usize,
    pub active_hostiles: usize,
    pub spawn_attempts: u32,
    pub score: u32,
    pub enemy_score: u32,
    pub action_points: u32,
    pub revealed_tiles: usize,
}

pub struct Simulation {
    config: SimulationConfig,
    map: HexMap,
    fog: FogOfWar,
    registry: EntityRegistry,
    bus: Rc<EventBus>,
    clock: SimClock,
    cycle: TurnCycle,
    scheduler: Rc<HostileSpawnScheduler>,
    spawner: Box<dyn SpawnProvider>,
    enemy_ai: Box<dyn EnemyController>,
    ledger: ResourceLedger,
    techs: TechTree,
    rules: CombatRules,
}

impl Simulation {
    /// New match on a map generated from the config's seed
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let map = HexMap::generate(config.map_radius, &mut rng);
        Self::with_map(config, map)
    }

    /// New match on a prepared map
    pub fn with_map(config: SimulationConfig, map: HexMap) -> Result<Self> {
        config.validate()?;

        let bus = Rc::new(EventBus::new());
        let clock = SimClock::new();
        let scheduler = HostileSpawnScheduler::new(config.spawn.clone(), clock.clone(), &bus);

        tracing::info!(
            radius = map.radius(),
            tiles = map.len(),
            max_turns = config.max_turns,
            "simulation created"
        );

        Ok(Self {
            map,
            fog: FogOfWar::new(),
            registry: EntityRegistry::new(),
            cycle: TurnCycle::new(config.max_turns),
            spawner: Box::new(RandomHostileSpawner::new(config.seed.wrapping_add(1))),
            enemy_ai: Box::new(GreedyEnemyAi::new(Faction::Enemy)),
            ledger: ResourceLedger::new(config.starting_action_points),
            techs: TechTree::new(),
            rules: CombatRules::from(&config),
            bus,
            clock,
            scheduler,
            config,
        })
    }

    pub fn with_spawner(mut self, spawner: Box<dyn SpawnProvider>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn with_enemy_ai(mut self, enemy_ai: Box<dyn EnemyController>) -> Self {
        self.enemy_ai = enemy_ai;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn map(&self) -> &HexMap {
        &self.map
    }

    pub fn fog(&self) -> &FogOfWar {
        &self.fog
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// The bus, for subscribing observers
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn scheduler(&self) -> &Rc<HostileSpawnScheduler> {
        &self.scheduler
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn techs(&self) -> &TechTree {
        &self.techs
    }

    pub fn current_turn(&self) -> Turn {
        self.cycle.current_turn()
    }

    pub fn phase(&self) -> TurnPhase {
        self.cycle.phase()
    }

    pub fn is_finished(&self) -> bool {
        self.cycle.is_finished()
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            turn: self.cycle.current_turn(),
            phase: self.cycle.phase(),
            finished: self.cycle.is_finished(),
            player_units: self.registry.faction_ids(Faction::Player).len(),
            enemy_units: self.registry.faction_ids(Faction::Enemy).len(),
            active_hostiles: self.scheduler.active_hostiles().len(),
            spawn_attempts: self.scheduler.spawn_attempts(),
            score: self.ledger.score(),
            enemy_score: self.ledger.enemy_score(),
            action_points: self.ledger.action_points(),
            revealed_tiles: self.fog.revealed_count(),
        }
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Place a unit (any side) on the map. Monsters join the active hostiles.
    pub fn deploy(&mut self, entity: CombatEntity) -> std::result::Result<EntityId, ActionError> {
        let coord = entity
            .position
            .ok_or(ActionError::NotPlaced(CombatEntity::UNREGISTERED))?;
        let tile = self.map.get(coord).ok_or(ActionError::OffMap(coord))?;
        if !tile.is_walkable() {
            return Err(ActionError::NotWalkable(coord));
        }
        if let Some(occupant) = tile.occupant {
            return Err(ActionError::Occupied { coord, occupant });
        }

        let monster = entity.kind.is_monster();
        let id = self.registry.register(entity);
        self.map.set_occupant(coord, id);
        if monster {
            self.scheduler.track(id);
        }
        Ok(id)
    }

    /// Put a structure on a tile, replacing whatever stood there
    pub fn place_structure(&mut self, coord: HexCoord, kind: StructureKind) -> bool {
        match self.map.get_mut(coord) {
            Some(tile) => {
                tile.structure = Some(kind);
                true
            }
            None => false,
        }
    }

    pub fn unlock_tech(&mut self, tech: Tech) -> bool {
        self.techs.unlock(tech)
    }

    // ------------------------------------------------------------------
    // Player commands
    // ------------------------------------------------------------------

    fn check_player_phase(&self) -> std::result::Result<(), ActionError> {
        match self.cycle.phase() {
            TurnPhase::Player => Ok(()),
            TurnPhase::Enemy => Err(ActionError::WrongPhase),
            TurnPhase::Finished => Err(ActionError::GameOver),
        }
    }

    fn check_controlled(&self, id: EntityId) -> std::result::Result<(), ActionError> {
        self.check_player_phase()?;
        let entity = self
            .registry
            .get(id)
            .ok_or(ActionError::UnknownEntity(id))?;
        if entity.faction != Faction::Player {
            return Err(ActionError::NotControlled(id));
        }
        Ok(())
    }

    fn reject<T>(command: &str, err: ActionError) -> std::result::Result<T, ActionError> {
        tracing::warn!(command, error = %err, "command rejected");
        Err(err)
    }

    fn battlefield(&mut self) -> Battlefield<'_> {
        Battlefield::new(
            &mut self.map,
            &mut self.fog,
            &mut self.registry,
            &self.bus,
            self.rules,
        )
    }

    fn opposing_units(&self) -> usize {
        self.registry
            .iter()
            .filter(|e| Faction::Player.is_hostile_to(e.faction))
            .count()
    }

    pub fn move_unit(&mut self, id: EntityId, to: HexCoord) -> std::result::Result<MoveOutcome, ActionError> {
        if let Err(err) = self.check_controlled(id) {
            return Self::reject("move", err);
        }
        self.battlefield().move_unit(id, to)
    }

    pub fn attack(&mut self, attacker: EntityId, target: EntityId) -> std::result::Result<AttackOutcome, ActionError> {
        if let Err(err) = self.check_controlled(attacker) {
            return Self::reject("attack", err);
        }

        let before = self.opposing_units();
        let outcome = self.battlefield().attack(attacker, target)?;
        let kills = before.saturating_sub(self.opposing_units()) as u32;
        if kills > 0 && self.config.kill_score > 0 {
            self.ledger.add_score(kills * self.config.kill_score, &self.bus);
        }
        Ok(outcome)
    }

    pub fn upgrade_structure(&mut self, builder: EntityId) -> std::result::Result<StructureUpgraded, ActionError> {
        if let Err(err) = self.check_controlled(builder) {
            return Self::reject("upgrade", err);
        }
        self.battlefield().upgrade_structure(builder)
    }

    pub fn develop_tile(&mut self, coord: HexCoord) -> std::result::Result<TileDeveloped, ActionError> {
        if let Err(err) = self.check_player_phase() {
            return Self::reject("develop", err);
        }
        develop_tile(
            coord,
            &mut self.map,
            &mut self.ledger,
            &self.techs,
            DevelopmentRules::from(&self.config.development),
            &self.bus,
        )
    }

    /// Hand the initiative to the enemy. Returns false outside the player phase.
    pub fn end_turn(&mut self) -> bool {
        if !self.cycle.end_turn(&self.bus, self.enemy_ai.as_mut()) {
            return false;
        }
        self.registry
            .begin_phase(Faction::Enemy, self.config.scout_moves_per_turn);
        true
    }

    // ------------------------------------------------------------------
    // Update loop
    // ------------------------------------------------------------------

    /// Advance the clock by `dt`, run due spawns and give the enemy AI one step
    pub fn update(&mut self, dt: Duration) -> Vec<HostileSpawned> {
        self.clock.advance(dt);
        let mut spawned = self.run_due_spawns();

        if self.cycle.phase() != TurnPhase::Enemy {
            return spawned;
        }

        let players_before = self.registry.faction_ids(Faction::Player).len();
        let progress = {
            let Self {
                map,
                fog,
                registry,
                bus,
                enemy_ai,
                rules,
                ..
            } = self;
            let mut field = Battlefield::new(map, fog, registry, bus, *rules);
            enemy_ai.step(&mut field)
        };

        let lost = players_before.saturating_sub(self.registry.faction_ids(Faction::Player).len()) as u32;
        if lost > 0 && self.config.kill_score > 0 {
            self.ledger
                .add_enemy_score(lost * self.config.kill_score, &self.bus);
        }

        if progress == AiProgress::Finished {
            if let PhaseOutcome::NextTurn(turn) = self.cycle.complete_enemy_phase(&self.bus) {
                self.start_player_turn(turn);
                spawned.extend(self.run_due_spawns());
            }
        }

        spawned
    }

    /// Step the AI until the enemy phase is over. Returns the spawns that
    /// happened along the way.
    pub fn run_enemy_phase(&mut self, dt: Duration) -> Vec<HostileSpawned> {
        let mut spawned = Vec::new();
        let mut steps = 0;
        while self.cycle.phase() == TurnPhase::Enemy && steps < MAX_AI_STEPS {
            spawned.extend(self.update(dt));
            steps += 1;
        }
        if steps == MAX_AI_STEPS {
            tracing::error!(turn = self.current_turn(), "enemy AI never finished its phase");
        }
        spawned
    }

    fn start_player_turn(&mut self, turn: Turn) {
        let scouts = self
            .registry
            .begin_phase(Faction::Player, self.config.scout_moves_per_turn);
        self.ledger
            .add_action_points(self.config.action_points_per_turn, &self.bus);
        tracing::debug!(turn, scouts, "player phase ready");
    }

    fn run_due_spawns(&mut self) -> Vec<HostileSpawned> {
        let scheduler = Rc::clone(&self.scheduler);
        let Self {
            map,
            fog,
            registry,
            bus,
            spawner,
            rules,
            ..
        } = self;
        let mut field = Battlefield::new(map, fog, registry, bus, *rules);
        scheduler.run_due(&mut field, spawner.as_mut())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Capture the world
    pub fn save(&self) -> SaveRecord {
        let mut record = SaveRecord::capture(
            self.cycle.current_turn(),
            &self.map,
            &self.fog,
            &self.registry,
            &self.ledger,
        );
        record.pending_spawns = self.scheduler.pending_turns();
        record
    }

    /// Replace the world with a saved one, resuming at the start of the saved
    /// turn's player phase. Spawns that were still waiting in the save run on
    /// the next update; anything pending before the restore is dropped.
    pub fn restore(&mut self, record: &SaveRecord) -> Result<()> {
        let world = record.restore()?;

        self.map = world.map;
        self.fog = world.fog;
        self.registry = world.registry;
        self.ledger = world.ledger;
        self.cycle = TurnCycle::starting_at(world.turn, self.config.max_turns);
        self.registry
            .begin_phase(Faction::Player, self.config.scout_moves_per_turn);

        let hostiles: Vec<EntityId> = self
            .registry
            .iter()
            .filter(|e| e.kind.is_monster())
            .map(|e| e.id)
            .collect();
        self.scheduler
            .resume(world.turn, hostiles, record.pending_spawns.iter().copied());

        tracing::info!(turn = world.turn, "simulation restored");
        Ok(())
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.scheduler.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::unit::UnitKind;
    use crate::map::tile::ResourceKind;
    use crate::turn::ai::IdleAi;

    fn open_sim() -> Simulation {
        Simulation::with_map(SimulationConfig::default(), HexMap::new(6))
            .unwrap()
            .with_enemy_ai(Box::new(IdleAi::default()))
    }

    fn unit(kind: UnitKind, faction: Faction, q: i32, r: i32) -> CombatEntity {
        CombatEntity::new(kind, faction).with_position(HexCoord::new(q, r))
    }

    #[test]
    fn test_new_uses_config() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        assert_eq!(sim.current_turn(), 1);
        assert_eq!(sim.phase(), TurnPhase::Player);
        assert_eq!(sim.ledger().action_points(), 5);
        assert_eq!(sim.map().radius(), 6);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig {
            max_turns: 0,
            ..SimulationConfig::default()
        };
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_deploy_rejects_taken_tile() {
        let mut sim = open_sim();
        let first = sim.deploy(unit(UnitKind::Soldier, Faction::Player, 0, 0)).unwrap();
        assert_eq!(
            sim.deploy(unit(UnitKind::Soldier, Faction::Enemy, 0, 0)),
            Err(ActionError::Occupied {
                coord: HexCoord::new(0, 0),
                occupant: first
            })
        );
        assert!(sim.deploy(CombatEntity::monster()).is_err());
    }

    #[test]
    fn test_cannot_command_enemy_units() {
        let mut sim = open_sim();
        let enemy = sim.deploy(unit(UnitKind::Soldier, Faction::Enemy, 0, 0)).unwrap();
        assert_eq!(
            sim.move_unit(enemy, HexCoord::new(1, 0)),
            Err(ActionError::NotControlled(enemy))
        );
    }

    #[test]
    fn test_commands_refused_during_enemy_phase() {
        let mut sim = open_sim();
        let id = sim.deploy(unit(UnitKind::Soldier, Faction::Player, 0, 0)).unwrap();
        assert!(sim.end_turn());
        assert!(!sim.end_turn());
        assert_eq!(sim.move_unit(id, HexCoord::new(1, 0)), Err(ActionError::WrongPhase));
        assert_eq!(sim.develop_tile(HexCoord::new(1, 0)), Err(ActionError::WrongPhase));
    }

    #[test]
    fn test_update_completes_enemy_phase() {
        let mut sim = open_sim();
        sim.end_turn();
        sim.update(Duration::from_millis(16));
        assert_eq!(sim.current_turn(), 2);
        assert_eq!(sim.phase(), TurnPhase::Player);
        assert_eq!(sim.ledger().action_points(), 5 + 3);
    }

    #[test]
    fn test_scout_moves_reset_each_turn() {
        let mut sim = open_sim();
        let scout = sim.deploy(unit(UnitKind::scout(), Faction::Player, 0, 0)).unwrap();
        sim.move_unit(scout, HexCoord::new(1, 0)).unwrap();
        sim.move_unit(scout, HexCoord::new(2, 0)).unwrap();
        assert_eq!(
            sim.move_unit(scout, HexCoord::new(3, 0)),
            Err(ActionError::NoMovesLeft(scout))
        );

        sim.end_turn();
        sim.run_enemy_phase(Duration::from_millis(16));
        assert!(sim.move_unit(scout, HexCoord::new(3, 0)).is_ok());
    }

    #[test]
    fn test_kill_awards_score() {
        let mut sim = open_sim();
        let soldier = sim.deploy(unit(UnitKind::Soldier, Faction::Player, 0, 0)).unwrap();
        let mut weak = unit(UnitKind::Scout { moves_remaining: 2, reveal_radius: 2 }, Faction::Enemy, 1, 0);
        weak.hp = 1;
        let target = sim.deploy(weak).unwrap();

        let outcome = sim.attack(soldier, target).unwrap();
        assert!(outcome.target_killed);
        assert_eq!(sim.ledger().score(), 1);
    }

    #[test]
    fn test_develop_tile_through_simulation() {
        let mut map = HexMap::new(3);
        map.get_mut(HexCoord::new(1, 0)).unwrap().resource = Some(ResourceKind::Fish);
        let mut sim = Simulation::with_map(SimulationConfig::default(), map).unwrap();

        assert_eq!(
            sim.develop_tile(HexCoord::new(1, 0)),
            Err(ActionError::TechLocked(Tech::Fishing))
        );
        sim.unlock_tech(Tech::Fishing);
        assert!(sim.develop_tile(HexCoord::new(1, 0)).is_ok());
        assert_eq!(sim.ledger().score(), 5);
        assert_eq!(sim.ledger().action_points(), 3);
    }

    #[test]
    fn test_game_over_after_max_turns() {
        let config = SimulationConfig {
            max_turns: 2,
            ..SimulationConfig::default()
        };
        let mut sim = Simulation::with_map(config, HexMap::new(3))
            .unwrap()
            .with_enemy_ai(Box::new(IdleAi::default()));

        for _ in 0..2 {
            sim.end_turn();
            sim.update(Duration::ZERO);
        }
        assert!(sim.is_finished());
        assert!(!sim.end_turn());
        assert_eq!(sim.develop_tile(HexCoord::new(0, 0)), Err(ActionError::GameOver));
    }

    #[test]
    fn test_summary_counts() {
        let mut sim = open_sim();
        sim.deploy(unit(UnitKind::Soldier, Faction::Player, 0, 0)).unwrap();
        sim.deploy(unit(UnitKind::Bomber, Faction::Enemy, 3, 0)).unwrap();
        let summary = sim.summary();
        assert_eq!(summary.player_units, 1);
        assert_eq!(summary.enemy_units, 1);
        assert!(!summary.finished);
    }
}
