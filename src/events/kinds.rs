//! Notifications published by the simulation

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Faction, Turn};
use crate::events::bus::GameEvent;
use crate::map::hex::HexCoord;
use crate::map::tile::{ResourceKind, StructureKind};

/// A new turn began and the player phase is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStarted {
    pub turn: Turn,
}

/// The player ended their turn; the AI opponent acts now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyPhaseStarted {
    pub turn: Turn,
}

/// The last allowed turn was completed; no further phases follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnLimitReached {
    pub final_turn: Turn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMoved {
    pub id: EntityId,
    pub from: HexCoord,
    pub to: HexCoord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAttacked {
    pub attacker: EntityId,
    pub target: EntityId,
    pub damage: u32,
    /// Entities caught by splash damage
    pub splash_hits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDamaged {
    pub id: EntityId,
    pub amount: u32,
    pub remaining_hp: u32,
}

/// An entity reached 0 hp and left the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDied {
    pub id: EntityId,
    pub name: String,
    pub faction: Faction,
    pub coord: Option<HexCoord>,
}

/// A spawned hostile monster died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostileKilled {
    pub id: EntityId,
}

/// Hostiles are about to appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostileWarning {
    pub turn: Turn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostileSpawned {
    pub id: EntityId,
    pub coord: HexCoord,
    pub turn: Turn,
}

/// Every spawned hostile is dead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostilesCleared {
    /// Turn of the last kill
    pub turn: Turn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureUpgraded {
    pub builder: EntityId,
    pub coord: HexCoord,
    pub from: StructureKind,
    pub to: StructureKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FogRevealed {
    pub coords: Vec<HexCoord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChanged {
    pub faction: Faction,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPointsChanged {
    pub action_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDeveloped {
    pub coord: HexCoord,
    pub resource: ResourceKind,
}

impl GameEvent for TurnStarted {}
impl GameEvent for EnemyPhaseStarted {}
impl GameEvent for TurnLimitReached {}
impl GameEvent for UnitMoved {}
impl GameEvent for UnitAttacked {}
impl GameEvent for UnitDamaged {}
impl GameEvent for EntityDied {}
impl GameEvent for HostileKilled {}
impl GameEvent for HostileWarning {}
impl GameEvent for HostileSpawned {}
impl GameEvent for HostilesCleared {}
impl GameEvent for StructureUpgraded {}
impl GameEvent for FogRevealed {}
impl GameEvent for ScoreChanged {}
impl GameEvent for ActionPointsChanged {}
impl GameEvent for TileDeveloped {}
