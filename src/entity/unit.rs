//! Combat entities and their kinds
//!
//! Unit behaviour differs per kind at three points: a pre-move hook (scout
//! fog reveal), an attack precondition (shooter minimum range) and a
//! post-attack effect (bomber splash). Kinds are a closed enum; the combat
//! code matches on it at those points.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Faction};
use crate::entity::constants::*;
use crate::map::hex::HexCoord;
use crate::map::tile::StructureKind;

/// Kind of unit, with any per-kind state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Soldier,
    Bomber,
    Shooter,
    Scout {
        moves_remaining: u32,
        reveal_radius: u32,
    },
    Builder {
        blueprint: StructureKind,
    },
    Monster,
}

/// Base stats of a unit kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    pub hp: u32,
    pub attack_power: u32,
    pub movement_range: u32,
    pub attack_range: u32,
    pub is_combat: bool,
}

impl UnitKind {
    /// Scout with a full move allotment
    pub fn scout() -> Self {
        UnitKind::Scout {
            moves_remaining: SCOUT_MOVES_PER_TURN,
            reveal_radius: SCOUT_REVEAL_RADIUS,
        }
    }

    pub fn builder() -> Self {
        UnitKind::Builder {
            blueprint: BUILDER_BLUEPRINT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnitKind::Soldier => "Soldier",
            UnitKind::Bomber => "Bomber",
            UnitKind::Shooter => "Shooter",
            UnitKind::Scout { .. } => "Scout",
            UnitKind::Builder { .. } => "Builder",
            UnitKind::Monster => "Monster",
        }
    }

    /// Inverse of [`UnitKind::name`], with fresh per-kind state
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Soldier" => Some(UnitKind::Soldier),
            "Bomber" => Some(UnitKind::Bomber),
            "Shooter" => Some(UnitKind::Shooter),
            "Scout" => Some(UnitKind::scout()),
            "Builder" => Some(UnitKind::builder()),
            "Monster" => Some(UnitKind::Monster),
            _ => None,
        }
    }

    pub fn stats(&self) -> UnitStats {
        match self {
            UnitKind::Soldier => UnitStats {
                hp: SOLDIER_HP,
                attack_power: SOLDIER_ATTACK,
                movement_range: SOLDIER_MOVE,
                attack_range: SOLDIER_RANGE,
                is_combat: true,
            },
            UnitKind::Bomber => UnitStats {
                hp: BOMBER_HP,
                attack_power: BOMBER_ATTACK,
                movement_range: BOMBER_MOVE,
                attack_range: BOMBER_RANGE,
                is_combat: true,
            },
            UnitKind::Shooter => UnitStats {
                hp: SHOOTER_HP,
                attack_power: SHOOTER_ATTACK,
                movement_range: SHOOTER_MOVE,
                attack_range: SHOOTER_RANGE,
                is_combat: true,
            },
            UnitKind::Scout { .. } => UnitStats {
                hp: SCOUT_HP,
                attack_power: SCOUT_ATTACK,
                movement_range: SCOUT_MOVE,
                attack_range: SCOUT_RANGE,
                is_combat: true,
            },
            UnitKind::Builder { .. } => UnitStats {
                hp: BUILDER_HP,
                attack_power: 0,
                movement_range: BUILDER_MOVE,
                attack_range: 0,
                is_combat: false,
            },
            UnitKind::Monster => UnitStats {
                hp: MONSTER_HP,
                attack_power: MONSTER_ATTACK,
                movement_range: MONSTER_MOVE,
                attack_range: MONSTER_RANGE,
                is_combat: true,
            },
        }
    }

    pub fn is_monster(&self) -> bool {
        matches!(self, UnitKind::Monster)
    }
}

/// A unit or monster that can occupy a tile and take part in combat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEntity {
    /// Set by the registry on registration
    pub id: EntityId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack_power: u32,
    pub movement_range: u32,
    pub attack_range: u32,
    pub is_combat: bool,
    pub position: Option<HexCoord>,
    pub faction: Faction,
    pub kind: UnitKind,
}

impl CombatEntity {
    /// Placeholder id carried before registration
    pub const UNREGISTERED: EntityId = EntityId(u32::MAX);

    /// New unplaced entity with the kind's base stats
    pub fn new(kind: UnitKind, faction: Faction) -> Self {
        let stats = kind.stats();
        Self {
            id: Self::UNREGISTERED,
            name: kind.name().to_string(),
            hp: stats.hp,
            max_hp: stats.hp,
            attack_power: stats.attack_power,
            movement_range: stats.movement_range,
            attack_range: stats.attack_range,
            is_combat: stats.is_combat,
            position: None,
            faction,
            kind,
        }
    }

    /// Hostile monster, always neutral
    pub fn monster() -> Self {
        Self::new(UnitKind::Monster, Faction::Neutral)
    }

    pub fn with_position(mut self, coord: HexCoord) -> Self {
        self.position = Some(coord);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// Scout moves left this phase (None for other kinds)
    pub fn moves_remaining(&self) -> Option<u32> {
        match self.kind {
            UnitKind::Scout { moves_remaining, .. } => Some(moves_remaining),
            _ => None,
        }
    }
}
