//! Unit archetype stats - all tunable values in one place

use crate::map::tile::StructureKind;

// Soldier: plain melee line unit
pub const SOLDIER_HP: u32 = 10;
pub const SOLDIER_ATTACK: u32 = 4;
pub const SOLDIER_MOVE: u32 = 2;
pub const SOLDIER_RANGE: u32 = 1;

// Bomber: splashes every tile adjacent to its target
pub const BOMBER_HP: u32 = 8;
pub const BOMBER_ATTACK: u32 = 6;
pub const BOMBER_MOVE: u32 = 1;
pub const BOMBER_RANGE: u32 = 2;

// Shooter: long reach, cannot engage adjacent targets
pub const SHOOTER_HP: u32 = 6;
pub const SHOOTER_ATTACK: u32 = 4;
pub const SHOOTER_MOVE: u32 = 2;
pub const SHOOTER_RANGE: u32 = 3;

// Scout: several short hops per turn, reveals fog
pub const SCOUT_HP: u32 = 5;
pub const SCOUT_ATTACK: u32 = 1;
pub const SCOUT_MOVE: u32 = 3;
pub const SCOUT_RANGE: u32 = 1;
pub const SCOUT_MOVES_PER_TURN: u32 = 2;
pub const SCOUT_REVEAL_RADIUS: u32 = 2;

// Builder: non-combat, upgrades structures
pub const BUILDER_HP: u32 = 6;
pub const BUILDER_MOVE: u32 = 2;
pub const BUILDER_BLUEPRINT: StructureKind = StructureKind::Fort;

// Monster: spawned hostile
pub const MONSTER_HP: u32 = 12;
pub const MONSTER_ATTACK: u32 = 3;
pub const MONSTER_MOVE: u32 = 2;
pub const MONSTER_RANGE: u32 = 1;
