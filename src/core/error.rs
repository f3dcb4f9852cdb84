use thiserror::Error;

use crate::core::types::EntityId;
use crate::economy::tech::Tech;
use crate::map::hex::HexCoord;
use crate::map::tile::StructureKind;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid save: {0}")]
    InvalidSave(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Why an action was rejected
///
/// A rejected action never mutates simulation state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("entity {0} is not on a tile")]
    NotPlaced(EntityId),

    #[error("tile {0} is not on the map")]
    OffMap(HexCoord),

    #[error("tile {0} is not walkable")]
    NotWalkable(HexCoord),

    #[error("tile {coord} is occupied by {occupant}")]
    Occupied { coord: HexCoord, occupant: EntityId },

    #[error("distance {distance} exceeds range {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("distance {distance} is inside minimum range {min}")]
    TooClose { distance: u32, min: u32 },

    #[error("entity {0} has no moves left this turn")]
    NoMovesLeft(EntityId),

    #[error("entity {0} cannot fight")]
    NotCombatCapable(EntityId),

    #[error("entity {0} cannot target itself")]
    SelfTarget(EntityId),

    #[error("entity {0} is not a builder")]
    NotABuilder(EntityId),

    #[error("entity {0} does not belong to the acting side")]
    NotControlled(EntityId),

    #[error("tile {0} has no structure")]
    NoStructure(HexCoord),

    #[error("structure {found:?} on {coord} cannot be upgraded")]
    NotUpgradeable { coord: HexCoord, found: StructureKind },

    #[error("tile {0} has nothing to develop")]
    NoResource(HexCoord),

    #[error("{0:?} is not unlocked")]
    TechLocked(Tech),

    #[error("need {needed} action points, have {available}")]
    InsufficientActionPoints { needed: u32, available: u32 },

    #[error("action not allowed during the current phase")]
    WrongPhase,

    #[error("the game is over")]
    GameOver,
}
