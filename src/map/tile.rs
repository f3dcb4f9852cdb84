//! Tiles, terrain, structures and resource objects

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;
use crate::economy::tech::Tech;
use crate::map::hex::HexCoord;

/// Base terrain of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Grass,
    Forest,
    Sand,
    Water,    // Impassable
    Mountain, // Impassable
}

impl Terrain {
    /// Can units stand on this terrain?
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Terrain::Water | Terrain::Mountain)
    }
}

/// Structures that can stand on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    Camp,
    Fort,
    Farm,
}

impl StructureKind {
    /// The structure this one is built from, if it is an upgrade
    pub fn predecessor(&self) -> Option<StructureKind> {
        match self {
            StructureKind::Fort => Some(StructureKind::Camp),
            StructureKind::Camp | StructureKind::Farm => None,
        }
    }
}

/// Harvestable objects lying on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Fish,
    MetalScraps,
    Fruit,
}

impl ResourceKind {
    /// Tech that must be unlocked before this resource can be developed
    pub fn required_tech(&self) -> Option<Tech> {
        match self {
            ResourceKind::Fish => Some(Tech::Fishing),
            ResourceKind::MetalScraps => Some(Tech::MetalScraps),
            ResourceKind::Fruit => None,
        }
    }
}

/// A single hex on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub terrain: Terrain,
    pub occupant: Option<EntityId>,
    pub structure: Option<StructureKind>,
    pub resource: Option<ResourceKind>,
}

impl Tile {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            occupant: None,
            structure: None,
            resource: None,
        }
    }

    pub fn is_walkable(&self) -> bool {
        self.terrain.is_walkable()
    }

    /// Walkable and free for `entity` to enter
    pub fn can_enter(&self, entity: Option<EntityId>) -> bool {
        self.is_walkable() && (self.occupant.is_none() || self.occupant == entity)
    }
}
