//! Save records
//!
//! A [`SaveRecord`] is the flat, JSON-friendly picture of a match at the start
//! of a player phase: the map, what has been revealed, the resource objects
//! still lying around, both sides' units and the ledger. Entity ids are not
//! persisted; restoring registers units afresh.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Faction, Turn};
use crate::economy::ledger::ResourceLedger;
use crate::entity::registry::EntityRegistry;
use crate::entity::unit::{CombatEntity, UnitKind};
use crate::map::fog::FogOfWar;
use crate::map::grid::HexMap;
use crate::map::hex::HexCoord;
use crate::map::tile::{ResourceKind, StructureKind, Terrain, Tile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub q: i32,
    pub r: i32,
    pub terrain: Terrain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordRecord {
    pub q: i32,
    pub r: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub q: i32,
    pub r: i32,
    pub resource: ResourceKind,
}

/// One unit. `name` is the unit kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub name: String,
    pub q: i32,
    pub r: i32,
    pub hp: u32,
    pub movement: u32,
    pub range: u32,
    pub is_combat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub turn: Turn,
    pub player_score: u32,
    pub player_action_points: u32,
    pub enemy_score: u32,
    pub tiles: Vec<TileRecord>,
    pub revealed: Vec<CoordRecord>,
    pub objects: Vec<ObjectRecord>,
    pub player_units: Vec<UnitRecord>,
    /// Enemy units and neutral monsters
    pub enemy_units: Vec<UnitRecord>,
    /// Spawn turns whose hostile had not yet appeared
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_spawns: Vec<Turn>,
}

/// World state rebuilt from a [`SaveRecord`]
#[derive(Debug)]
pub struct RestoredWorld {
    pub turn: Turn,
    pub map: HexMap,
    pub fog: FogOfWar,
    pub registry: EntityRegistry,
    pub ledger: ResourceLedger,
}

impl UnitRecord {
    fn capture(entity: &CombatEntity, coord: HexCoord) -> Self {
        Self {
            name: entity.kind.name().to_string(),
            q: coord.q,
            r: coord.r,
            hp: entity.hp,
            movement: entity.movement_range,
            range: entity.attack_range,
            is_combat: entity.is_combat,
        }
    }

    fn coord(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }

    fn to_entity(&self, side: Faction) -> Result<CombatEntity> {
        let kind = UnitKind::from_name(&self.name)
            .ok_or_else(|| SimError::InvalidSave(format!("unknown unit kind '{}'", self.name)))?;
        let faction = if kind.is_monster() { Faction::Neutral } else { side };

        let mut entity = CombatEntity::new(kind, faction).with_position(self.coord());
        entity.hp = self.hp;
        entity.max_hp = entity.max_hp.max(self.hp);
        entity.movement_range = self.movement;
        entity.attack_range = self.range;
        entity.is_combat = self.is_combat;
        Ok(entity)
    }
}

impl SaveRecord {
    /// Snapshot the world. Unplaced units are not recorded.
    pub fn capture(
        turn: Turn,
        map: &HexMap,
        fog: &FogOfWar,
        registry: &EntityRegistry,
        ledger: &ResourceLedger,
    ) -> Self {
        let tiles = map.tiles();
        let mut record = Self {
            turn,
            player_score: ledger.score(),
            player_action_points: ledger.action_points(),
            enemy_score: ledger.enemy_score(),
            tiles: tiles
                .iter()
                .map(|t| TileRecord {
                    q: t.coord.q,
                    r: t.coord.r,
                    terrain: t.terrain,
                    structure: t.structure,
                })
                .collect(),
            revealed: fog
                .revealed_coords()
                .into_iter()
                .map(|c| CoordRecord { q: c.q, r: c.r })
                .collect(),
            objects: tiles
                .iter()
                .filter_map(|t| {
                    t.resource.map(|resource| ObjectRecord {
                        q: t.coord.q,
                        r: t.coord.r,
                        resource,
                    })
                })
                .collect(),
            player_units: Vec::new(),
            enemy_units: Vec::new(),
            pending_spawns: Vec::new(),
        };

        for entity in registry.iter() {
            let Some(coord) = entity.position else {
                tracing::debug!(id = %entity.id, "unplaced unit left out of save");
                continue;
            };
            let unit = UnitRecord::capture(entity, coord);
            match entity.faction {
                Faction::Player => record.player_units.push(unit),
                Faction::Enemy | Faction::Neutral => record.enemy_units.push(unit),
            }
        }

        record
    }

    /// Rebuild the world. Fails on unknown unit kinds, units off the map or
    /// on blocked tiles, and objects off the map.
    pub fn restore(&self) -> Result<RestoredWorld> {
        if self.tiles.is_empty() {
            return Err(SimError::InvalidSave("save has no tiles".into()));
        }

        let mut map = HexMap::from_tiles(self.tiles.iter().map(|t| {
            let mut tile = Tile::new(HexCoord::new(t.q, t.r), t.terrain);
            tile.structure = t.structure;
            tile
        }));

        for object in &self.objects {
            let coord = HexCoord::new(object.q, object.r);
            let tile = map
                .get_mut(coord)
                .ok_or_else(|| SimError::InvalidSave(format!("object at {coord} is off the map")))?;
            tile.resource = Some(object.resource);
        }

        let mut fog = FogOfWar::new();
        for coord in &self.revealed {
            fog.reveal(HexCoord::new(coord.q, coord.r));
        }

        let mut registry = EntityRegistry::new();
        let units = self
            .player_units
            .iter()
            .map(|u| (u, Faction::Player))
            .chain(self.enemy_units.iter().map(|u| (u, Faction::Enemy)));
        for (unit, side) in units {
            let entity = unit.to_entity(side)?;
            let coord = unit.coord();
            if !map.get(coord).is_some_and(|t| t.can_enter(None)) {
                return Err(SimError::InvalidSave(format!(
                    "{} at {coord} is not on a free walkable tile",
                    unit.name
                )));
            }
            let id = registry.register(entity);
            map.set_occupant(coord, id);
        }

        tracing::info!(turn = self.turn, units = registry.len(), "save restored");
        Ok(RestoredWorld {
            turn: self.turn,
            map,
            fog,
            registry,
            ledger: ResourceLedger::from_parts(
                self.player_action_points,
                self.player_score,
                self.enemy_score,
            ),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        tracing::debug!(path = %path.display(), "save written");
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
