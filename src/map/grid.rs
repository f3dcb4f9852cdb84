//! Hexagonal map: tile storage, occupancy and generation

use ahash::AHashMap;
use rand::Rng;

use crate::core::types::EntityId;
use crate::map::hex::HexCoord;
use crate::map::tile::{ResourceKind, Terrain, Tile};

/// A hexagon-shaped map of tiles centered on (0, 0)
#[derive(Debug, Clone)]
pub struct HexMap {
    tiles: AHashMap<HexCoord, Tile>,
    radius: u32,
}

impl HexMap {
    /// Create an open grass map of the given radius
    pub fn new(radius: u32) -> Self {
        let tiles = HexCoord::default()
            .hexes_in_range(radius)
            .into_iter()
            .map(|coord| (coord, Tile::new(coord, Terrain::Grass)))
            .collect();
        Self { tiles, radius }
    }

    /// Build a map from explicit tiles (used when restoring a save)
    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>) -> Self {
        let tiles: AHashMap<HexCoord, Tile> =
            tiles.into_iter().map(|tile| (tile.coord, tile)).collect();
        let radius = tiles
            .keys()
            .map(|c| c.distance(&HexCoord::default()))
            .max()
            .unwrap_or(0);
        Self { tiles, radius }
    }

    /// Generate a random map. The center and its neighbors are always grass.
    pub fn generate<R: Rng>(radius: u32, rng: &mut R) -> Self {
        let mut map = Self::new(radius);
        let center = HexCoord::default();

        for coord in map.coords() {
            if coord.distance(&center) <= 1 {
                continue;
            }
            let terrain = match rng.gen_range(0..100) {
                0..=49 => Terrain::Grass,
                50..=69 => Terrain::Forest,
                70..=79 => Terrain::Sand,
                80..=91 => Terrain::Water,
                _ => Terrain::Mountain,
            };
            let resource = match terrain {
                Terrain::Water if rng.gen_bool(0.3) => Some(ResourceKind::Fish),
                Terrain::Sand | Terrain::Grass if rng.gen_bool(0.08) => {
                    Some(ResourceKind::MetalScraps)
                }
                Terrain::Forest if rng.gen_bool(0.15) => Some(ResourceKind::Fruit),
                _ => None,
            };
            if let Some(tile) = map.get_mut(coord) {
                tile.terrain = terrain;
                tile.resource = resource;
            }
        }

        map
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn get(&self, coord: HexCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn get_mut(&mut self, coord: HexCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    /// All coordinates in a stable (sorted) order
    pub fn coords(&self) -> Vec<HexCoord> {
        let mut coords: Vec<HexCoord> = self.tiles.keys().copied().collect();
        coords.sort();
        coords
    }

    /// All tiles in a stable (sorted) order
    pub fn tiles(&self) -> Vec<&Tile> {
        let mut tiles: Vec<&Tile> = self.tiles.values().collect();
        tiles.sort_by_key(|t| t.coord);
        tiles
    }

    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.terrain = terrain;
        }
    }

    pub fn is_walkable(&self, coord: HexCoord) -> bool {
        self.get(coord).is_some_and(Tile::is_walkable)
    }

    pub fn occupant(&self, coord: HexCoord) -> Option<EntityId> {
        self.get(coord).and_then(|t| t.occupant)
    }

    pub fn set_occupant(&mut self, coord: HexCoord, id: EntityId) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.occupant = Some(id);
        }
    }

    /// Clear occupancy, but only if `id` is the one standing there
    pub fn clear_occupant(&mut self, coord: HexCoord, id: EntityId) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            if tile.occupant == Some(id) {
                tile.occupant = None;
            }
        }
    }

    /// Walkable tiles nobody stands on, in stable order
    pub fn open_tiles(&self) -> Vec<HexCoord> {
        self.tiles()
            .into_iter()
            .filter(|t| t.can_enter(None))
            .map(|t| t.coord)
            .collect()
    }
}
