//! Fog of war
//!
//! Revealing is monotonic: once a tile is revealed it stays revealed for the
//! rest of the match. There is deliberately no way to hide a tile again.

use ahash::AHashSet;

use crate::map::grid::HexMap;
use crate::map::hex::HexCoord;

/// Revealed/hidden flag per tile
#[derive(Debug, Clone, Default)]
pub struct FogOfWar {
    revealed: AHashSet<HexCoord>,
}

impl FogOfWar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Has this tile been revealed?
    pub fn is_revealed(&self, coord: HexCoord) -> bool {
        self.revealed.contains(&coord)
    }

    /// Reveal one tile. Returns true if it was hidden before.
    pub fn reveal(&mut self, coord: HexCoord) -> bool {
        self.revealed.insert(coord)
    }

    /// Reveal every on-map tile within `radius` of `center`
    ///
    /// Returns only the tiles that were hidden before, in stable order.
    pub fn reveal_around(&mut self, map: &HexMap, center: HexCoord, radius: u32) -> Vec<HexCoord> {
        let mut newly: Vec<HexCoord> = center
            .hexes_in_range(radius)
            .into_iter()
            .filter(|c| map.contains(*c))
            .filter(|c| self.revealed.insert(*c))
            .collect();
        newly.sort();
        newly
    }

    /// All revealed coordinates, sorted
    pub fn revealed_coords(&self) -> Vec<HexCoord> {
        let mut coords: Vec<HexCoord> = self.revealed.iter().copied().collect();
        coords.sort();
        coords
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}
