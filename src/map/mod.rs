//! Hex map: coordinates, tiles, fog of war

pub mod fog;
pub mod grid;
pub mod hex;
pub mod tile;

pub use fog::FogOfWar;
pub use grid::HexMap;
pub use hex::{distance, HexCoord};
pub use tile::{ResourceKind, StructureKind, Terrain, Tile};
