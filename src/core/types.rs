//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for combat entities
///
/// Assigned by the registry at registration time. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Turn counter (starts at 1)
pub type Turn = u32;

/// Side an entity fights for
///
/// Hostile monsters are `Neutral`: they answer to neither the player nor the
/// AI opponent and are fair game for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Faction {
    #[default]
    Player,
    Enemy,
    Neutral,
}

impl Faction {
    /// Are these two factions opposed to each other?
    pub fn is_hostile_to(&self, other: Faction) -> bool {
        *self != other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::new(7).to_string(), "#7");
    }

    #[test]
    fn test_entity_id_ordering() {
        assert!(EntityId::new(1) < EntityId::new(2));
    }

    #[test]
    fn test_faction_hostility() {
        assert!(Faction::Player.is_hostile_to(Faction::Enemy));
        assert!(Faction::Neutral.is_hostile_to(Faction::Player));
        assert!(!Faction::Enemy.is_hostile_to(Faction::Enemy));
    }
}
