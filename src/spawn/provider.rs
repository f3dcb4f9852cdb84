//! Where hostiles come from

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::entity::registry::EntityRegistry;
use crate::entity::unit::CombatEntity;
use crate::map::grid::HexMap;

/// Produces one hostile, already positioned on the map, or nothing if there
/// is no room. The caller registers it.
pub trait SpawnProvider {
    fn spawn_random_hostile(&mut self, map: &HexMap, registry: &EntityRegistry) -> Option<CombatEntity>;
}

/// Places a monster on a random open tile (seeded, reproducible)
#[derive(Debug, Clone)]
pub struct RandomHostileSpawner {
    rng: ChaCha8Rng,
}

impl RandomHostileSpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl SpawnProvider for RandomHostileSpawner {
    fn spawn_random_hostile(&mut self, map: &HexMap, registry: &EntityRegistry) -> Option<CombatEntity> {
        let open: Vec<_> = map
            .open_tiles()
            .into_iter()
            .filter(|c| registry.entity_at(*c).is_none())
            .collect();
        let coord = *open.choose(&mut self.rng)?;
        Some(CombatEntity::monster().with_position(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Faction;
    use crate::map::hex::HexCoord;

    #[test]
    fn test_spawns_monster_on_open_tile() {
        let map = HexMap::new(3);
        let registry = EntityRegistry::new();
        let mut spawner = RandomHostileSpawner::new(7);

        let monster = spawner.spawn_random_hostile(&map, &registry).unwrap();
        assert!(monster.kind.is_monster());
        assert_eq!(monster.faction, Faction::Neutral);
        assert!(map.contains(monster.position.unwrap()));
    }

    #[test]
    fn test_same_seed_same_tile() {
        let map = HexMap::new(4);
        let registry = EntityRegistry::new();
        let a = RandomHostileSpawner::new(99).spawn_random_hostile(&map, &registry);
        let b = RandomHostileSpawner::new(99).spawn_random_hostile(&map, &registry);
        assert_eq!(a.and_then(|e| e.position), b.and_then(|e| e.position));
    }

    #[test]
    fn test_full_map_yields_nothing() {
        let mut map = HexMap::new(0);
        let mut registry = EntityRegistry::new();
        let id = registry.register(CombatEntity::monster().with_position(HexCoord::new(0, 0)));
        map.set_occupant(HexCoord::new(0, 0), id);

        let mut spawner = RandomHostileSpawner::new(1);
        assert!(spawner.spawn_random_hostile(&map, &registry).is_none());
    }
}
