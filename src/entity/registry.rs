//! Authoritative set of live combat entities

use std::collections::BTreeMap;

use crate::core::types::{EntityId, Faction};
use crate::entity::unit::{CombatEntity, UnitKind};
use crate::map::hex::HexCoord;

/// Owns every live unit and monster
///
/// Ids start at 0 and only ever grow; an id freed by `unregister` is never
/// handed out again.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, CombatEntity>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity under the next unused id and return that id
    pub fn register(&mut self, mut entity: CombatEntity) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        entity.id = id;
        tracing::debug!(entity = %id, name = %entity.name, faction = ?entity.faction, "registered");
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity. Unknown ids are ignored.
    pub fn unregister(&mut self, id: EntityId) -> Option<CombatEntity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&CombatEntity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut CombatEntity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Id the next registration will receive
    pub fn peek_next_id(&self) -> EntityId {
        EntityId::new(self.next_id)
    }

    /// Copy of every registered entity, ordered by id
    ///
    /// The copy is detached from the registry, so callers may mutate the
    /// registry while walking it.
    pub fn all_entities(&self) -> Vec<CombatEntity> {
        self.entities.values().cloned().collect()
    }

    /// Ids of every registered entity, ordered
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEntity> {
        self.entities.values()
    }

    /// Ids of the entities fighting for `faction`
    pub fn faction_ids(&self, faction: Faction) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.faction == faction)
            .map(|e| e.id)
            .collect()
    }

    /// Entity standing on `coord`, if any
    pub fn entity_at(&self, coord: HexCoord) -> Option<&CombatEntity> {
        self.entities.values().find(|e| e.position == Some(coord))
    }

    /// A phase opened for `faction`: refill its scouts' move allotment
    ///
    /// Returns the number of scouts refreshed.
    pub fn begin_phase(&mut self, faction: Faction, scout_moves: u32) -> usize {
        let mut refreshed = 0;
        for entity in self.entities.values_mut().filter(|e| e.faction == faction) {
            if let UnitKind::Scout { moves_remaining, .. } = &mut entity.kind {
                *moves_remaining = scout_moves;
                refreshed += 1;
            }
        }
        refreshed
    }
}
