//! Builder upgrades: replace the structure under a builder with its blueprint

use crate::core::error::ActionError;
use crate::core::types::EntityId;
use crate::entity::combat::Battlefield;
use crate::entity::unit::UnitKind;
use crate::events::StructureUpgraded;

impl Battlefield<'_> {
    /// Upgrade the structure on the builder's own tile
    ///
    /// The tile must already hold the blueprint's predecessor (a Camp for a
    /// Fort blueprint). The old structure is removed and the new one stands on
    /// the same tile.
    pub fn upgrade_structure(&mut self, builder: EntityId) -> Result<StructureUpgraded, ActionError> {
        let result = self.validate_upgrade(builder);
        let upgrade = result.map_err(|err| {
            tracing::warn!(%builder, error = %err, "upgrade rejected");
            err
        })?;

        if let Some(tile) = self.map.get_mut(upgrade.coord) {
            tile.structure = Some(upgrade.to);
        }

        tracing::info!(%builder, coord = %upgrade.coord, from = ?upgrade.from, to = ?upgrade.to, "structure upgraded");
        self.bus.publish(&upgrade);
        Ok(upgrade)
    }

    fn validate_upgrade(&self, builder: EntityId) -> Result<StructureUpgraded, ActionError> {
        let entity = self
            .registry
            .get(builder)
            .ok_or(ActionError::UnknownEntity(builder))?;
        let UnitKind::Builder { blueprint } = entity.kind else {
            return Err(ActionError::NotABuilder(builder));
        };
        let coord = entity.position.ok_or(ActionError::NotPlaced(builder))?;
        let tile = self.map.get(coord).ok_or(ActionError::OffMap(coord))?;
        let existing = tile.structure.ok_or(ActionError::NoStructure(coord))?;

        if blueprint.predecessor() != Some(existing) {
            return Err(ActionError::NotUpgradeable {
                coord,
                found: existing,
            });
        }

        Ok(StructureUpgraded {
            builder,
            coord,
            from: existing,
            to: blueprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::error::ActionError;
    use crate::core::types::{EntityId, Faction};
    use crate::entity::combat::{Battlefield, CombatRules};
    use crate::entity::registry::EntityRegistry;
    use crate::entity::unit::{CombatEntity, UnitKind};
    use crate::events::{handler, EventBus, StructureUpgraded};
    use crate::map::{FogOfWar, HexCoord, HexMap, StructureKind};

    fn setup(structure: Option<StructureKind>, kind: UnitKind) -> (HexMap, EntityRegistry, EntityId) {
        let mut map = HexMap::new(2);
        let coord = HexCoord::new(1, 0);
        if let Some(tile) = map.get_mut(coord) {
            tile.structure = structure;
        }
        let mut registry = EntityRegistry::new();
        let id = registry.register(CombatEntity::new(kind, Faction::Player).with_position(coord));
        map.set_occupant(coord, id);
        (map, registry, id)
    }

    #[test]
    fn test_camp_upgrades_to_fort() {
        let (mut map, mut registry, builder) = setup(Some(StructureKind::Camp), UnitKind::builder());
        let mut fog = FogOfWar::new();
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(&handler(move |e: &StructureUpgraded| {
            sink.borrow_mut().push(*e);
            Ok(())
        }));

        let mut field = Battlefield::new(&mut map, &mut fog, &mut registry, &bus, CombatRules::default());
        let upgrade = field.upgrade_structure(builder).unwrap();

        assert_eq!(upgrade.from, StructureKind::Camp);
        assert_eq!(upgrade.to, StructureKind::Fort);
        let tile = map.get(HexCoord::new(1, 0)).unwrap();
        assert_eq!(tile.structure, Some(StructureKind::Fort));
        assert_eq!(tile.occupant, Some(builder));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_upgrade_rejections() {
        let mut fog = FogOfWar::new();
        let bus = EventBus::new();

        let (mut map, mut registry, builder) = setup(None, UnitKind::builder());
        let mut field = Battlefield::new(&mut map, &mut fog, &mut registry, &bus, CombatRules::default());
        assert_eq!(
            field.upgrade_structure(builder),
            Err(ActionError::NoStructure(HexCoord::new(1, 0)))
        );

        let (mut map, mut registry, builder) = setup(Some(StructureKind::Farm), UnitKind::builder());
        let mut field = Battlefield::new(&mut map, &mut fog, &mut registry, &bus, CombatRules::default());
        assert!(matches!(
            field.upgrade_structure(builder),
            Err(ActionError::NotUpgradeable { found: StructureKind::Farm, .. })
        ));
        assert_eq!(map.get(HexCoord::new(1, 0)).unwrap().structure, Some(StructureKind::Farm));

        let (mut map, mut registry, soldier) = setup(Some(StructureKind::Camp), UnitKind::Soldier);
        let mut field = Battlefield::new(&mut map, &mut fog, &mut registry, &bus, CombatRules::default());
        assert_eq!(field.upgrade_structure(soldier), Err(ActionError::NotABuilder(soldier)));
    }

    #[test]
    fn test_unplaced_builder_rejected() {
        let mut map = HexMap::new(1);
        let mut fog = FogOfWar::new();
        let bus = EventBus::new();
        let mut registry = EntityRegistry::new();
        let builder = registry.register(CombatEntity::new(UnitKind::builder(), Faction::Player));

        let mut field = Battlefield::new(&mut map, &mut fog, &mut registry, &bus, CombatRules::default());
        assert_eq!(field.upgrade_structure(builder), Err(ActionError::NotPlaced(builder)));
    }
}
