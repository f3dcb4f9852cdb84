//! Movement and attack resolution
//!
//! Every action validates first and mutates second: a rejected action
//! returns an [`ActionError`] and leaves map, fog and registry untouched.

use crate::core::config::SimulationConfig;
use crate::core::error::ActionError;
use crate::core::types::{EntityId, Faction};
use crate::entity::registry::EntityRegistry;
use crate::entity::unit::{CombatEntity, UnitKind};
use crate::events::{EntityDied, EventBus, FogRevealed, HostileKilled, UnitAttacked, UnitDamaged, UnitMoved};
use crate::map::fog::FogOfWar;
use crate::map::grid::HexMap;
use crate::map::hex::HexCoord;

/// Tunable combat numbers taken from the config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatRules {
    pub shooter_min_range: u32,
    pub splash_divisor: u32,
    pub scout_moves_per_turn: u32,
}

impl From<&SimulationConfig> for CombatRules {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            shooter_min_range: config.shooter_min_range,
            splash_divisor: config.splash_divisor.max(1),
            scout_moves_per_turn: config.scout_moves_per_turn,
        }
    }
}

impl Default for CombatRules {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl CombatRules {
    /// Secondary damage a bomber deals to tiles around its target
    pub fn splash_damage(&self, attack_power: u32) -> u32 {
        attack_power / self.splash_divisor
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: HexCoord,
    pub to: HexCoord,
    /// Tiles revealed by the pre-move hook
    pub revealed: Vec<HexCoord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashHit {
    pub id: EntityId,
    pub damage: u32,
    pub killed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    pub damage: u32,
    pub target_killed: bool,
    pub splash: Vec<SplashHit>,
}

/// Mutable view over everything an action touches
pub struct Battlefield<'a> {
    pub map: &'a mut HexMap,
    pub fog: &'a mut FogOfWar,
    pub registry: &'a mut EntityRegistry,
    pub bus: &'a EventBus,
    pub rules: CombatRules,
}

impl<'a> Battlefield<'a> {
    pub fn new(
        map: &'a mut HexMap,
        fog: &'a mut FogOfWar,
        registry: &'a mut EntityRegistry,
        bus: &'a EventBus,
        rules: CombatRules,
    ) -> Self {
        Self {
            map,
            fog,
            registry,
            bus,
            rules,
        }
    }

    fn entity(&self, id: EntityId) -> Result<&CombatEntity, ActionError> {
        self.registry.get(id).ok_or(ActionError::UnknownEntity(id))
    }

    /// Check a move without performing it. Returns the origin tile.
    pub fn validate_move(&self, id: EntityId, target: HexCoord) -> Result<HexCoord, ActionError> {
        let entity = self.entity(id)?;
        let from = entity.position.ok_or(ActionError::NotPlaced(id))?;
        let tile = self.map.get(target).ok_or(ActionError::OffMap(target))?;

        if !tile.is_walkable() {
            return Err(ActionError::NotWalkable(target));
        }
        if let Some(occupant) = tile.occupant.filter(|o| *o != id) {
            return Err(ActionError::Occupied {
                coord: target,
                occupant,
            });
        }

        let distance = from.distance(&target);
        if distance > entity.movement_range {
            return Err(ActionError::OutOfRange {
                distance,
                range: entity.movement_range,
            });
        }

        if entity.moves_remaining() == Some(0) {
            return Err(ActionError::NoMovesLeft(id));
        }

        Ok(from)
    }

    /// Move an entity to `target`
    pub fn move_unit(&mut self, id: EntityId, target: HexCoord) -> Result<MoveOutcome, ActionError> {
        let from = self.validate_move(id, target).map_err(|err| {
            tracing::warn!(entity = %id, to = %target, error = %err, "move rejected");
            err
        })?;

        let revealed = self.before_move(id, from);

        if let Some(entity) = self.registry.get_mut(id) {
            entity.position = Some(target);
            if let UnitKind::Scout {
                moves_remaining, ..
            } = &mut entity.kind
            {
                *moves_remaining = moves_remaining.saturating_sub(1);
            }
        }
        self.map.clear_occupant(from, id);
        self.map.set_occupant(target, id);

        tracing::debug!(entity = %id, %from, to = %target, "moved");
        self.bus.publish(&UnitMoved {
            id,
            from,
            to: target,
        });
        if !revealed.is_empty() {
            self.bus.publish(&FogRevealed {
                coords: revealed.clone(),
            });
        }

        Ok(MoveOutcome {
            from,
            to: target,
            revealed,
        })
    }

    /// Pre-move hook. Player scouts reveal fog around the tile they leave.
    fn before_move(&mut self, id: EntityId, origin: HexCoord) -> Vec<HexCoord> {
        let Some((kind, faction)) = self.registry.get(id).map(|e| (e.kind, e.faction)) else {
            return Vec::new();
        };
        match kind {
            UnitKind::Scout { reveal_radius, .. } if faction == Faction::Player => {
                self.fog.reveal_around(&*self.map, origin, reveal_radius)
            }
            _ => Vec::new(),
        }
    }

    /// Check an attack without performing it. Returns the hex distance.
    pub fn validate_attack(&self, attacker: EntityId, target: EntityId) -> Result<u32, ActionError> {
        if attacker == target {
            return Err(ActionError::SelfTarget(attacker));
        }
        let source = self.entity(attacker)?;
        let victim = self.entity(target)?;

        if !source.is_combat {
            return Err(ActionError::NotCombatCapable(attacker));
        }
        let from = source.position.ok_or(ActionError::NotPlaced(attacker))?;
        let to = victim.position.ok_or(ActionError::NotPlaced(target))?;

        let distance = from.distance(&to);
        if distance > source.attack_range {
            return Err(ActionError::OutOfRange {
                distance,
                range: source.attack_range,
            });
        }

        if matches!(source.kind, UnitKind::Shooter) && distance < self.rules.shooter_min_range {
            return Err(ActionError::TooClose {
                distance,
                min: self.rules.shooter_min_range,
            });
        }

        Ok(distance)
    }

    /// Resolve an attack, including bomber splash
    pub fn attack(&mut self, attacker: EntityId, target: EntityId) -> Result<AttackOutcome, ActionError> {
        self.validate_attack(attacker, target).map_err(|err| {
            tracing::warn!(%attacker, %target, error = %err, "attack rejected");
            err
        })?;

        let (power, kind) = {
            let source = self.entity(attacker)?;
            (source.attack_power, source.kind)
        };
        let center = self.entity(target)?.position.ok_or(ActionError::NotPlaced(target))?;

        let target_killed = self.take_damage(target, power);

        let mut splash = Vec::new();
        if matches!(kind, UnitKind::Bomber) {
            let damage = self.rules.splash_damage(power);
            for bystander in self.registry.all_entities() {
                if bystander.id == attacker || bystander.id == target {
                    continue;
                }
                let Some(position) = bystander.position else {
                    continue;
                };
                if position.distance(&center) == 1 {
                    let killed = self.take_damage(bystander.id, damage);
                    splash.push(SplashHit {
                        id: bystander.id,
                        damage,
                        killed,
                    });
                }
            }
        }

        tracing::debug!(%attacker, %target, damage = power, splash = splash.len(), "attack resolved");
        self.bus.publish(&UnitAttacked {
            attacker,
            target,
            damage: power,
            splash_hits: splash.len(),
        });

        Ok(AttackOutcome {
            damage: power,
            target_killed,
            splash,
        })
    }

    /// Apply damage, clamping hp at 0. Returns true if the entity died.
    pub fn take_damage(&mut self, id: EntityId, amount: u32) -> bool {
        let Some(entity) = self.registry.get_mut(id) else {
            return false;
        };
        entity.hp = entity.hp.saturating_sub(amount);
        let remaining_hp = entity.hp;

        self.bus.publish(&UnitDamaged {
            id,
            amount,
            remaining_hp,
        });

        if remaining_hp == 0 {
            self.die(id);
            true
        } else {
            false
        }
    }

    /// Remove a dead entity and announce it
    ///
    /// The only place death notifications are published.
    pub fn die(&mut self, id: EntityId) -> Option<CombatEntity> {
        let entity = self.registry.unregister(id)?;
        if let Some(coord) = entity.position {
            self.map.clear_occupant(coord, id);
        }

        tracing::info!(entity = %id, name = %entity.name, faction = ?entity.faction, "died");
        self.bus.publish(&EntityDied {
            id,
            name: entity.name.clone(),
            faction: entity.faction,
            coord: entity.position,
        });
        if entity.kind.is_monster() {
            self.bus.publish(&HostileKilled { id });
        }

        Some(entity)
    }
}
