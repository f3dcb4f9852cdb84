//! Enemy AI collaborator
//!
//! The turn cycle hands control to an [`EnemyController`] when the enemy
//! phase begins. The simulation then calls [`EnemyController::step`] from its
//! update loop until the controller reports it is finished.

use std::collections::VecDeque;

use crate::core::types::{EntityId, Faction, Turn};
use crate::entity::combat::Battlefield;
use crate::map::hex::HexCoord;

/// Whether the AI still has work this phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProgress {
    Working,
    Finished,
}

/// Trait for enemy phase implementations
pub trait EnemyController {
    /// Called once when the enemy phase of `turn` begins
    fn begin_turn(&mut self, turn: Turn);

    /// Perform one slice of work on the battlefield
    fn step(&mut self, field: &mut Battlefield<'_>) -> AiProgress;
}

/// Does nothing and finishes immediately. Records the turns it was handed.
#[derive(Debug, Default)]
pub struct IdleAi {
    pub turns_started: Vec<Turn>,
}

impl EnemyController for IdleAi {
    fn begin_turn(&mut self, turn: Turn) {
        self.turns_started.push(turn);
    }

    fn step(&mut self, _field: &mut Battlefield<'_>) -> AiProgress {
        AiProgress::Finished
    }
}

/// Acts with one unit per step: attack the nearest hostile in range, or walk
/// toward it.
#[derive(Debug)]
pub struct GreedyEnemyAi {
    faction: Faction,
    queue: VecDeque<EntityId>,
    planned: bool,
}

impl GreedyEnemyAi {
    pub fn new(faction: Faction) -> Self {
        Self {
            faction,
            queue: VecDeque::new(),
            planned: false,
        }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// Placed hostiles ordered by distance from `from`, ties by id
    fn targets_by_distance(&self, field: &Battlefield<'_>, from: HexCoord) -> Vec<(u32, EntityId, HexCoord)> {
        let mut targets: Vec<_> = field
            .registry
            .iter()
            .filter(|e| self.faction.is_hostile_to(e.faction))
            .filter_map(|e| e.position.map(|pos| (from.distance(&pos), e.id, pos)))
            .collect();
        targets.sort();
        targets
    }

    fn try_attack(&self, field: &mut Battlefield<'_>, unit: EntityId, from: HexCoord) -> bool {
        for (_, target, _) in self.targets_by_distance(field, from) {
            if field.validate_attack(unit, target).is_ok() {
                return field.attack(unit, target).is_ok();
            }
        }
        false
    }

    fn act(&self, field: &mut Battlefield<'_>, unit: EntityId) {
        let Some(entity) = field.registry.get(unit) else {
            return; // died earlier this phase
        };
        let Some(from) = entity.position else {
            return;
        };
        let movement = entity.movement_range;
        let preferred = entity.attack_range.max(1);

        if !entity.is_combat {
            return;
        }
        if self.try_attack(field, unit, from) {
            return;
        }

        let Some(&(current, _, goal)) = self.targets_by_distance(field, from).first() else {
            return;
        };

        // Closest reachable tile to the preferred engagement distance
        let best = from
            .hexes_in_range(movement)
            .into_iter()
            .filter(|c| *c != from)
            .filter(|c| field.validate_move(unit, *c).is_ok())
            .map(|c| (c.distance(&goal).abs_diff(preferred), c))
            .min();

        if let Some((score, dest)) = best {
            if score < current.abs_diff(preferred) && field.move_unit(unit, dest).is_ok() {
                self.try_attack(field, unit, dest);
            }
        }
    }
}

impl EnemyController for GreedyEnemyAi {
    fn begin_turn(&mut self, turn: Turn) {
        tracing::debug!(turn, faction = ?self.faction, "AI turn begins");
        self.queue.clear();
        self.planned = false;
    }

    fn step(&mut self, field: &mut Battlefield<'_>) -> AiProgress {
        if !self.planned {
            self.queue = field.registry.faction_ids(self.faction).into();
            self.planned = true;
        }

        match self.queue.pop_front() {
            Some(unit) => {
                self.act(field, unit);
                if self.queue.is_empty() {
                    self.planned = false;
                    AiProgress::Finished
                } else {
                    AiProgress::Working
                }
            }
            None => {
                self.planned = false;
                AiProgress::Finished
            }
        }
    }
}
