//! Action points and score
//!
//! Every mutation publishes the new value so listeners never have to poll.

use serde::{Deserialize, Serialize};

use crate::core::error::ActionError;
use crate::core::types::Faction;
use crate::events::{ActionPointsChanged, EventBus, ScoreChanged};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    action_points: u32,
    score: u32,
    enemy_score: u32,
}

impl ResourceLedger {
    pub fn new(action_points: u32) -> Self {
        Self {
            action_points,
            ..Self::default()
        }
    }

    /// Rebuild from saved values without publishing
    pub fn from_parts(action_points: u32, score: u32, enemy_score: u32) -> Self {
        Self {
            action_points,
            score,
            enemy_score,
        }
    }

    pub fn action_points(&self) -> u32 {
        self.action_points
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn enemy_score(&self) -> u32 {
        self.enemy_score
    }

    /// Spend `amount` action points; returns what is left
    pub fn use_action_points(&mut self, amount: u32, bus: &EventBus) -> Result<u32, ActionError> {
        if amount > self.action_points {
            return Err(ActionError::InsufficientActionPoints {
                needed: amount,
                available: self.action_points,
            });
        }
        self.action_points -= amount;
        bus.publish(&ActionPointsChanged {
            action_points: self.action_points,
        });
        Ok(self.action_points)
    }

    pub fn add_action_points(&mut self, amount: u32, bus: &EventBus) -> u32 {
        self.action_points = self.action_points.saturating_add(amount);
        bus.publish(&ActionPointsChanged {
            action_points: self.action_points,
        });
        self.action_points
    }

    pub fn add_score(&mut self, amount: u32, bus: &EventBus) -> u32 {
        self.score = self.score.saturating_add(amount);
        bus.publish(&ScoreChanged {
            faction: Faction::Player,
            score: self.score,
        });
        self.score
    }

    pub fn add_enemy_score(&mut self, amount: u32, bus: &EventBus) -> u32 {
        self.enemy_score = self.enemy_score.saturating_add(amount);
        bus.publish(&ScoreChanged {
            faction: Faction::Enemy,
            score: self.enemy_score,
        });
        self.enemy_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::handler;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_spend_and_refuse() {
        let bus = EventBus::new();
        let mut ledger = ResourceLedger::new(5);

        assert_eq!(ledger.use_action_points(3, &bus), Ok(2));
        assert_eq!(
            ledger.use_action_points(3, &bus),
            Err(ActionError::InsufficientActionPoints {
                needed: 3,
                available: 2
            })
        );
        assert_eq!(ledger.action_points(), 2);
    }

    #[test]
    fn test_changes_are_published() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(&handler(move |e: &ScoreChanged| {
            sink.borrow_mut().push((e.faction, e.score));
            Ok(())
        }));

        let mut ledger = ResourceLedger::default();
        ledger.add_score(5, &bus);
        ledger.add_enemy_score(2, &bus);
        ledger.add_score(5, &bus);

        assert_eq!(
            *seen.borrow(),
            vec![(Faction::Player, 5), (Faction::Enemy, 2), (Faction::Player, 10)]
        );
    }

    #[test]
    fn test_failed_spend_publishes_nothing() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        bus.subscribe(&handler(move |_: &ActionPointsChanged| {
            *counter.borrow_mut() += 1;
            Ok(())
        }));

        let mut ledger = ResourceLedger::new(1);
        assert!(ledger.use_action_points(2, &bus).is_err());
        assert_eq!(*count.borrow(), 0);
        ledger.add_action_points(3, &bus);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(ledger.action_points(), 4);
    }
}
