//! Turn cycle state machine
//!
//! Player phase -> (end turn) -> enemy phase -> (AI done) -> next turn's
//! player phase, until the turn limit is passed.

use serde::{Deserialize, Serialize};

use crate::core::types::Turn;
use crate::events::{EnemyPhaseStarted, EventBus, TurnLimitReached, TurnStarted};
use crate::turn::ai::EnemyController;

/// Turn phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    #[default]
    Player, // Player issues orders
    Enemy,    // AI opponent acts
    Finished, // Turn limit passed, no further transitions
}

/// Result of asking the cycle to leave the enemy phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Not in the enemy phase; nothing changed
    Ignored,
    /// A new turn started with the player phase
    NextTurn(Turn),
    /// The last turn was completed
    Finished { final_turn: Turn },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnCycle {
    current_turn: Turn,
    phase: TurnPhase,
    max_turns: u32,
}

impl TurnCycle {
    /// Turn 1, player phase
    pub fn new(max_turns: u32) -> Self {
        Self::starting_at(1, max_turns)
    }

    /// Resume at the start of `turn` (used when loading a save)
    pub fn starting_at(turn: Turn, max_turns: u32) -> Self {
        let turn = turn.max(1);
        let phase = if turn > max_turns {
            TurnPhase::Finished
        } else {
            TurnPhase::Player
        };
        Self {
            current_turn: turn,
            phase,
            max_turns,
        }
    }

    pub fn current_turn(&self) -> Turn {
        self.current_turn
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, TurnPhase::Finished)
    }

    /// Player ends their turn
    ///
    /// Only acts during the player phase; a second call while the enemy is
    /// moving is ignored. Returns true if the enemy phase began.
    pub fn end_turn(&mut self, bus: &EventBus, ai: &mut dyn EnemyController) -> bool {
        if self.phase != TurnPhase::Player {
            tracing::debug!(turn = self.current_turn, phase = ?self.phase, "end turn ignored");
            return false;
        }

        self.phase = TurnPhase::Enemy;
        tracing::info!(turn = self.current_turn, "enemy phase");
        bus.publish(&EnemyPhaseStarted {
            turn: self.current_turn,
        });
        ai.begin_turn(self.current_turn);
        true
    }

    /// The AI finished its phase
    pub fn complete_enemy_phase(&mut self, bus: &EventBus) -> PhaseOutcome {
        if self.phase != TurnPhase::Enemy {
            tracing::debug!(turn = self.current_turn, phase = ?self.phase, "enemy completion ignored");
            return PhaseOutcome::Ignored;
        }

        self.current_turn += 1;
        if self.current_turn > self.max_turns {
            self.phase = TurnPhase::Finished;
            tracing::info!(final_turn = self.max_turns, "turn limit reached");
            bus.publish(&TurnLimitReached {
                final_turn: self.max_turns,
            });
            return PhaseOutcome::Finished {
                final_turn: self.max_turns,
            };
        }

        self.phase = TurnPhase::Player;
        tracing::info!(turn = self.current_turn, "turn started");
        bus.publish(&TurnStarted {
            turn: self.current_turn,
        });
        PhaseOutcome::NextTurn(self.current_turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::handler;
    use crate::turn::ai::IdleAi;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_initial_state() {
        let cycle = TurnCycle::new(30);
        assert_eq!(cycle.current_turn(), 1);
        assert_eq!(cycle.phase(), TurnPhase::Player);
    }

    #[test]
    fn test_end_turn_enters_enemy_phase() {
        let bus = EventBus::new();
        let mut ai = IdleAi::default();
        let mut cycle = TurnCycle::new(30);

        assert!(cycle.end_turn(&bus, &mut ai));
        assert_eq!(cycle.phase(), TurnPhase::Enemy);
        assert_eq!(ai.turns_started, vec![1]);
    }

    #[test]
    fn test_double_end_turn_is_noop() {
        let bus = EventBus::new();
        let phases = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&phases);
        bus.subscribe(&handler(move |_: &EnemyPhaseStarted| {
            *counter.borrow_mut() += 1;
            Ok(())
        }));

        let mut ai = IdleAi::default();
        let mut cycle = TurnCycle::new(30);
        cycle.end_turn(&bus, &mut ai);
        assert!(!cycle.end_turn(&bus, &mut ai));
        assert_eq!(*phases.borrow(), 1);
        assert_eq!(ai.turns_started.len(), 1);
    }

    #[test]
    fn test_enemy_completion_advances_turn() {
        let bus = EventBus::new();
        let started = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&started);
        bus.subscribe(&handler(move |e: &TurnStarted| {
            sink.borrow_mut().push(e.turn);
            Ok(())
        }));

        let mut ai = IdleAi::default();
        let mut cycle = TurnCycle::new(30);
        cycle.end_turn(&bus, &mut ai);

        assert_eq!(cycle.complete_enemy_phase(&bus), PhaseOutcome::NextTurn(2));
        assert_eq!(cycle.current_turn(), 2);
        assert_eq!(cycle.phase(), TurnPhase::Player);
        assert_eq!(*started.borrow(), vec![2]);
    }

    #[test]
    fn test_completion_outside_enemy_phase_ignored() {
        let bus = EventBus::new();
        let mut cycle = TurnCycle::new(30);
        assert_eq!(cycle.complete_enemy_phase(&bus), PhaseOutcome::Ignored);
        assert_eq!(cycle.current_turn(), 1);
    }

    #[test]
    fn test_turn_limit_is_terminal() {
        let bus = EventBus::new();
        let mut ai = IdleAi::default();
        let mut cycle = TurnCycle::new(30);

        for _ in 1..30 {
            cycle.end_turn(&bus, &mut ai);
            cycle.complete_enemy_phase(&bus);
        }
        assert_eq!(cycle.current_turn(), 30);

        cycle.end_turn(&bus, &mut ai);
        assert_eq!(
            cycle.complete_enemy_phase(&bus),
            PhaseOutcome::Finished { final_turn: 30 }
        );
        assert!(cycle.is_finished());

        assert!(!cycle.end_turn(&bus, &mut ai));
        assert_eq!(cycle.complete_enemy_phase(&bus), PhaseOutcome::Ignored);
        assert_eq!(cycle.phase(), TurnPhase::Finished);
        assert_eq!(cycle.current_turn(), 31);
    }

    #[test]
    fn test_starting_at_past_limit_is_finished() {
        assert!(TurnCycle::starting_at(31, 30).is_finished());
        assert_eq!(TurnCycle::starting_at(0, 30).current_turn(), 1);
    }
}
