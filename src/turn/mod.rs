//! Turn cycle and the enemy phase

pub mod ai;
pub mod cycle;

pub use ai::{AiProgress, EnemyController, GreedyEnemyAi, IdleAi};
pub use cycle::{PhaseOutcome, TurnCycle, TurnPhase};
