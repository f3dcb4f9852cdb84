//! Hexhold - turn-based hex strategy simulation core
//!
//! Axial hex maps with fog of war, a unit roster with a small combat model,
//! a player/enemy turn cycle, periodic hostile spawns and an event bus tying
//! them together.

pub mod core;
pub mod economy;
pub mod entity;
pub mod events;
pub mod map;
pub mod save;
pub mod simulation;
pub mod spawn;
pub mod turn;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::{ActionError, Result, SimError};
pub use crate::simulation::{Simulation, SimulationSummary};
