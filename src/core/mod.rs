pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::SimClock;
pub use config::SimulationConfig;
pub use error::{ActionError, Result, SimError};
pub use types::{EntityId, Faction, Turn};
