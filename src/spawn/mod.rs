//! Hostile spawning: the turn-driven scheduler, its deferred tasks and the
//! provider that picks where hostiles appear

pub mod provider;
pub mod scheduler;
pub mod task;

pub use provider::{RandomHostileSpawner, SpawnProvider};
pub use scheduler::{is_spawn_turn, HostileSpawnScheduler};
pub use task::{CancelToken, ScheduledTask, TaskQueue};
