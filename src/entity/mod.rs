//! Combat entities: units, monsters, the registry that owns them and the
//! rules that move them and make them fight

pub mod builder;
pub mod combat;
pub mod constants;
pub mod registry;
pub mod unit;

pub use combat::{AttackOutcome, Battlefield, CombatRules, MoveOutcome, SplashHit};
pub use registry::EntityRegistry;
pub use unit::{CombatEntity, UnitKind, UnitStats};
