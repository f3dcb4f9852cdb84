//! Action points, score and tech-gated tile development

pub mod development;
pub mod ledger;
pub mod tech;

pub use development::{develop_tile, DevelopmentRules};
pub use ledger::ResourceLedger;
pub use tech::{Tech, TechGate, TechTree};
