//! Simulation configuration with documented constants
//!
//! Every tunable number lives here. Configs load from TOML; any key left out
//! of the file keeps its default.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Last playable turn. Completing this turn ends the match.
    pub max_turns: u32,

    /// Radius of the generated hexagonal map (in hexes, from the center)
    pub map_radius: u32,

    /// Seed for map generation and hostile placement
    pub seed: u64,

    /// Action points the player starts with
    pub starting_action_points: u32,

    /// Action points granted at the start of every new turn
    pub action_points_per_turn: u32,

    /// Moves a scout may make in one phase
    pub scout_moves_per_turn: u32,

    /// Shooters cannot engage targets closer than this
    pub shooter_min_range: u32,

    /// Bomber splash deals `attack_power / splash_divisor` (rounded down)
    pub splash_divisor: u32,

    /// Score for each opposing unit destroyed (either side)
    pub kill_score: u32,

    pub spawn: SpawnConfig,
    pub development: DevelopmentConfig,
}

/// Cadence of hostile spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// First turn on which a hostile appears (preceded by a warning)
    pub first_turn: u32,

    /// Turns between spawns after the first one
    pub interval: u32,

    /// Simulation time between the warning and the first spawn
    pub warning_delay_ms: u64,
}

/// Costs and rewards of tile development
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentConfig {
    pub ap_cost: u32,
    pub score_reward: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_turns: 30,
            map_radius: 6,
            seed: 12345,
            starting_action_points: 5,
            action_points_per_turn: 3,
            scout_moves_per_turn: 2,
            shooter_min_range: 2,
            splash_divisor: 2,
            kill_score: 1,
            spawn: SpawnConfig::default(),
            development: DevelopmentConfig::default(),
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            first_turn: 10,
            interval: 4,
            warning_delay_ms: 2000,
        }
    }
}

impl Default for DevelopmentConfig {
    fn default() -> Self {
        Self {
            ap_cost: 2,
            score_reward: 5,
        }
    }
}

impl SpawnConfig {
    pub fn warning_delay(&self) -> Duration {
        Duration::from_millis(self.warning_delay_ms)
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading simulation config");
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            return Err(SimError::InvalidConfig("max_turns must be at least 1".into()));
        }
        if self.map_radius == 0 {
            return Err(SimError::InvalidConfig("map_radius must be at least 1".into()));
        }
        if self.splash_divisor == 0 {
            return Err(SimError::InvalidConfig("splash_divisor must be positive".into()));
        }
        if self.spawn.interval == 0 {
            return Err(SimError::InvalidConfig("spawn.interval must be positive".into()));
        }
        // Turn 1 begins without a turn-start notification
        if self.spawn.first_turn < 2 {
            return Err(SimError::InvalidConfig(
                "spawn.first_turn must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_defaults_match_match_rules() {
        let config = SimulationConfig::default();
        assert_eq!(config.max_turns, 30);
        assert_eq!(config.scout_moves_per_turn, 2);
        assert_eq!(config.shooter_min_range, 2);
        assert_eq!(config.spawn.first_turn, 10);
        assert_eq!(config.spawn.interval, 4);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            max_turns = 12
            [spawn]
            interval = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.max_turns, 12);
        assert_eq!(config.spawn.interval, 3);
        assert_eq!(config.spawn.first_turn, 10);
        assert_eq!(config.development.ap_cost, 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = SimulationConfig::from_toml_str("splash_divisor = 0");
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));

        let result = SimulationConfig::from_toml_str("max_turns = \"many\"");
        assert!(matches!(result, Err(SimError::TomlError(_))));
    }

    #[test]
    fn test_first_spawn_turn_must_follow_a_turn_start() {
        for toml in ["[spawn]\nfirst_turn = 0", "[spawn]\nfirst_turn = 1"] {
            let result = SimulationConfig::from_toml_str(toml);
            assert!(matches!(result, Err(SimError::InvalidConfig(_))), "{toml}");
        }
        let config = SimulationConfig::from_toml_str("[spawn]\nfirst_turn = 2").unwrap();
        assert_eq!(config.spawn.first_turn, 2);
    }

    #[test]
    fn test_warning_delay_conversion() {
        let spawn = SpawnConfig {
            warning_delay_ms: 1500,
            ..SpawnConfig::default()
        };
        assert_eq!(spawn.warning_delay(), Duration::from_millis(1500));
    }
}
