//! Developing resource objects on tiles into score

use crate::core::config::DevelopmentConfig;
use crate::core::error::ActionError;
use crate::economy::ledger::ResourceLedger;
use crate::economy::tech::TechGate;
use crate::events::{EventBus, TileDeveloped};
use crate::map::grid::HexMap;
use crate::map::hex::HexCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevelopmentRules {
    pub ap_cost: u32,
    pub score_reward: u32,
}

impl From<&DevelopmentConfig> for DevelopmentRules {
    fn from(config: &DevelopmentConfig) -> Self {
        Self {
            ap_cost: config.ap_cost,
            score_reward: config.score_reward,
        }
    }
}

impl Default for DevelopmentRules {
    fn default() -> Self {
        Self::from(&DevelopmentConfig::default())
    }
}

/// Develop the resource object on `coord`
///
/// Checks run before anything is charged: the tile must hold a resource, its
/// tech must be unlocked and the ledger must cover the cost. On success the
/// object is consumed and the reward is added to the player's score.
pub fn develop_tile(
    coord: HexCoord,
    map: &mut HexMap,
    ledger: &mut ResourceLedger,
    techs: &dyn TechGate,
    rules: DevelopmentRules,
    bus: &EventBus,
) -> Result<TileDeveloped, ActionError> {
    let tile = map.get(coord).ok_or(ActionError::OffMap(coord))?;
    let resource = tile.resource.ok_or(ActionError::NoResource(coord))?;

    if let Some(tech) = resource.required_tech() {
        if !techs.is_unlocked(tech) {
            tracing::warn!(%coord, ?tech, "development blocked by tech");
            return Err(ActionError::TechLocked(tech));
        }
    }

    ledger.use_action_points(rules.ap_cost, bus).map_err(|err| {
        tracing::warn!(%coord, error = %err, "development rejected");
        err
    })?;
    ledger.add_score(rules.score_reward, bus);

    if let Some(tile) = map.get_mut(coord) {
        tile.resource = None;
    }

    let developed = TileDeveloped { coord, resource };
    tracing::debug!(%coord, ?resource, "tile developed");
    bus.publish(&developed);
    Ok(developed)
}
