//! Technologies that gate tile development

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tech {
    Fishing,
    MetalScraps,
}

impl Tech {
    pub const ALL: [Tech; 2] = [Tech::Fishing, Tech::MetalScraps];
}

/// Answers whether a tech has been researched
pub trait TechGate {
    fn is_unlocked(&self, tech: Tech) -> bool;
}

/// Set of unlocked techs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechTree {
    unlocked: AHashSet<Tech>,
}

impl TechTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything researched
    pub fn all_unlocked() -> Self {
        Self {
            unlocked: Tech::ALL.into_iter().collect(),
        }
    }

    /// Returns false if it was already unlocked
    pub fn unlock(&mut self, tech: Tech) -> bool {
        let added = self.unlocked.insert(tech);
        if added {
            tracing::info!(?tech, "tech unlocked");
        }
        added
    }

    pub fn unlocked(&self) -> Vec<Tech> {
        let mut techs: Vec<_> = self.unlocked.iter().copied().collect();
        techs.sort();
        techs
    }
}

impl TechGate for TechTree {
    fn is_unlocked(&self, tech: Tech) -> bool {
        self.unlocked.contains(&tech)
    }
}
