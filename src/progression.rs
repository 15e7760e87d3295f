//! Progression tiers derived from match count
//!
//! Tiers are a pure function of total matches played; nothing is stored.
//! Feature gates hang off the tier so the client can decide what UI to
//! unlock without re-deriving thresholds.

use serde::{Deserialize, Serialize};

const GOLD_AT: u32 = 20;
const DIAMOND_AT: u32 = 50;
const NETHERITE_AT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Iron,
    Gold,
    Diamond,
    Netherite,
}

/// Current tier plus what it takes to reach the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub tier: Tier,
    pub next_tier: Option<Tier>,
    pub next_target: Option<u32>,
}

/// Features unlocked at each tier
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGates {
    pub stats_panel: bool,
    pub leaderboard: bool,
}

#[must_use]
pub fn tier_of(matches_played: u32) -> Progression {
    match matches_played {
        0..GOLD_AT => Progression {
            tier: Tier::Iron,
            next_tier: Some(Tier::Gold),
            next_target: Some(GOLD_AT),
        },
        GOLD_AT..DIAMOND_AT => Progression {
            tier: Tier::Gold,
            next_tier: Some(Tier::Diamond),
            next_target: Some(DIAMOND_AT),
        },
        DIAMOND_AT..NETHERITE_AT => Progression {
            tier: Tier::Diamond,
            next_tier: Some(Tier::Netherite),
            next_target: Some(NETHERITE_AT),
        },
        NETHERITE_AT.. => Progression {
            tier: Tier::Netherite,
            next_tier: None,
            next_target: None,
        },
    }
}

#[must_use]
pub fn gates_for(tier: Tier) -> FeatureGates {
    FeatureGates {
        stats_panel: tier >= Tier::Gold,
        leaderboard: tier >= Tier::Diamond,
    }
}
