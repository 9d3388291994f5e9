use crate::config::EconomyConfig;
use serde::{Deserialize, Serialize};

/// Snapshot of one player's client-side economy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub balance: u64,
    pub level: u32,
    pub mining_rate: u64,
    pub upgrade_cost: u64,
    pub total_mined: u64,
    pub experience: u64,
    pub is_active: bool,
}

impl PlayerState {
    /// Fresh state for a new session.
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            balance: 0,
            level: 1,
            mining_rate: config.initial_mining_rate,
            upgrade_cost: config.initial_upgrade_cost,
            total_mined: 0,
            experience: 0,
            is_active: false,
        }
    }

    pub fn can_upgrade(&self) -> bool {
        self.balance >= self.upgrade_cost
    }

    /// Experience accumulated towards the next threshold level-up.
    pub fn experience_progress(&self, xp_per_level: u64) -> u64 {
        if xp_per_level == 0 {
            return 0;
        }
        self.experience % xp_per_level
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(&EconomyConfig::default())
    }
}
