//! Game configuration
//!
//! Defaults reproduce the shipped game constants. Every field is optional in
//! JSON; missing fields fall back to their default.

use crate::error::{EconomyError, Result};
use crate::rules::Growth;
use serde::{Deserialize, Serialize};

/// Client economy parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Tokens per manual mine at level 1
    pub initial_mining_rate: u64,
    /// Cost of the first upgrade
    pub initial_upgrade_cost: u64,
    /// Experience needed per threshold level-up
    pub xp_per_level: u64,
    /// Rate growth applied on every threshold level-up (x1.2)
    pub level_rate_growth: Growth,
    /// Rate growth applied on upgrade (x1.5)
    pub upgrade_rate_growth: Growth,
    /// Cost growth applied on upgrade (x2.2)
    pub upgrade_cost_growth: Growth,
    /// Experience granted by an upgrade
    pub upgrade_experience: u64,
    /// Passive reward per tick is `floor(mining_rate / passive_rate_divisor)`
    pub passive_rate_divisor: u64,
    /// Experience granted per passive tick
    pub passive_experience: u64,
    /// Smallest balance that may be minted
    pub min_mint: u64,
    /// Largest amount minted in one request
    pub max_mint: u64,
    /// Level ceiling; `None` disables it
    pub max_level: Option<u32>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_mining_rate: 1,
            initial_upgrade_cost: 50,
            xp_per_level: 100,
            level_rate_growth: Growth::new(6, 5),
            upgrade_rate_growth: Growth::new(3, 2),
            upgrade_cost_growth: Growth::new(11, 5),
            upgrade_experience: 25,
            passive_rate_divisor: 4,
            passive_experience: 1,
            min_mint: 100,
            max_mint: 1_000,
            max_level: Some(100),
        }
    }
}

impl EconomyConfig {
    pub fn with_max_level(mut self, max_level: Option<u32>) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_mint_limits(mut self, min_mint: u64, max_mint: u64) -> Self {
        self.min_mint = min_mint;
        self.max_mint = max_mint;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_mining_rate == 0 {
            return invalid("initial_mining_rate must be positive");
        }
        if self.initial_upgrade_cost == 0 {
            return invalid("initial_upgrade_cost must be positive");
        }
        if self.xp_per_level == 0 {
            return invalid("xp_per_level must be positive");
        }
        if self.passive_rate_divisor == 0 {
            return invalid("passive_rate_divisor must be positive");
        }
        for (name, growth) in [
            ("level_rate_growth", self.level_rate_growth),
            ("upgrade_rate_growth", self.upgrade_rate_growth),
            ("upgrade_cost_growth", self.upgrade_cost_growth),
        ] {
            if !growth.is_non_decreasing() {
                return invalid(&format!("{} must be >= 1", name));
            }
        }
        if self.min_mint == 0 || self.max_mint < self.min_mint {
            return invalid("mint limits must satisfy 0 < min_mint <= max_mint");
        }
        if self.max_level == Some(0) {
            return invalid("max_level must be at least 1");
        }
        Ok(())
    }
}

/// Token ledger parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Whole tokens credited to the owner at deployment
    pub initial_supply: u64,
    /// Hard cap in whole tokens
    pub max_supply: u64,
    /// Reward per whole token requested, in base units
    pub base_mining_rate: u64,
    /// Extra reward per level above 1, in basis points
    pub level_multiplier_bps: u64,
    /// Minimum seconds between two mines by the same player
    pub mining_cooldown_secs: u64,
    /// Whole tokens mined per ledger level
    pub level_up_threshold: u64,
    pub max_level: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "ModernRetroCyberToken".to_string(),
            symbol: "MRC".to_string(),
            decimals: 18,
            initial_supply: 100_000_000,
            max_supply: 1_000_000_000,
            base_mining_rate: 1_000_000_000_000_000_000,
            level_multiplier_bps: 1_000,
            mining_cooldown_secs: 60,
            level_up_threshold: 1_000,
            max_level: 100,
        }
    }
}

impl LedgerConfig {
    pub fn with_cooldown(mut self, secs: u64) -> Self {
        self.mining_cooldown_secs = secs;
        self
    }

    /// One whole token in base units.
    pub fn unit(&self) -> u128 {
        10u128.pow(self.decimals as u32)
    }

    /// Convert whole tokens to base units.
    pub fn to_base_units(&self, tokens: u64) -> u128 {
        (tokens as u128).saturating_mul(self.unit())
    }

    pub fn validate(&self) -> Result<()> {
        if self.decimals > 30 {
            return invalid("decimals must be at most 30");
        }
        if self.initial_supply > self.max_supply {
            return invalid("initial_supply exceeds max_supply");
        }
        if self.base_mining_rate == 0 {
            return invalid("base_mining_rate must be positive");
        }
        if self.level_up_threshold == 0 {
            return invalid("level_up_threshold must be positive");
        }
        if self.max_level == 0 {
            return invalid("max_level must be at least 1");
        }
        Ok(())
    }
}

/// Complete configuration file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub economy: EconomyConfig,
    pub ledger: LedgerConfig,
}

impl GameConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.economy.validate()?;
        self.ledger.validate()
    }
}

fn invalid(msg: &str) -> Result<()> {
    Err(EconomyError::InvalidConfig(msg.to_string()))
}
