//! Client-side mining economy.
//!
//! `MiningEconomy` is a reducer: every operation takes the current
//! `PlayerState` by reference and returns a `Transition` holding the next
//! state plus the events it produced. Rejected operations return an error and
//! the caller keeps its old state untouched.

use crate::config::EconomyConfig;
use crate::error::{EconomyError, Result};
use crate::rules::{capped_level_ups, thresholds_crossed};
use crate::state::PlayerState;
use serde::Serialize;
use tracing::{debug, info};

/// Upper bound on passive ticks applied by one catch-up: a week of
/// one-second ticks. Owed ticks beyond it are dropped.
pub const MAX_CATCH_UP_TICKS: u64 = 7 * 24 * 60 * 60;

/// Commands accepted by the reducer entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Mine,
    Tick,
    /// Passive catch-up for several ticks at once
    TickMany(u64),
    Upgrade,
    ToggleActive,
    Reset,
    /// Deduct an amount the mint executor confirmed
    SettleMint(u64),
}

/// Observable effects of a transition, in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EconomyEvent {
    Mined { amount: u64 },
    PassiveMined { amount: u64, ticks: u64 },
    LeveledUp { level: u32, mining_rate: u64 },
    Upgraded { level: u32, mining_rate: u64, upgrade_cost: u64, spent: u64 },
    ActiveChanged { is_active: bool },
    Minted { amount: u64 },
    Reset,
}

/// Result of a successful operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: PlayerState,
    pub events: Vec<EconomyEvent>,
}

impl Transition {
    fn unchanged(state: &PlayerState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MiningEconomy {
    config: EconomyConfig,
}

impl MiningEconomy {
    pub fn new(config: EconomyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn initial_state(&self) -> PlayerState {
        PlayerState::new(&self.config)
    }

    /// Single entry point shared by manual commands and the tick driver.
    pub fn apply(&self, state: &PlayerState, action: Action) -> Result<Transition> {
        match action {
            Action::Mine => Ok(self.mine(state)),
            Action::Tick => Ok(self.tick(state)),
            Action::TickMany(ticks) => Ok(self.tick_many(state, ticks)),
            Action::Upgrade => self.upgrade(state),
            Action::ToggleActive => Ok(self.toggle_active(state)),
            Action::Reset => Ok(self.reset()),
            Action::SettleMint(amount) => self.settle_mint(state, amount),
        }
    }

    /// Manual mine: credits `mining_rate` to balance, total mined and experience.
    pub fn mine(&self, state: &PlayerState) -> Transition {
        let mut next = state.clone();
        let amount = next.mining_rate;
        next.balance = next.balance.saturating_add(amount);
        next.total_mined = next.total_mined.saturating_add(amount);

        let mut events = vec![EconomyEvent::Mined { amount }];
        self.gain_experience(&mut next, amount, &mut events);
        Transition {
            state: next,
            events,
        }
    }

    /// One passive-mining tick. No-op while passive mining is off.
    pub fn tick(&self, state: &PlayerState) -> Transition {
        self.tick_many(state, 1)
    }

    /// Apply `ticks` passive ticks in order, at most `MAX_CATCH_UP_TICKS`.
    ///
    /// Ticks between two level-ups share a reward, so they are credited in
    /// chunks ending at the next experience boundary.
    pub fn tick_many(&self, state: &PlayerState, ticks: u64) -> Transition {
        if !state.is_active || ticks == 0 {
            return Transition::unchanged(state);
        }
        if ticks > MAX_CATCH_UP_TICKS {
            info!(owed = ticks, applied = MAX_CATCH_UP_TICKS, "passive catch-up clamped");
        }
        let ticks = ticks.min(MAX_CATCH_UP_TICKS);

        let mut next = state.clone();
        let mut events = Vec::new();
        let mut level_events = Vec::new();
        let mut mined_total = 0u64;
        let mut remaining = ticks;
        let xp_per_tick = self.config.passive_experience;

        while remaining > 0 {
            let chunk = if xp_per_tick == 0 || self.at_max_level(&next) {
                remaining
            } else {
                let progress = next.experience_progress(self.config.xp_per_level);
                let to_boundary = self.config.xp_per_level - progress;
                remaining.min(to_boundary.div_ceil(xp_per_tick))
            };

            let reward = next.mining_rate / self.config.passive_rate_divisor;
            let mined = reward.saturating_mul(chunk);
            next.balance = next.balance.saturating_add(mined);
            next.total_mined = next.total_mined.saturating_add(mined);
            mined_total = mined_total.saturating_add(mined);

            self.gain_experience(&mut next, xp_per_tick.saturating_mul(chunk), &mut level_events);
            remaining -= chunk;
        }

        debug!(ticks, mined = mined_total, "passive mining");
        events.push(EconomyEvent::PassiveMined {
            amount: mined_total,
            ticks,
        });
        events.extend(level_events);
        Transition {
            state: next,
            events,
        }
    }

    pub fn upgrade(&self, state: &PlayerState) -> Result<Transition> {
        self.upgrade_with_reserved(state, 0)
    }

    /// Upgrade spending only `balance - reserved`.
    ///
    /// Used while a mint holds part of the balance.
    pub fn upgrade_with_reserved(&self, state: &PlayerState, reserved: u64) -> Result<Transition> {
        if self.at_max_level(state) {
            debug!(level = state.level, "upgrade rejected at max level");
            return Err(EconomyError::MaxLevelReached { level: state.level });
        }
        let available = state.balance.saturating_sub(reserved);
        if available < state.upgrade_cost {
            debug!(
                cost = state.upgrade_cost,
                available, "upgrade rejected: insufficient balance"
            );
            return Err(EconomyError::InsufficientBalance {
                required: state.upgrade_cost as u128,
                available: available as u128,
            });
        }

        let mut next = state.clone();
        let spent = next.upgrade_cost;
        next.balance -= spent;
        next.level += 1;
        next.mining_rate = self.config.upgrade_rate_growth.apply(next.mining_rate);
        next.upgrade_cost = self.config.upgrade_cost_growth.apply(next.upgrade_cost);

        info!(
            level = next.level,
            mining_rate = next.mining_rate,
            next_cost = next.upgrade_cost,
            "rig upgraded"
        );
        let mut events = vec![EconomyEvent::Upgraded {
            level: next.level,
            mining_rate: next.mining_rate,
            upgrade_cost: next.upgrade_cost,
            spent,
        }];
        self.gain_experience(&mut next, self.config.upgrade_experience, &mut events);
        Ok(Transition {
            state: next,
            events,
        })
    }

    pub fn toggle_active(&self, state: &PlayerState) -> Transition {
        let mut next = state.clone();
        next.is_active = !next.is_active;
        Transition {
            events: vec![EconomyEvent::ActiveChanged {
                is_active: next.is_active,
            }],
            state: next,
        }
    }

    pub fn reset(&self) -> Transition {
        Transition {
            state: self.initial_state(),
            events: vec![EconomyEvent::Reset],
        }
    }

    /// Amount a mint request would move on-chain right now.
    pub fn mint_amount(&self, state: &PlayerState, connected: bool) -> Result<u64> {
        if !connected {
            return Err(EconomyError::NotConnected);
        }
        if state.balance < self.config.min_mint {
            return Err(EconomyError::BelowMinimum {
                balance: state.balance,
                minimum: self.config.min_mint,
            });
        }
        Ok(state.balance.min(self.config.max_mint))
    }

    /// Deduct a confirmed mint from the balance.
    pub fn settle_mint(&self, state: &PlayerState, amount: u64) -> Result<Transition> {
        if amount == 0 {
            return Err(EconomyError::InvalidAmount);
        }
        if state.balance < amount {
            return Err(EconomyError::InsufficientBalance {
                required: amount as u128,
                available: state.balance as u128,
            });
        }
        let mut next = state.clone();
        next.balance -= amount;
        info!(amount, balance = next.balance, "mint settled");
        Ok(Transition {
            state: next,
            events: vec![EconomyEvent::Minted { amount }],
        })
    }

    fn at_max_level(&self, state: &PlayerState) -> bool {
        matches!(self.config.max_level, Some(max) if state.level >= max)
    }

    /// Add experience and apply one level-up per threshold crossed.
    fn gain_experience(&self, state: &mut PlayerState, amount: u64, events: &mut Vec<EconomyEvent>) {
        let before = state.experience;
        state.experience = state.experience.saturating_add(amount);

        let crossed = thresholds_crossed(before, state.experience, self.config.xp_per_level);
        let level_ups = capped_level_ups(state.level, crossed, self.config.max_level);
        for _ in 0..level_ups {
            state.level += 1;
            state.mining_rate = self.config.level_rate_growth.apply(state.mining_rate);
            info!(level = state.level, mining_rate = state.mining_rate, "level up");
            events.push(EconomyEvent::LeveledUp {
                level: state.level,
                mining_rate: state.mining_rate,
            });
        }
    }
}

impl Default for MiningEconomy {
    fn default() -> Self {
        Self {
            config: EconomyConfig::default(),
        }
    }
}
