//! Token ledger: the authoritative, on-chain flavour of the mining economy.
//!
//! Behaves like an ERC-20 token with game extensions. Every operation
//! validates first and mutates last, so a rejected call leaves the ledger
//! exactly as it was. Hosts sharing a ledger across tasks wrap it in a mutex;
//! each call is then one atomic transaction.

use crate::address::Address;
use crate::config::LedgerConfig;
use crate::error::{EconomyError, Result};
use crate::rules;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Per-address game record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LedgerPlayer {
    pub level: u32,
    pub total_mined: u128,
    pub is_active: bool,
    pub last_mine_timestamp: Option<u64>,
}

/// Public view returned by `get_player_stats`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub level: u32,
    pub mined: u128,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    Transfer {
        from: Address,
        to: Address,
        amount: u128,
    },
    TokensMined {
        player: Address,
        reward: u128,
        amount: u128,
    },
    LevelUp {
        player: Address,
        new_level: u32,
    },
    MiningRateUpdated {
        rate: u128,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
}

#[derive(Debug)]
pub struct TokenLedger {
    config: LedgerConfig,
    owner: Address,
    balances: HashMap<Address, u128>,
    players: HashMap<Address, LedgerPlayer>,
    total_supply: u128,
    max_supply: u128,
    base_mining_rate: u128,
    paused: bool,
    events: Vec<LedgerEvent>,
}

impl TokenLedger {
    /// Deploy a new ledger, crediting the initial supply to `owner`.
    pub fn deploy(owner: Address, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        if owner.is_zero() {
            return Err(EconomyError::InvalidAddress);
        }
        let initial_supply = config.to_base_units(config.initial_supply);
        let max_supply = config.to_base_units(config.max_supply);

        let mut ledger = Self {
            owner,
            balances: HashMap::new(),
            players: HashMap::new(),
            total_supply: 0,
            max_supply,
            base_mining_rate: config.base_mining_rate as u128,
            paused: false,
            events: Vec::new(),
            config,
        };
        ledger.credit(owner, initial_supply);
        ledger.total_supply = initial_supply;
        ledger.events.push(LedgerEvent::Transfer {
            from: Address::ZERO,
            to: owner,
            amount: initial_supply,
        });
        info!(%owner, supply = initial_supply, "ledger deployed");
        Ok(ledger)
    }

    // ── token metadata ───────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn max_supply(&self) -> u128 {
        self.max_supply
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn base_mining_rate(&self) -> u128 {
        self.base_mining_rate
    }

    pub fn level_multiplier_bps(&self) -> u64 {
        self.config.level_multiplier_bps
    }

    pub fn mining_cooldown(&self) -> u64 {
        self.config.mining_cooldown_secs
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn balance_of(&self, account: Address) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ── ERC-20 ───────────────────────────────────────────────────────

    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        if to.is_zero() || from.is_zero() {
            return Err(EconomyError::InvalidAddress);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(EconomyError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        self.debit(from, amount);
        self.credit(to, amount);
        self.events.push(LedgerEvent::Transfer { from, to, amount });
        Ok(())
    }

    pub fn burn(&mut self, caller: Address, amount: u128) -> Result<()> {
        let available = self.balance_of(caller);
        if available < amount {
            return Err(EconomyError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        self.debit(caller, amount);
        self.total_supply -= amount;
        self.events.push(LedgerEvent::Transfer {
            from: caller,
            to: Address::ZERO,
            amount,
        });
        debug!(%caller, amount, "burned");
        Ok(())
    }

    // ── game extensions ──────────────────────────────────────────────

    pub fn set_game_status(&mut self, player: Address, active: bool) -> Result<()> {
        if player.is_zero() {
            return Err(EconomyError::InvalidAddress);
        }
        self.player_mut(player).is_active = active;
        debug!(%player, active, "game status changed");
        Ok(())
    }

    pub fn is_game_active(&self, player: Address) -> bool {
        self.players.get(&player).is_some_and(|p| p.is_active)
    }

    pub fn get_player_stats(&self, player: Address) -> Result<PlayerStats> {
        if player.is_zero() {
            return Err(EconomyError::InvalidAddress);
        }
        let record = self.player(player);
        Ok(PlayerStats {
            level: record.level,
            mined: record.total_mined,
            active: record.is_active,
        })
    }

    /// Reward `player` would receive for mining `amount` at their current level.
    pub fn calculate_mining_reward(&self, player: Address, amount: u128) -> Result<u128> {
        let level = self.player(player).level;
        rules::mining_reward(
            amount,
            self.base_mining_rate,
            self.config.unit(),
            level,
            self.config.level_multiplier_bps as u128,
        )
    }

    /// Mine `amount` at block time `now` (seconds). Returns the reward.
    pub fn mine_tokens(&mut self, player: Address, amount: u128, now: u64) -> Result<u128> {
        if self.paused {
            return Err(EconomyError::Paused);
        }
        if player.is_zero() {
            return Err(EconomyError::InvalidAddress);
        }
        let record = self.player(player);
        if !record.is_active {
            return Err(EconomyError::GameNotActive);
        }
        if amount == 0 {
            return Err(EconomyError::InvalidAmount);
        }
        if let Some(last) = record.last_mine_timestamp {
            let next_allowed_at = last.saturating_add(self.config.mining_cooldown_secs);
            if now < next_allowed_at {
                debug!(%player, now, next_allowed_at, "mining on cooldown");
                return Err(EconomyError::MiningCooldownActive { next_allowed_at });
            }
        }

        let reward = self.calculate_mining_reward(player, amount)?;
        self.ensure_supply(reward)?;

        let old_level = record.level;
        let total_mined = record.total_mined.saturating_add(reward);
        let new_level =
            rules::level_for_total_mined(total_mined, self.level_threshold(), self.config.max_level)
                .max(old_level);

        self.credit(player, reward);
        self.total_supply += reward;
        let record = self.player_mut(player);
        record.total_mined = total_mined;
        record.last_mine_timestamp = Some(now);
        record.level = new_level;

        self.events.push(LedgerEvent::TokensMined {
            player,
            reward,
            amount,
        });
        if new_level > old_level {
            info!(%player, new_level, "player leveled up");
            self.events.push(LedgerEvent::LevelUp { player, new_level });
        }
        Ok(reward)
    }

    // ── owner-only ───────────────────────────────────────────────────

    pub fn update_mining_rate(&mut self, caller: Address, rate: u128) -> Result<()> {
        self.only_owner(caller)?;
        if rate == 0 {
            return Err(EconomyError::InvalidAmount);
        }
        self.base_mining_rate = rate;
        self.events.push(LedgerEvent::MiningRateUpdated { rate });
        info!(rate, "base mining rate updated");
        Ok(())
    }

    pub fn pause(&mut self, caller: Address) -> Result<()> {
        self.only_owner(caller)?;
        self.paused = true;
        self.events.push(LedgerEvent::Paused { by: caller });
        info!("ledger paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> Result<()> {
        self.only_owner(caller)?;
        self.paused = false;
        self.events.push(LedgerEvent::Unpaused { by: caller });
        info!("ledger unpaused");
        Ok(())
    }

    pub fn emergency_mint(&mut self, caller: Address, to: Address, amount: u128) -> Result<()> {
        self.only_owner(caller)?;
        if to.is_zero() {
            return Err(EconomyError::InvalidAddress);
        }
        if amount == 0 {
            return Err(EconomyError::InvalidAmount);
        }
        self.ensure_supply(amount)?;
        self.credit(to, amount);
        self.total_supply += amount;
        self.events.push(LedgerEvent::Transfer {
            from: Address::ZERO,
            to,
            amount,
        });
        info!(%to, amount, "emergency mint");
        Ok(())
    }

    // ── internals ────────────────────────────────────────────────────

    fn only_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            debug!(%caller, "owner-only call rejected");
            return Err(EconomyError::Unauthorized);
        }
        Ok(())
    }

    fn ensure_supply(&self, amount: u128) -> Result<()> {
        let available = self.max_supply.saturating_sub(self.total_supply);
        if amount > available {
            return Err(EconomyError::MaxSupplyExceeded {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    fn level_threshold(&self) -> u128 {
        self.config.to_base_units(self.config.level_up_threshold)
    }

    fn player(&self, player: Address) -> LedgerPlayer {
        self.players.get(&player).cloned().unwrap_or(LedgerPlayer {
            level: 1,
            ..Default::default()
        })
    }

    fn player_mut(&mut self, player: Address) -> &mut LedgerPlayer {
        self.players.entry(player).or_insert_with(|| LedgerPlayer {
            level: 1,
            ..Default::default()
        })
    }

    fn credit(&mut self, account: Address, amount: u128) {
        *self.balances.entry(account).or_insert(0) += amount;
    }

    fn debit(&mut self, account: Address, amount: u128) {
        if let Some(balance) = self.balances.get_mut(&account) {
            *balance -= amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETHER: u128 = 1_000_000_000_000_000_000;

    fn setup() -> (TokenLedger, Address, Address, Address) {
        let owner = Address::from_label("owner");
        let player1 = Address::from_label("player1");
        let player2 = Address::from_label("player2");
        let ledger = TokenLedger::deploy(owner, LedgerConfig::default()).unwrap();
        (ledger, owner, player1, player2)
    }

    #[test]
    fn test_deployment() {
        let (ledger, owner, _, _) = setup();
        assert_eq!(ledger.owner(), owner);
        assert_eq!(ledger.balance_of(owner), 100_000_000 * ETHER);
        assert_eq!(ledger.name(), "ModernRetroCyberToken");
        assert_eq!(ledger.symbol(), "MRC");
        assert_eq!(ledger.decimals(), 18);
        assert_eq!(ledger.total_supply(), 100_000_000 * ETHER);
        assert_eq!(ledger.max_supply(), 1_000_000_000 * ETHER);
    }

    #[test]
    fn test_zero_owner_rejected() {
        let result = TokenLedger::deploy(Address::ZERO, LedgerConfig::default());
        assert!(matches!(result, Err(EconomyError::InvalidAddress)));
    }

    #[test]
    fn test_game_status_toggle() {
        let (mut ledger, _, player1, _) = setup();
        ledger.set_game_status(player1, true).unwrap();
        assert!(ledger.is_game_active(player1));
        ledger.set_game_status(player1, false).unwrap();
        assert!(!ledger.is_game_active(player1));
    }

    #[test]
    fn test_mining_requires_active_game() {
        let (mut ledger, _, _, player2) = setup();
        ledger.set_game_status(player2, false).unwrap();
        assert!(matches!(
            ledger.mine_tokens(player2, 1, 1_000),
            Err(EconomyError::GameNotActive)
        ));
    }

    #[test]
    fn test_mining_credits_reward() {
        let (mut ledger, _, player1, _) = setup();
        ledger.set_game_status(player1, true).unwrap();
        let expected = ledger.calculate_mining_reward(player1, ETHER).unwrap();
        let before = ledger.balance_of(player1);
        let reward = ledger.mine_tokens(player1, ETHER, 1_000).unwrap();
        assert_eq!(reward, expected);
        assert_eq!(ledger.balance_of(player1) - before, expected);
        assert_eq!(
            ledger.events().last(),
            Some(&LedgerEvent::TokensMined {
                player: player1,
                reward,
                amount: ETHER
            })
        );
    }

    #[test]
    fn test_cooldown() {
        let (mut ledger, _, player1, _) = setup();
        ledger.set_game_status(player1, true).unwrap();
        ledger.mine_tokens(player1, 1, 1_000).unwrap();
        let before_supply = ledger.total_supply();

        let err = ledger.mine_tokens(player1, 1, 1_030).unwrap_err();
        assert!(matches!(
            err,
            EconomyError::MiningCooldownActive {
                next_allowed_at: 1_060
            }
        ));
        assert_eq!(ledger.total_supply(), before_supply);

        assert!(ledger.mine_tokens(player1, 1, 1_060).is_ok());
    }

    #[test]
    fn test_level_up_by_total_mined() {
        let (mut ledger, _, player1, _) = setup();
        ledger.set_game_status(player1, true).unwrap();
        assert_eq!(ledger.get_player_stats(player1).unwrap().level, 1);

        ledger.drain_events();
        ledger.mine_tokens(player1, 1_000 * ETHER, 1_000).unwrap();
        let stats = ledger.get_player_stats(player1).unwrap();
        assert_eq!(stats.level, 2);
        assert!(ledger.events().contains(&LedgerEvent::LevelUp {
            player: player1,
            new_level: 2
        }));

        // level 2 earns the 10% bonus
        assert_eq!(
            ledger.calculate_mining_reward(player1, ETHER).unwrap(),
            ETHER * 11 / 10
        );
    }

    #[test]
    fn test_player_stats() {
        let (mut ledger, _, player1, _) = setup();
        ledger.set_game_status(player1, true).unwrap();
        let stats = ledger.get_player_stats(player1).unwrap();
        assert_eq!(
            stats,
            PlayerStats {
                level: 1,
                mined: 0,
                active: true
            }
        );
        ledger.mine_tokens(player1, 100 * ETHER, 5).unwrap();
        assert!(ledger.get_player_stats(player1).unwrap().mined > 0);
        assert!(matches!(
            ledger.get_player_stats(Address::ZERO),
            Err(EconomyError::InvalidAddress)
        ));
    }

    #[test]
    fn test_update_mining_rate() {
        let (mut ledger, owner, player1, _) = setup();
        ledger.update_mining_rate(owner, 2 * ETHER).unwrap();
        assert_eq!(ledger.base_mining_rate(), 2 * ETHER);
        assert_eq!(
            ledger.events().last(),
            Some(&LedgerEvent::MiningRateUpdated { rate: 2 * ETHER })
        );
        assert!(matches!(
            ledger.update_mining_rate(player1, 3 * ETHER),
            Err(EconomyError::Unauthorized)
        ));
        assert_eq!(ledger.base_mining_rate(), 2 * ETHER);
    }

    #[test]
    fn test_pause_blocks_mining() {
        let (mut ledger, owner, player1, _) = setup();
        ledger.set_game_status(player1, true).unwrap();
        ledger.pause(owner).unwrap();
        assert!(ledger.is_paused());
        assert!(matches!(
            ledger.mine_tokens(player1, 1, 10),
            Err(EconomyError::Paused)
        ));
        assert!(matches!(ledger.pause(player1), Err(EconomyError::Unauthorized)));
        ledger.unpause(owner).unwrap();
        assert!(!ledger.is_paused());
        assert!(ledger.mine_tokens(player1, 1, 10).is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let (mut ledger, _, player1, _) = setup();
        ledger.set_game_status(player1, true).unwrap();
        assert!(matches!(
            ledger.mine_tokens(player1, 0, 10),
            Err(EconomyError::InvalidAmount)
        ));
    }

    #[test]
    fn test_emergency_mint_max_supply() {
        let (mut ledger, owner, player1, _) = setup();
        let max = ledger.max_supply();
        assert!(matches!(
            ledger.emergency_mint(owner, owner, max),
            Err(EconomyError::MaxSupplyExceeded { .. })
        ));
        let headroom = max - ledger.total_supply();
        ledger.emergency_mint(owner, player1, headroom).unwrap();
        assert_eq!(ledger.total_supply(), max);
        assert!(matches!(
            ledger.emergency_mint(player1, player1, 1),
            Err(EconomyError::Unauthorized)
        ));
    }

    #[test]
    fn test_mining_respects_max_supply() {
        let (mut ledger, owner, player1, _) = setup();
        let headroom = ledger.max_supply() - ledger.total_supply();
        ledger.emergency_mint(owner, owner, headroom - 1).unwrap();
        ledger.set_game_status(player1, true).unwrap();
        assert!(matches!(
            ledger.mine_tokens(player1, 2, 10),
            Err(EconomyError::MaxSupplyExceeded {
                requested: 2,
                available: 1
            })
        ));
        assert_eq!(ledger.get_player_stats(player1).unwrap().mined, 0);
        assert!(ledger.mine_tokens(player1, 1, 10).is_ok());
    }

    #[test]
    fn test_transfer_and_burn() {
        let (mut ledger, owner, player1, _) = setup();
        ledger.transfer(owner, player1, 1_000 * ETHER).unwrap();
        assert_eq!(ledger.balance_of(player1), 1_000 * ETHER);

        let supply = ledger.total_supply();
        ledger.burn(owner, 1_000 * ETHER).unwrap();
        assert_eq!(ledger.total_supply(), supply - 1_000 * ETHER);

        assert!(matches!(
            ledger.burn(player1, 2_000 * ETHER),
            Err(EconomyError::InsufficientBalance { .. })
        ));
        assert!(matches!(
            ledger.transfer(player1, Address::ZERO, 1),
            Err(EconomyError::InvalidAddress)
        ));
    }

    #[test]
    fn test_level_capped() {
        let config = LedgerConfig {
            max_level: 3,
            mining_cooldown_secs: 0,
            ..LedgerConfig::default()
        };
        let owner = Address::from_label("owner");
        let player = Address::from_label("whale");
        let mut ledger = TokenLedger::deploy(owner, config).unwrap();
        ledger.set_game_status(player, true).unwrap();
        ledger.mine_tokens(player, 10_000 * ETHER, 1).unwrap();
        assert_eq!(ledger.get_player_stats(player).unwrap().level, 3);
    }
}
