//! Interactive command parsing and event rendering

use anyhow::Result;
use mrc_economy::{EconomyEvent, LedgerConfig, LedgerEvent};
use std::str::FromStr;

use crate::common::format_token_amount;

/// Commands accepted on stdin during `play`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Mine,
    Upgrade,
    ToggleAuto,
    Mint,
    Reset,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            // a bare Enter mines, like clicking the rig
            "" | "m" | "mine" => Ok(Command::Mine),
            "u" | "upgrade" => Ok(Command::Upgrade),
            "a" | "auto" => Ok(Command::ToggleAuto),
            "t" | "mint" => Ok(Command::Mint),
            "r" | "reset" => Ok(Command::Reset),
            "s" | "status" => Ok(Command::Status),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => anyhow::bail!("Unknown command: '{}' (type 'help')", other),
        }
    }
}

pub const HELP: &str = "\
Commands:
  <enter>, m, mine    mine once
  u, upgrade          upgrade the rig
  a, auto             toggle auto-mining
  t, mint             mint balance to real tokens (min 100, max 1000)
  r, reset            reset the game
  s, status           show statistics
  q, quit             leave";

/// Human-readable line for noteworthy economy events
pub fn describe_event(event: &EconomyEvent) -> Option<String> {
    match event {
        EconomyEvent::LeveledUp { level, mining_rate } => Some(format!(
            "🆙 Level up! Now level {} (+{}/click)",
            level, mining_rate
        )),
        EconomyEvent::Upgraded {
            level,
            mining_rate,
            upgrade_cost,
            spent,
        } => Some(format!(
            "🔧 Upgraded for {} MRC: level {}, +{}/click, next upgrade {}",
            spent, level, mining_rate, upgrade_cost
        )),
        EconomyEvent::ActiveChanged { is_active: true } => Some("▶️  Auto-mine started".into()),
        EconomyEvent::ActiveChanged { is_active: false } => Some("⏸️  Auto-mine paused".into()),
        EconomyEvent::Minted { amount } => Some(format!("🪙 Minted {} real MRC", amount)),
        EconomyEvent::Reset => Some("🔄 Game reset".into()),
        EconomyEvent::Mined { .. } | EconomyEvent::PassiveMined { .. } => None,
    }
}

/// Human-readable line for a ledger event
pub fn describe_ledger_event(event: &LedgerEvent, config: &LedgerConfig) -> String {
    match event {
        LedgerEvent::Transfer { from, to, amount } if from.is_zero() => {
            format!("🪙 Mint {} → {}", format_token_amount(*amount, config), to.short())
        }
        LedgerEvent::Transfer { from, to, amount } if to.is_zero() => {
            format!("🔥 Burn {} from {}", format_token_amount(*amount, config), from.short())
        }
        LedgerEvent::Transfer { from, to, amount } => format!(
            "💸 Transfer {} {} → {}",
            format_token_amount(*amount, config),
            from.short(),
            to.short()
        ),
        LedgerEvent::TokensMined {
            player,
            reward,
            amount,
        } => format!(
            "⛏️  TokensMined {} reward {} (requested {})",
            player.short(),
            format_token_amount(*reward, config),
            format_token_amount(*amount, config)
        ),
        LedgerEvent::LevelUp { player, new_level } => {
            format!("🆙 LevelUp {} → level {}", player.short(), new_level)
        }
        LedgerEvent::MiningRateUpdated { rate } => {
            format!("📈 MiningRateUpdated {}", format_token_amount(*rate, config))
        }
        LedgerEvent::Paused { by } => format!("⏸️  Paused by {}", by.short()),
        LedgerEvent::Unpaused { by } => format!("▶️  Unpaused by {}", by.short()),
    }
}
