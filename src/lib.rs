// Core economy library
pub mod address;
pub mod config;
pub mod economy;
pub mod error;
pub mod ledger;
pub mod rules;
pub mod schedule;
pub mod state;

// Re-export for convenience
pub use address::Address;
pub use config::{EconomyConfig, GameConfig, LedgerConfig};
pub use economy::{Action, EconomyEvent, MAX_CATCH_UP_TICKS, MiningEconomy, Transition};
pub use error::{EconomyError, Result};
pub use ledger::{LedgerEvent, PlayerStats, TokenLedger};
pub use schedule::TickSchedule;
pub use state::PlayerState;
