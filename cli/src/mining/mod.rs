//! Mining module - Session host for the economy core
//!
//! This module wires the pure economy to the outside world:
//! - Mint backends (simulated wallet, in-memory ledger) via `MintExecutor` trait
//! - `GameSession`, which serialises every state transition
//! - The passive-mining tick driver

pub mod config;
pub mod driver;
pub mod executor;
pub mod session;

pub use config::SessionConfig;
pub use driver::spawn_tick_driver;
pub use executor::{LedgerMintExecutor, MintExecutor, MintReceipt, SimulatedWallet};
pub use session::GameSession;
