pub mod commands;
pub mod common;
pub mod mining;
pub mod progress;

// Re-export session building blocks
pub use mining::{
    GameSession, LedgerMintExecutor, MintExecutor, MintReceipt, SessionConfig, SimulatedWallet,
    spawn_tick_driver,
};
