//! Error types shared by the client economy and the token ledger

use thiserror::Error;

/// Every way an economy or ledger operation can be rejected.
///
/// A rejected operation never mutates state.
#[derive(Error, Debug)]
pub enum EconomyError {
    #[error("Game is not active for this player")]
    GameNotActive,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Mining cooldown active until {next_allowed_at}")]
    MiningCooldownActive { next_allowed_at: u64 },

    #[error("Max supply exceeded: requested {requested}, available {available}")]
    MaxSupplyExceeded { requested: u128, available: u128 },

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Balance {balance} is below the minimum of {minimum}")]
    BelowMinimum { balance: u64, minimum: u64 },

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Caller is not the owner")]
    Unauthorized,

    #[error("Contract is paused")]
    Paused,

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("Maximum level {level} reached")]
    MaxLevelReached { level: u32 },

    #[error("A mint is already in flight")]
    MintInFlight,

    #[error("Mint timed out after {after_ms} ms")]
    MintTimedOut { after_ms: u64 },

    #[error("Mint failed: {0}")]
    MintFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EconomyError>;
