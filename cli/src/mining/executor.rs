//! Mint executors - Backends that turn in-game balance into real tokens

use anyhow::{Context, Result};
use mrc_economy::address::keccak256;
use mrc_economy::{Address, TokenLedger};
use parking_lot::Mutex;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Confirmation returned by a successful mint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    /// In-game tokens minted
    pub amount: u64,
    /// Transaction hash (hex, 0x-prefixed)
    pub tx_hash: String,
}

/// Trait for mint execution backends
///
/// Any error is treated the same way by the session: nothing is deducted.
pub trait MintExecutor: Send + Sync {
    /// Mint `amount` in-game tokens for the current player
    fn mint(&self, amount: u64) -> impl Future<Output = Result<MintReceipt>> + Send;
}

fn tx_hash(tag: &[u8], amount: u64, nonce: u64) -> String {
    let mut payload = Vec::with_capacity(tag.len() + 16);
    payload.extend_from_slice(tag);
    payload.extend_from_slice(&amount.to_be_bytes());
    payload.extend_from_slice(&nonce.to_be_bytes());
    format!("0x{}", hex::encode(keccak256(&payload)))
}

/// Wallet stand-in with configurable latency and failure probability
pub struct SimulatedWallet {
    latency: Duration,
    failure_rate: f64,
    nonce: AtomicU64,
}

impl SimulatedWallet {
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            nonce: AtomicU64::new(0),
        }
    }
}

impl Default for SimulatedWallet {
    fn default() -> Self {
        Self::new(Duration::from_millis(800), 0.0)
    }
}

impl MintExecutor for SimulatedWallet {
    fn mint(&self, amount: u64) -> impl Future<Output = Result<MintReceipt>> + Send {
        async move {
            let rejected = rand::thread_rng().gen_bool(self.failure_rate);
            let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
            debug!(amount, nonce, "wallet signing mint");

            tokio::time::sleep(self.latency).await;

            if rejected {
                anyhow::bail!("transaction rejected by wallet");
            }
            Ok(MintReceipt {
                amount,
                tx_hash: tx_hash(b"wallet", amount, nonce),
            })
        }
    }
}

/// Mints straight into a shared in-memory `TokenLedger` using the owner's
/// emergency mint authority.
pub struct LedgerMintExecutor {
    ledger: Arc<Mutex<TokenLedger>>,
    authority: Address,
    recipient: Address,
    nonce: AtomicU64,
}

impl LedgerMintExecutor {
    pub fn new(ledger: Arc<Mutex<TokenLedger>>, authority: Address, recipient: Address) -> Self {
        Self {
            ledger,
            authority,
            recipient,
            nonce: AtomicU64::new(0),
        }
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }
}

impl MintExecutor for LedgerMintExecutor {
    fn mint(&self, amount: u64) -> impl Future<Output = Result<MintReceipt>> + Send {
        async move {
            let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
            {
                let mut ledger = self.ledger.lock();
                let units = ledger.config().to_base_units(amount);
                ledger
                    .emergency_mint(self.authority, self.recipient, units)
                    .with_context(|| format!("ledger refused mint of {} tokens", amount))?;
            }
            Ok(MintReceipt {
                amount,
                tx_hash: tx_hash(self.recipient.as_bytes(), amount, nonce),
            })
        }
    }
}
