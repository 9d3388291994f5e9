//! Game session - owns the live player state
//!
//! Every transition runs under one lock through `MiningEconomy`, so the tick
//! driver and manual commands never interleave. Minting is the only
//! suspending operation and never holds the lock while it waits.

use crate::mining::config::SessionConfig;
use crate::mining::executor::{MintExecutor, MintReceipt};
use mrc_economy::{
    Action, EconomyError, MiningEconomy, PlayerState, Result, TickSchedule, Transition,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub struct GameSession<E: MintExecutor> {
    economy: MiningEconomy,
    live: Mutex<Live>,
    executor: E,
    connected: AtomicBool,
    minting: AtomicBool,
    reserved: AtomicU64,
    mint_timeout: Duration,
}

/// Player state plus the passive-mining clock, guarded together.
struct Live {
    state: PlayerState,
    /// Start of the current active window
    active_since: Option<Instant>,
    /// Active time not yet turned into ticks
    banked: Duration,
}

impl Live {
    fn store(&mut self, next: PlayerState) {
        match (self.state.is_active, next.is_active) {
            (false, true) => self.active_since = Some(Instant::now()),
            (true, false) => {
                if let Some(since) = self.active_since.take() {
                    self.banked += since.elapsed();
                }
            }
            _ => {}
        }
        self.state = next;
    }
}

/// Releases the in-flight flag and the reservation on every exit path,
/// including when the mint future is dropped mid-await.
struct MintGuard<'a> {
    minting: &'a AtomicBool,
    reserved: &'a AtomicU64,
}

impl Drop for MintGuard<'_> {
    fn drop(&mut self) {
        self.reserved.store(0, Ordering::SeqCst);
        self.minting.store(false, Ordering::SeqCst);
    }
}

impl<E: MintExecutor> GameSession<E> {
    pub fn new(economy: MiningEconomy, executor: E, config: &SessionConfig) -> Self {
        let state = economy.initial_state();
        Self::from_state(economy, executor, config, state)
    }

    /// Resume from an existing state
    pub fn from_state(
        economy: MiningEconomy,
        executor: E,
        config: &SessionConfig,
        state: PlayerState,
    ) -> Self {
        let active_since = state.is_active.then(Instant::now);
        Self {
            economy,
            live: Mutex::new(Live {
                state,
                active_since,
                banked: Duration::ZERO,
            }),
            executor,
            connected: AtomicBool::new(config.connected),
            minting: AtomicBool::new(false),
            reserved: AtomicU64::new(0),
            mint_timeout: config.mint_timeout,
        }
    }

    pub fn economy(&self) -> &MiningEconomy {
        &self.economy
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PlayerState {
        self.live.lock().state.clone()
    }

    pub fn is_active(&self) -> bool {
        self.live.lock().state.is_active
    }

    pub fn is_minting(&self) -> bool {
        self.minting.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Balance held back for the mint in flight
    pub fn reserved(&self) -> u64 {
        self.reserved.load(Ordering::SeqCst)
    }

    pub fn mine(&self) -> Transition {
        self.update(|economy, state| economy.mine(state))
    }

    /// Apply `ticks` owed passive ticks
    pub fn tick(&self, ticks: u64) -> Transition {
        self.update(|economy, state| economy.tick_many(state, ticks))
    }

    pub fn upgrade(&self) -> Result<Transition> {
        self.commit(|economy, state| {
            let reserved = self.reserved.load(Ordering::SeqCst);
            economy.upgrade_with_reserved(state, reserved)
        })
    }

    pub fn toggle_active(&self) -> Transition {
        self.update(|economy, state| economy.toggle_active(state))
    }

    /// Reset to defaults. Refused while a mint is in flight, since its
    /// settlement would then deduct from the fresh state.
    pub fn reset(&self) -> Result<Transition> {
        let mut live = self.live.lock();
        if self.is_minting() {
            return Err(EconomyError::MintInFlight);
        }
        let transition = self.economy.apply(&live.state, Action::Reset)?;
        live.store(transition.state.clone());
        live.banked = Duration::ZERO;
        Ok(transition)
    }

    /// Turn the active time accrued since the last call into passive ticks.
    ///
    /// Only time spent active counts; partial periods carry over in
    /// `schedule`. Returns `None` while inactive or when no tick is owed yet.
    pub fn credit_active_time(&self, schedule: &mut TickSchedule) -> Option<Transition> {
        let mut live = self.live.lock();
        let since = live.active_since?;
        let now = Instant::now();
        let active = std::mem::take(&mut live.banked) + now.saturating_duration_since(since);
        live.active_since = Some(now);

        let owed = schedule.advance(active);
        if owed == 0 {
            return None;
        }
        debug!(owed, active = ?active, "crediting passive ticks");
        let transition = self.economy.tick_many(&live.state, owed);
        live.store(transition.state.clone());
        Some(transition)
    }

    /// Mint `min(balance, max_mint)` through the executor.
    ///
    /// The balance is only reduced after the executor confirms. Only one
    /// mint may be in flight per session.
    pub async fn request_mint(&self) -> Result<MintReceipt> {
        if !self.is_connected() {
            return Err(EconomyError::NotConnected);
        }
        if self
            .minting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EconomyError::MintInFlight);
        }
        let _guard = MintGuard {
            minting: &self.minting,
            reserved: &self.reserved,
        };

        let amount = {
            let live = self.live.lock();
            let amount = self.economy.mint_amount(&live.state, true)?;
            self.reserved.store(amount, Ordering::SeqCst);
            amount
        };
        info!(amount, "mint requested");

        let receipt = match tokio::time::timeout(self.mint_timeout, self.executor.mint(amount)).await
        {
            Err(_) => {
                warn!(amount, "mint timed out");
                return Err(EconomyError::MintTimedOut {
                    after_ms: u64::try_from(self.mint_timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            Ok(Err(e)) => {
                warn!(amount, error = %e, "mint failed");
                return Err(EconomyError::MintFailed(format!("{:#}", e)));
            }
            Ok(Ok(receipt)) => receipt,
        };

        self.commit(|economy, state| economy.apply(state, Action::SettleMint(amount)))?;
        info!(amount, tx = %receipt.tx_hash, "mint confirmed");
        Ok(receipt)
    }

    fn update<F>(&self, f: F) -> Transition
    where
        F: FnOnce(&MiningEconomy, &PlayerState) -> Transition,
    {
        let mut live = self.live.lock();
        let transition = f(&self.economy, &live.state);
        live.store(transition.state.clone());
        transition
    }

    fn commit<F>(&self, f: F) -> Result<Transition>
    where
        F: FnOnce(&MiningEconomy, &PlayerState) -> Result<Transition>,
    {
        let mut live = self.live.lock();
        let transition = f(&self.economy, &live.state)?;
        live.store(transition.state.clone());
        Ok(transition)
    }
}
