//! Session configuration

use std::time::Duration;

/// Configuration for an interactive or simulated game session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Passive mining period
    pub tick_period: Duration,
    /// Upper bound on how long a mint may stay in flight
    pub mint_timeout: Duration,
    /// Whether a wallet is connected (mints are refused otherwise)
    pub connected: bool,
    /// Simulated wallet confirmation latency
    pub wallet_latency: Duration,
    /// Probability in [0, 1] that the simulated wallet rejects a mint
    pub wallet_failure_rate: f64,
}

impl SessionConfig {
    pub fn new(tick_period: Duration) -> Self {
        Self {
            tick_period,
            ..Self::default()
        }
    }

    pub fn with_mint_timeout(mut self, timeout: Duration) -> Self {
        self.mint_timeout = timeout;
        self
    }

    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    pub fn with_wallet(mut self, latency: Duration, failure_rate: f64) -> Self {
        self.wallet_latency = latency;
        self.wallet_failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            mint_timeout: Duration::from_secs(10),
            connected: true,
            wallet_latency: Duration::from_millis(800),
            wallet_failure_rate: 0.0,
        }
    }
}
