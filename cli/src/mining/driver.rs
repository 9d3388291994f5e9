//! Passive-mining tick driver

use crate::mining::executor::MintExecutor;
use crate::mining::session::GameSession;
use anyhow::Result;
use mrc_economy::{TickSchedule, Transition};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Spawn the periodic driver that credits passive ticks while the session
/// is active.
///
/// Each wake-up converts the active time the session measured since the
/// previous wake-up into ticks, so a late wake-up credits every period that
/// passed and time spent inactive is never credited.
/// `on_tick` sees every transition that applied at least one tick.
pub fn spawn_tick_driver<E, F>(
    session: Arc<GameSession<E>>,
    period: Duration,
    cancel: Arc<AtomicBool>,
    on_tick: F,
) -> Result<JoinHandle<()>>
where
    E: MintExecutor + 'static,
    F: Fn(&Transition) + Send + 'static,
{
    let mut schedule = TickSchedule::new(period)?;

    Ok(tokio::spawn(async move {
        let mut interval = tokio::time::interval(schedule.period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            if let Some(transition) = session.credit_active_time(&mut schedule) {
                on_tick(&transition);
            }
        }
        debug!("tick driver stopped");
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::config::SessionConfig;
    use crate::mining::executor::SimulatedWallet;
    use mrc_economy::MiningEconomy;
    use std::sync::atomic::AtomicU64;

    fn session() -> Arc<GameSession<SimulatedWallet>> {
        Arc::new(GameSession::new(
            MiningEconomy::default(),
            SimulatedWallet::default(),
            &SessionConfig::default(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_credits_ticks_while_active() {
        let session = session();
        session.toggle_active();
        let cancel = Arc::new(AtomicBool::new(false));
        let observed = Arc::new(AtomicU64::new(0));

        let handle = {
            let observed = observed.clone();
            spawn_tick_driver(
                session.clone(),
                Duration::from_secs(1),
                cancel.clone(),
                move |_| {
                    observed.fetch_add(1, Ordering::Relaxed);
                },
            )
            .unwrap()
        };

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(session.snapshot().experience, 5);
        assert_eq!(observed.load(Ordering::Relaxed), 5);

        cancel.store(true, Ordering::Relaxed);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_ignores_inactive_time() {
        let session = session();
        let cancel = Arc::new(AtomicBool::new(false));
        let handle =
            spawn_tick_driver(session.clone(), Duration::from_secs(1), cancel.clone(), |_| {})
                .unwrap();

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(session.snapshot().experience, 0);

        // active from 3.5s to 5.5s; wake-ups at 4s and 5s see 1.5s of it
        session.toggle_active();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(session.snapshot().experience, 1);

        session.toggle_active();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(session.snapshot().experience, 1);

        // the 0.5s left over from the first window completes a period
        session.toggle_active();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(session.snapshot().experience, 2);

        cancel.store(true, Ordering::Relaxed);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_activations_across_wake_ups() {
        let session = session();
        let cancel = Arc::new(AtomicBool::new(false));
        let handle =
            spawn_tick_driver(session.clone(), Duration::from_secs(1), cancel.clone(), |_| {})
                .unwrap();

        // ten 200ms windows, each straddling a wake-up: 2s active in total
        tokio::time::sleep(Duration::from_millis(900)).await;
        for _ in 0..10 {
            session.toggle_active();
            tokio::time::sleep(Duration::from_millis(200)).await;
            session.toggle_active();
            tokio::time::sleep(Duration::from_millis(800)).await;
        }
        // 1.9s has been handed to the driver so far
        assert_eq!(session.snapshot().experience, 1);

        session.toggle_active();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.snapshot().experience, 2);

        cancel.store(true, Ordering::Relaxed);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_banked_time() {
        let session = session();
        let cancel = Arc::new(AtomicBool::new(false));
        let handle =
            spawn_tick_driver(session.clone(), Duration::from_secs(1), cancel.clone(), |_| {})
                .unwrap();

        // bank 1.6s of active time in two windows that miss every wake-up
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.toggle_active();
        tokio::time::sleep(Duration::from_millis(800)).await;
        session.toggle_active();
        tokio::time::sleep(Duration::from_millis(200)).await;
        session.toggle_active();
        tokio::time::sleep(Duration::from_millis(800)).await;
        session.toggle_active();
        session.reset().unwrap();

        session.toggle_active();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.snapshot().experience, 0);

        cancel.store(true, Ordering::Relaxed);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_period_rejected() {
        let result = spawn_tick_driver(session(), Duration::ZERO, Arc::new(AtomicBool::new(false)), |_| {});
        assert!(result.is_err());
    }
}
