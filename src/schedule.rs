//! Elapsed-time tick accounting for passive mining

use crate::error::{EconomyError, Result};
use std::time::Duration;

/// Converts measured elapsed time into whole passive ticks.
///
/// The remainder that does not fill a period is carried into the next call,
/// so irregular wake-ups (a slow timer, a suspended process) neither lose
/// nor double-count ticks.
#[derive(Clone, Debug)]
pub struct TickSchedule {
    period: Duration,
    carried: Duration,
}

impl TickSchedule {
    pub fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(EconomyError::InvalidConfig(
                "tick period must be non-zero".into(),
            ));
        }
        Ok(Self {
            period,
            carried: Duration::ZERO,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Feed `elapsed` time and return the number of ticks now owed.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        let total = self.carried.saturating_add(elapsed);
        let period_nanos = self.period.as_nanos();
        let ticks = total.as_nanos() / period_nanos;
        let rest = total.as_nanos() % period_nanos;
        // rest < period, which always fits in a Duration
        self.carried = Duration::from_nanos(rest as u64);
        u64::try_from(ticks).unwrap_or(u64::MAX)
    }

    /// Drop any partial period, e.g. when passive mining is switched off.
    pub fn reset(&mut self) {
        self.carried = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_period_rejected() {
        assert!(TickSchedule::new(Duration::ZERO).is_err());
    }

    #[test]
    fn test_whole_periods() {
        let mut schedule = TickSchedule::new(Duration::from_secs(1)).unwrap();
        assert_eq!(schedule.advance(Duration::from_secs(3)), 3);
        assert_eq!(schedule.advance(Duration::ZERO), 0);
    }

    #[test]
    fn test_remainder_carries() {
        let mut schedule = TickSchedule::new(Duration::from_millis(1_000)).unwrap();
        assert_eq!(schedule.advance(Duration::from_millis(600)), 0);
        assert_eq!(schedule.advance(Duration::from_millis(600)), 1);
        assert_eq!(schedule.advance(Duration::from_millis(800)), 1);
        assert_eq!(schedule.advance(Duration::from_millis(0)), 0);
    }

    #[test]
    fn test_irregular_intervals_sum_exactly() {
        let mut schedule = TickSchedule::new(Duration::from_millis(250)).unwrap();
        let steps = [13u64, 400, 97, 1_250, 3, 737, 9_000, 1];
        let total: u64 = steps
            .iter()
            .map(|ms| schedule.advance(Duration::from_millis(*ms)))
            .sum();
        let elapsed: u64 = steps.iter().sum();
        assert_eq!(total, elapsed / 250);
    }

    #[test]
    fn test_long_suspension() {
        let mut schedule = TickSchedule::new(Duration::from_secs(1)).unwrap();
        assert_eq!(schedule.advance(Duration::from_secs(8 * 3600)), 28_800);
    }

    #[test]
    fn test_reset_drops_partial_period() {
        let mut schedule = TickSchedule::new(Duration::from_secs(1)).unwrap();
        schedule.advance(Duration::from_millis(900));
        schedule.reset();
        assert_eq!(schedule.advance(Duration::from_millis(200)), 0);
    }
}
