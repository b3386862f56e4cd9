//! Retry-with-deadline helper for hardware polls
//!
//! Every "wait for the device" loop in the driver goes through [`Poll`]:
//! the condition is checked, and if it does not hold the target's delay is
//! used before the next attempt. A bounded poll gives up after a fixed
//! number of attempts; an unbounded poll only returns once the condition
//! holds.

use embedded_hal::delay::DelayNs;

/// Result of a [`Poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// The condition held
    Ready,
    /// The attempt bound was exhausted
    TimedOut,
}

impl PollOutcome {
    /// Whether the condition held
    #[inline]
    pub const fn is_ready(self) -> bool {
        matches!(self, PollOutcome::Ready)
    }
}

/// Polling policy: attempt bound plus the delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poll {
    attempts: Option<u32>,
    interval_us: u32,
}

impl Poll {
    /// Poll at most `attempts` times, waiting `interval_us` after each miss
    #[must_use]
    pub const fn bounded(attempts: u32, interval_us: u32) -> Self {
        Self {
            attempts: Some(attempts),
            interval_us,
        }
    }

    /// Poll until the condition holds, waiting `interval_us` after each miss
    #[must_use]
    pub const fn unbounded(interval_us: u32) -> Self {
        Self {
            attempts: None,
            interval_us,
        }
    }

    /// Attempt bound, `None` if unbounded
    #[inline]
    pub const fn attempts(&self) -> Option<u32> {
        self.attempts
    }

    /// Delay between attempts in microseconds
    #[inline]
    pub const fn interval_us(&self) -> u32 {
        self.interval_us
    }

    /// Run the poll.
    ///
    /// `ready` receives the target on every attempt so it can issue register
    /// reads through the same object that provides the delay.
    pub fn until<T, F>(&self, target: &mut T, mut ready: F) -> PollOutcome
    where
        T: DelayNs + ?Sized,
        F: FnMut(&mut T) -> bool,
    {
        match self.attempts {
            Some(attempts) => {
                for _ in 0..attempts {
                    if ready(target) {
                        return PollOutcome::Ready;
                    }
                    target.delay_us(self.interval_us);
                }
                PollOutcome::TimedOut
            }
            None => loop {
                if ready(target) {
                    return PollOutcome::Ready;
                }
                target.delay_us(self.interval_us);
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDelay;

    #[test]
    fn bounded_ready_immediately_does_not_delay() {
        let mut delay = MockDelay::new();
        let outcome = Poll::bounded(10, 100).until(&mut delay, |_| true);
        assert_eq!(outcome, PollOutcome::Ready);
        assert_eq!(delay.total_us(), 0);
    }

    #[test]
    fn bounded_times_out_after_attempts() {
        let mut delay = MockDelay::new();
        let mut calls = 0;
        let outcome = Poll::bounded(5, 100).until(&mut delay, |_| {
            calls += 1;
            false
        });
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(calls, 5);
        assert_eq!(delay.total_us(), 500);
    }

    #[test]
    fn bounded_succeeds_on_last_attempt() {
        let mut delay = MockDelay::new();
        let mut calls = 0;
        let outcome = Poll::bounded(3, 10).until(&mut delay, |_| {
            calls += 1;
            calls == 3
        });
        assert!(outcome.is_ready());
        assert_eq!(delay.total_us(), 20);
    }

    #[test]
    fn unbounded_waits_until_ready() {
        let mut delay = MockDelay::new();
        let outcome = Poll::unbounded(50).until(&mut delay, |d| d.total_us() >= 1_000);
        assert_eq!(outcome, PollOutcome::Ready);
        assert_eq!(delay.total_us(), 1_000);
    }

    #[test]
    fn zero_attempts_times_out_without_checking() {
        let mut delay = MockDelay::new();
        let outcome = Poll::bounded(0, 10).until(&mut delay, |_| true);
        assert_eq!(outcome, PollOutcome::TimedOut);
    }
}
