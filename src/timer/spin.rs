use core::hint::spin_loop;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// A [`DelayNs`] for hosts that busy-waits on [`Instant`].
///
/// General-purpose schedulers routinely oversleep by tens or hundreds of
/// microseconds, which is as long as a whole KaKu pulse. This delay spins on
/// the monotonic clock instead, and only hands the bulk of long holds (the
/// gaps between repeats) to [`std::thread::sleep`], spinning out the last
/// `sleep_margin` so the edge still lands on time.
///
/// # Example
/// ```rust
/// use embedded_hal::delay::DelayNs;
/// use kaku433::timer::SpinDelay;
///
/// let mut delay = SpinDelay::new();
/// delay.delay_us(300);
/// ```
///
/// # Notes
/// - Spinning keeps one core busy for the whole transmission.
/// - Preemption can still stretch a hold; running the process with a
///   real-time scheduling policy narrows that further.
#[derive(Debug, Clone, Copy)]
pub struct SpinDelay {
    sleep_above: Duration,
    sleep_margin: Duration,
}

impl Default for SpinDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinDelay {
    /// Spins for holds up to 5 ms and sleeps through longer ones, keeping
    /// 2 ms of spinning at the end.
    pub const fn new() -> Self {
        Self {
            sleep_above: Duration::from_millis(5),
            sleep_margin: Duration::from_millis(2),
        }
    }

    /// Spins for every hold, however long.
    pub const fn always_spin() -> Self {
        Self {
            sleep_above: Duration::MAX,
            sleep_margin: Duration::ZERO,
        }
    }

    /// Sleeps through holds longer than `sleep_above`, spinning for the last
    /// `sleep_margin` of each.
    pub const fn with_sleep(sleep_above: Duration, sleep_margin: Duration) -> Self {
        Self {
            sleep_above,
            sleep_margin,
        }
    }

    /// Waits until `deadline`.
    pub fn wait_until(&self, deadline: Instant) {
        let now = Instant::now();
        if deadline <= now {
            return;
        }
        let remaining = deadline - now;
        if remaining > self.sleep_above {
            std::thread::sleep(remaining.saturating_sub(self.sleep_margin));
        }
        while Instant::now() < deadline {
            spin_loop();
        }
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        let deadline = Instant::now() + Duration::from_nanos(u64::from(ns));
        self.wait_until(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_delay_waits_at_least_requested() {
        let mut delay = SpinDelay::new();
        let start = Instant::now();
        delay.delay_us(300);
        assert!(start.elapsed() >= Duration::from_micros(300));
    }

    #[test]
    fn test_long_hold_sleeps_then_spins() {
        let mut delay = SpinDelay::with_sleep(Duration::from_millis(1), Duration::from_micros(500));
        let start = Instant::now();
        delay.delay_ms(3);
        assert!(start.elapsed() >= Duration::from_millis(3));
    }

    #[test]
    fn test_past_deadline_returns() {
        let delay = SpinDelay::always_spin();
        let past = Instant::now();
        delay.wait_until(past);
    }
}
