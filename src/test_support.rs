//! Recording fakes shared by the unit tests.
//!
//! [`RecordingPin`] and [`VirtualDelay`] write into the same [`Trace`]: pin
//! writes open a new `(level, duration)` entry, delays advance a virtual
//! clock and lengthen the current entry.

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

#[derive(Debug, Default)]
struct Recording {
    holds: Vec<(bool, u64)>,
    now_ns: u64,
    delay_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Trace(Rc<RefCell<Recording>>);

impl Trace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn set(&self, high: bool) {
        self.0.borrow_mut().holds.push((high, 0));
    }

    fn advance(&self, ns: u32) {
        let mut recording = self.0.borrow_mut();
        recording.now_ns += u64::from(ns);
        recording.delay_calls += 1;
        if let Some(last) = recording.holds.last_mut() {
            last.1 += u64::from(ns);
        }
    }

    /// Every level written, with how long it was held in microseconds.
    pub(crate) fn holds(&self) -> Vec<(bool, u64)> {
        self.0
            .borrow()
            .holds
            .iter()
            .map(|&(high, ns)| (high, ns / 1_000))
            .collect()
    }

    pub(crate) fn last_level(&self) -> Option<bool> {
        self.0.borrow().holds.last().map(|&(high, _)| high)
    }

    pub(crate) fn now_us(&self) -> u64 {
        self.0.borrow().now_ns / 1_000
    }

    /// How many times a delay was requested, including zero-length ones.
    pub(crate) fn delay_calls(&self) -> usize {
        self.0.borrow().delay_calls
    }
}

#[derive(Debug)]
pub(crate) struct RecordingPin(Trace);

impl RecordingPin {
    pub(crate) fn new(trace: &Trace) -> Self {
        Self(trace.clone())
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

/// Refuses to go high once `budget` writes have been made. Going low always
/// works, so the abort path can still be observed.
#[derive(Debug)]
pub(crate) struct FailingPin {
    trace: Trace,
    budget: usize,
}

impl FailingPin {
    pub(crate) fn new(trace: &Trace, budget: usize) -> Self {
        Self {
            trace: trace.clone(),
            budget,
        }
    }
}

impl ErrorType for FailingPin {
    type Error = ErrorKind;
}

impl OutputPin for FailingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.budget = self.budget.saturating_sub(1);
        self.trace.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.budget == 0 {
            return Err(ErrorKind::Other);
        }
        self.budget -= 1;
        self.trace.set(true);
        Ok(())
    }
}

/// A line that cannot be driven at all.
#[derive(Debug)]
pub(crate) struct StuckPin;

impl ErrorType for StuckPin {
    type Error = ErrorKind;
}

impl OutputPin for StuckPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }
}

#[derive(Debug)]
pub(crate) struct VirtualDelay(Trace);

impl VirtualDelay {
    pub(crate) fn new(trace: &Trace) -> Self {
        Self(trace.clone())
    }
}

impl DelayNs for VirtualDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.advance(ns);
    }
}
