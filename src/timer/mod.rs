//! Pulse timing and delay utilities for the KaKu transmitter.
//!
//! Every hold on the transmit line is a whole multiple of one base unit.
//! [`PulseTiming`] carries that base unit as an immutable value, so two
//! transmitters calibrated differently can coexist and tests can inject any
//! timing they like.
//!
//! Holds are realised through [`embedded_hal::delay::DelayNs`]. On a host
//! with the `spin-delay` feature, [`SpinDelay`] busy-waits on a monotonic
//! clock, which keeps edges within a few microseconds where a plain sleep is
//! at the mercy of the scheduler.
//!
//! Airtime at the default 300 µs base unit:
//!
//! | Part            | Base units | Duration |
//! |-----------------|------------|----------|
//! | start marker    |         10 |   3.0 ms |
//! | data bit        |          6 |   1.8 ms |
//! | stop marker     |          1 |   0.3 ms |
//! | gap after frame |         60 |  18.0 ms |
//! | whole repeat    |        263 |  78.9 ms |

use libm::roundf;

use crate::consts::{
    DEFAULT_BASE_UNIT_US, EXTENDED_GAP_UNITS, FRAME_GAP_UNITS, LONG_UNITS, MAX_BASE_UNIT_US,
    SHORT_UNITS,
};
use crate::encoding::Frame;
use crate::error::InvalidArgument;

#[cfg(feature = "spin-delay")]
mod spin;
#[cfg(feature = "spin-delay")]
pub use spin::*;

/// 1,000,000 microseconds = 1 second
pub const MICROSECONDS_PER_SECOND: f32 = 1_000_000.0;

/// Immutable timing calibration for one transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct PulseTiming {
    base_us: u32,
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            base_us: DEFAULT_BASE_UNIT_US,
        }
    }
}

impl PulseTiming {
    /// Creates a timing from a base unit in microseconds.
    ///
    /// # Errors
    /// [`InvalidArgument::BaseUnitOutOfRange`] when `base_us` is zero or
    /// larger than [`MAX_BASE_UNIT_US`].
    pub const fn new(base_us: u32) -> Result<Self, InvalidArgument> {
        if base_us == 0 || base_us > MAX_BASE_UNIT_US {
            Err(InvalidArgument::BaseUnitOutOfRange(base_us))
        } else {
            Ok(Self { base_us })
        }
    }

    /// Creates a timing from a base unit in seconds, rounded to the nearest
    /// microsecond (e.g. `300e-6`).
    pub fn from_secs(base_secs: f32) -> Result<Self, InvalidArgument> {
        let us = roundf(base_secs * MICROSECONDS_PER_SECOND);
        if us.is_nan() || us < 1.0 {
            return Err(InvalidArgument::BaseUnitOutOfRange(0));
        }
        // Float to int casts saturate, so oversized values still fail below.
        Self::new(us as u32)
    }

    /// The base unit in microseconds.
    pub const fn base_us(&self) -> u32 {
        self.base_us
    }

    /// Length of a hold of `units` base units, in microseconds.
    pub const fn hold_us(&self, units: u8) -> u32 {
        self.base_us * units as u32
    }

    /// A short pulse or gap.
    pub const fn short_us(&self) -> u32 {
        self.hold_us(SHORT_UNITS)
    }

    /// A long gap.
    pub const fn long_us(&self) -> u32 {
        self.hold_us(LONG_UNITS)
    }

    /// The extended gap, ten long gaps.
    pub const fn extended_gap_us(&self) -> u32 {
        self.hold_us(EXTENDED_GAP_UNITS)
    }

    /// Silence between two repeats of a frame.
    pub const fn frame_gap_us(&self) -> u32 {
        self.hold_us(FRAME_GAP_UNITS)
    }

    /// Airtime of one repeat of `frame`, including the trailing gap.
    pub fn frame_us(&self, frame: &Frame) -> u64 {
        u64::from(self.base_us) * u64::from(frame.units() + u32::from(FRAME_GAP_UNITS))
    }

    /// Airtime of a whole transmission of `frame` repeated `repeat_count` times.
    pub fn transmission_us(&self, frame: &Frame, repeat_count: u16) -> u64 {
        self.frame_us(frame) * u64::from(repeat_count)
    }
}
