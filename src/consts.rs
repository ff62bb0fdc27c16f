//! Constants used across the KaKu protocol implementation.
//!
//! This module defines the frame layout, the pulse multiples that make up each
//! symbol, and the documented defaults used when a configuration leaves a
//! field unset.
//!
//! ## Key Concepts
//!
//! - **Frame layout**: a start marker, 32 data bits and a stop marker.
//! - **Base unit**: every hold on the line is a whole multiple of one base
//!   unit of time. The receivers decode reliably at about 300 µs.
//! - **Repeats**: frames are sent back-to-back with a long silent gap, since
//!   the channel gives no acknowledgement.
//!
//! These values should be used wherever framing or timing logic is implemented
//! so that encoder, transmitter and airtime calculations agree.

/// Number of bits in a remote identity.
pub const REMOTE_ID_BITS: u32 = 26;

/// Largest remote identity that fits the frame (`2^26 - 1`).
pub const REMOTE_ID_MAX: u32 = (1 << REMOTE_ID_BITS) - 1;

/// Number of bits in a unit index.
pub const UNIT_BITS: u32 = 4;

/// Largest unit index that fits the frame (`15`).
pub const UNIT_MAX: u8 = (1 << UNIT_BITS) - 1;

/// Number of distinct unit indices; also the capacity of a unit selection.
pub const UNIT_COUNT: usize = 16;

/// Number of data bits in a frame: identity, group, state and unit.
pub const FRAME_DATA_BITS: usize = (REMOTE_ID_BITS + 1 + 1 + UNIT_BITS) as usize;

/// Total number of symbols in a frame, data bits plus both markers.
pub const FRAME_LEN: usize = FRAME_DATA_BITS + 2;

/// Character used for the start marker in the textual frame form.
pub const START_CHAR: char = 'B';

/// Character used for the stop marker in the textual frame form.
pub const STOP_CHAR: char = 'E';

/// Multiple of the base unit for a short pulse or gap.
pub const SHORT_UNITS: u8 = 1;

/// Multiple of the base unit for a long gap (`3 × short`).
pub const LONG_UNITS: u8 = 3 * SHORT_UNITS;

/// Multiple of the base unit for the low period following the start pulse.
pub const START_GAP_UNITS: u8 = 9 * SHORT_UNITS;

/// Multiple of the base unit for the extended gap (`10 × long`).
pub const EXTENDED_GAP_UNITS: u8 = 10 * LONG_UNITS;

/// Silence held after each frame before the next repeat (`2 × extended`).
pub const FRAME_GAP_UNITS: u8 = 2 * EXTENDED_GAP_UNITS;

/// Base unit the receivers are known to decode reliably, in microseconds.
///
/// Documentation for the receivers quotes 275 µs or 375 µs, but the latter
/// misses the decode window once scheduling jitter is added on a host.
pub const DEFAULT_BASE_UNIT_US: u32 = 300;

/// Largest accepted base unit, in microseconds.
pub const MAX_BASE_UNIT_US: u32 = 100_000;

/// Default number of times a frame is repeated.
pub const DEFAULT_NUM_ATTEMPTS: u16 = 20;

/// Default transmit line (BCM numbering on a Raspberry Pi).
pub const DEFAULT_TRANSMIT_PIN: u8 = 18;
