//! Error types returned by the encoder, the transmitter and the orchestration
//! helpers.

use embedded_hal::digital::ErrorKind;

/// Errors surfaced by this crate.
///
/// Every error is detected before the corresponding pulse would have been
/// emitted, except [`TransmissionInterrupted`](KakuError::TransmissionInterrupted)
/// and [`Pin`](KakuError::Pin), after which the line has been forced low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum KakuError {
    /// A caller supplied a value that does not fit the protocol.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    /// The output line could not be acquired, or the shared transmitter
    /// has not been set up.
    #[error("output pin unavailable")]
    ResourceUnavailable,
    /// The transmission was asked to stop before all repeats were sent.
    #[error("transmission interrupted")]
    TransmissionInterrupted,
    /// Driving the output line failed.
    #[error("output pin error: {0:?}")]
    Pin(ErrorKind),
}

/// Detail for [`KakuError::InvalidArgument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum InvalidArgument {
    /// Remote identity does not fit in 26 bits.
    #[error("remote identity {0} does not fit in 26 bits")]
    RemoteIdOutOfRange(u32),
    /// Unit index does not fit in 4 bits.
    #[error("unit {0} does not fit in 4 bits")]
    UnitOutOfRange(u8),
    /// A group or state flag was neither 0 nor 1.
    #[error("{0} is not a single bit")]
    NotABit(u8),
    /// A frame string contained a character outside `B`, `E`, `0`, `1`.
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(char),
    /// A frame string had the wrong number of symbols.
    #[error("frame has {0} symbols")]
    FrameLength(usize),
    /// Start or stop marker missing from, or repeated outside, its slot.
    #[error("start/stop marker out of place at symbol {0}")]
    MarkerPosition(usize),
    /// Repeat count of zero.
    #[error("repeat count must be positive")]
    ZeroRepeatCount,
    /// Base unit of zero or beyond the accepted maximum.
    #[error("base unit of {0} us is out of range")]
    BaseUnitOutOfRange(u32),
    /// A unit selection was empty.
    #[error("no units selected")]
    NoUnits,
    /// A unit selection listed more units than exist.
    #[error("more than 16 units selected")]
    TooManyUnits,
}

impl KakuError {
    /// Wraps a HAL pin error, keeping only its portable [`ErrorKind`].
    pub fn pin<E: embedded_hal::digital::Error>(err: E) -> Self {
        KakuError::Pin(err.kind())
    }
}
