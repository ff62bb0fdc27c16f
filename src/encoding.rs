//! KaKu message encoding.
//!
//! This module turns a command, made of a remote identity, a group flag, an
//! on/off state and a unit index, into a [`Frame`]: a fixed string of 34
//! [`Symbol`]s that the [`transmitter`](crate::transmitter) reproduces as
//! pulses.
//!
//! ## Frame Layout
//!
//! | Symbols | Content                                   |
//! |---------|-------------------------------------------|
//! | 1       | start marker `B`                          |
//! | 26      | remote identity, most significant bit first |
//! | 1       | group flag                                |
//! | 1       | state (`1` = on)                          |
//! | 4       | unit index, most significant bit first    |
//! | 1       | stop marker `E`                           |
//!
//! ## Pulse Recipes
//!
//! Each symbol maps onto a fixed recipe of holds, expressed in base units:
//!
//! | Symbol | Recipe                            |
//! |--------|-----------------------------------|
//! | `B`    | high 1, low 9                     |
//! | `E`    | high 1, low 0                     |
//! | `0`    | high 1, low 1, high 1, low 3      |
//! | `1`    | high 1, low 3, high 1, low 1      |
//!
//! ## Validation
//!
//! Nothing is ever truncated: an identity of `2^26` or a unit of `16` would
//! address a different physical receiver, so both are rejected with
//! [`KakuError::InvalidArgument`]. Frames parsed from text are rejected when
//! they hold anything but the four symbol characters.
//!
//! ## Example
//!
//! ```rust
//! use kaku433::encoding::encode;
//!
//! let frame = encode(1, 0, 0, 5).unwrap();
//! assert_eq!(
//!     frame.to_string(),
//!     "B00000000000000000000000001000101E"
//! );
//! ```

use core::fmt;
use core::str::FromStr;

use heapless::Vec;

use crate::consts::{
    FRAME_LEN, LONG_UNITS, REMOTE_ID_BITS, REMOTE_ID_MAX, SHORT_UNITS, START_CHAR,
    START_GAP_UNITS, STOP_CHAR, UNIT_BITS, UNIT_COUNT, UNIT_MAX,
};
use crate::error::{InvalidArgument, KakuError};

/// A 26-bit identity of a virtual remote control.
///
/// Receivers learn this value during pairing, so it must be reproduced
/// exactly on every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct RemoteId(u32);

impl RemoteId {
    /// Validates `id` as a 26-bit identity.
    pub const fn new(id: u32) -> Result<Self, InvalidArgument> {
        if id > REMOTE_ID_MAX {
            Err(InvalidArgument::RemoteIdOutOfRange(id))
        } else {
            Ok(Self(id))
        }
    }

    /// Raw identity value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for RemoteId {
    type Error = InvalidArgument;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<RemoteId> for u32 {
    fn from(id: RemoteId) -> u32 {
        id.0
    }
}

/// A 4-bit unit index (0 to 15) selecting one paired receiver or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Unit(u8);

impl Unit {
    /// Validates `unit` as a 4-bit index.
    pub const fn new(unit: u8) -> Result<Self, InvalidArgument> {
        if unit > UNIT_MAX {
            Err(InvalidArgument::UnitOutOfRange(unit))
        } else {
            Ok(Self(unit))
        }
    }

    /// Raw unit index.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Unit {
    type Error = InvalidArgument;

    fn try_from(unit: u8) -> Result<Self, Self::Error> {
        Self::new(unit)
    }
}

impl From<Unit> for u8 {
    fn from(unit: Unit) -> u8 {
        unit.0
    }
}

/// The switch state a command requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum State {
    /// Switch the receiver off.
    Off,
    /// Switch the receiver on. This is the default command.
    #[default]
    On,
}

impl State {
    /// The bit carried in the frame.
    pub const fn bit(self) -> bool {
        matches!(self, State::On)
    }
}

impl From<bool> for State {
    fn from(on: bool) -> Self {
        if on { State::On } else { State::Off }
    }
}

impl TryFrom<u8> for State {
    type Error = InvalidArgument;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        bit(value).map(State::from)
    }
}

/// Accepts only `0` and `1`.
pub(crate) const fn bit(value: u8) -> Result<bool, InvalidArgument> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(InvalidArgument::NotABit(other)),
    }
}

/// One command addressed to a single unit.
///
/// Built once per frame and never changed afterwards. Because every field is
/// validated on the way in, [`Message::encode`] cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Message {
    /// Identity of the virtual remote.
    pub remote: RemoteId,
    /// Address every unit paired with `remote` at once.
    pub group: bool,
    /// Requested state.
    pub state: State,
    /// Addressed unit.
    pub unit: Unit,
}

impl Message {
    /// Creates a message from already validated parts.
    pub const fn new(remote: RemoteId, group: bool, state: State, unit: Unit) -> Self {
        Self {
            remote,
            group,
            state,
            unit,
        }
    }

    /// Encodes the message into its 34-symbol frame.
    pub fn encode(&self) -> Frame {
        let mut symbols = [Symbol::Zero; FRAME_LEN];
        symbols[0] = Symbol::Start;
        let mut i = 1;
        for shift in (0..REMOTE_ID_BITS).rev() {
            symbols[i] = Symbol::from_bit(self.remote.get() >> shift & 1 == 1);
            i += 1;
        }
        symbols[i] = Symbol::from_bit(self.group);
        symbols[i + 1] = Symbol::from_bit(self.state.bit());
        i += 2;
        for shift in (0..UNIT_BITS).rev() {
            symbols[i] = Symbol::from_bit(self.unit.get() >> shift & 1 == 1);
            i += 1;
        }
        symbols[i] = Symbol::Stop;
        Frame { symbols }
    }
}

/// Encodes a command given as raw integers.
///
/// `identity` must fit in 26 bits, `unit` in 4 bits, and `group` and `state`
/// must each be `0` or `1`. Anything else is rejected rather than truncated.
pub fn encode(identity: u32, group: u8, state: u8, unit: u8) -> Result<Frame, KakuError> {
    let message = Message::new(
        RemoteId::new(identity)?,
        bit(group)?,
        State::try_from(state)?,
        Unit::new(unit)?,
    );
    Ok(message.encode())
}

/// Encodes one frame per unit index for the same remote, group and state.
///
/// Every argument is checked before any frame is produced, so a bad unit at
/// the end of the list never leaves the caller with a partial batch.
pub fn encode_units(
    identity: u32,
    group: u8,
    state: u8,
    units: &[u8],
) -> Result<Vec<Frame, UNIT_COUNT>, KakuError> {
    if units.is_empty() {
        return Err(InvalidArgument::NoUnits.into());
    }
    if units.len() > UNIT_COUNT {
        return Err(InvalidArgument::TooManyUnits.into());
    }
    let remote = RemoteId::new(identity)?;
    let group = bit(group)?;
    let state = State::try_from(state)?;
    let mut frames = Vec::new();
    for &unit in units {
        let frame = Message::new(remote, group, state, Unit::new(unit)?).encode();
        let _ = frames.push(frame);
    }
    Ok(frames)
}

/// One element of a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Symbol {
    /// Start marker, `B`.
    Start,
    /// Data bit `0`.
    Zero,
    /// Data bit `1`.
    One,
    /// Stop marker, `E`.
    Stop,
}

/// A single hold on the transmit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Pulse {
    /// `true` drives the line high (carrier on).
    pub high: bool,
    /// Length of the hold in base units. Zero means the next edge follows at once.
    pub units: u8,
}

impl Pulse {
    const fn high(units: u8) -> Self {
        Self { high: true, units }
    }

    const fn low(units: u8) -> Self {
        Self { high: false, units }
    }
}

static START_PULSES: [Pulse; 2] = [Pulse::high(SHORT_UNITS), Pulse::low(START_GAP_UNITS)];
static STOP_PULSES: [Pulse; 2] = [Pulse::high(SHORT_UNITS), Pulse::low(0)];
static ZERO_PULSES: [Pulse; 4] = [
    Pulse::high(SHORT_UNITS),
    Pulse::low(SHORT_UNITS),
    Pulse::high(SHORT_UNITS),
    Pulse::low(LONG_UNITS),
];
static ONE_PULSES: [Pulse; 4] = [
    Pulse::high(SHORT_UNITS),
    Pulse::low(LONG_UNITS),
    Pulse::high(SHORT_UNITS),
    Pulse::low(SHORT_UNITS),
];

impl Symbol {
    /// Maps a data bit onto its symbol.
    pub const fn from_bit(bit: bool) -> Self {
        if bit { Symbol::One } else { Symbol::Zero }
    }

    /// Parses one frame character.
    pub const fn from_char(c: char) -> Result<Self, InvalidArgument> {
        match c {
            START_CHAR => Ok(Symbol::Start),
            STOP_CHAR => Ok(Symbol::Stop),
            '0' => Ok(Symbol::Zero),
            '1' => Ok(Symbol::One),
            other => Err(InvalidArgument::UnknownSymbol(other)),
        }
    }

    /// The character used for this symbol in the textual frame form.
    pub const fn as_char(self) -> char {
        match self {
            Symbol::Start => START_CHAR,
            Symbol::Stop => STOP_CHAR,
            Symbol::Zero => '0',
            Symbol::One => '1',
        }
    }

    /// The holds that make up this symbol on air.
    pub fn pulses(self) -> &'static [Pulse] {
        match self {
            Symbol::Start => &START_PULSES,
            Symbol::Stop => &STOP_PULSES,
            Symbol::Zero => &ZERO_PULSES,
            Symbol::One => &ONE_PULSES,
        }
    }

    /// Total length of this symbol's recipe in base units.
    pub fn units(self) -> u32 {
        self.pulses().iter().map(|p| u32::from(p.units)).sum()
    }
}

/// An encoded command: exactly [`FRAME_LEN`] symbols with the start marker
/// first and the stop marker last.
///
/// A `Frame` can only be built by encoding a [`Message`] or by parsing a
/// string that passes validation, so the transmitter never sees a malformed
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Frame {
    symbols: [Symbol; FRAME_LEN],
}

impl Frame {
    /// The symbols in transmission order.
    pub fn symbols(&self) -> &[Symbol; FRAME_LEN] {
        &self.symbols
    }

    /// Recovers the message this frame was encoded from.
    pub fn decode(&self) -> Message {
        let data = &self.symbols[1..FRAME_LEN - 1];
        let (identity, rest) = data.split_at(REMOTE_ID_BITS as usize);
        let remote = RemoteId(bits_to_u32(identity));
        let group = data_bit(rest[0]);
        let state = State::from(data_bit(rest[1]));
        // Four symbols can hold at most 15.
        let unit = Unit(bits_to_u32(&rest[2..]) as u8);
        Message::new(remote, group, state, unit)
    }

    /// Length of one frame on air in base units, excluding the gap between repeats.
    pub fn units(&self) -> u32 {
        self.symbols.iter().map(|s| s.units()).sum()
    }
}

fn data_bit(symbol: Symbol) -> bool {
    symbol == Symbol::One
}

fn bits_to_u32(symbols: &[Symbol]) -> u32 {
    symbols
        .iter()
        .fold(0, |acc, &s| (acc << 1) | u32::from(data_bit(s)))
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            fmt::Write::write_char(f, symbol.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Frame {
    type Err = KakuError;

    /// Parses the textual `B…E` form.
    ///
    /// Unknown characters are a hard error: skipping them would transmit a
    /// shortened frame that no receiver decodes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut symbols = [Symbol::Zero; FRAME_LEN];
        let mut len = 0;
        for c in s.chars() {
            let symbol = Symbol::from_char(c)?;
            if len < FRAME_LEN {
                symbols[len] = symbol;
            }
            len += 1;
        }
        if len != FRAME_LEN {
            return Err(InvalidArgument::FrameLength(len).into());
        }
        for (i, &symbol) in symbols.iter().enumerate() {
            let expected_marker = match i {
                0 => Some(Symbol::Start),
                i if i == FRAME_LEN - 1 => Some(Symbol::Stop),
                _ => None,
            };
            let ok = match expected_marker {
                Some(marker) => symbol == marker,
                None => matches!(symbol, Symbol::Zero | Symbol::One),
            };
            if !ok {
                return Err(InvalidArgument::MarkerPosition(i).into());
            }
        }
        Ok(Self { symbols })
    }
}

impl TryFrom<&str> for Frame {
    type Error = KakuError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}
