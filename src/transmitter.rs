//! Pulse transmitter for KaKu 433 MHz switches.
//!
//! This module provides the [`KakuTransmitter`] struct, which reproduces an
//! encoded [`Frame`] as On-Off Keyed pulses on a single digital output that
//! drives a cheap 433 MHz transmitter module (FS1000A and similar).
//!
//! The transmitter is blocking: a call returns once every repeat has been
//! emitted. The channel gives no acknowledgement, so success only ever means
//! that the waveform went out.
//!
//! ## Features
//!
//! - Per-symbol pulse recipes driven through `embedded-hal` traits
//! - Immutable timing calibration via [`TransmitConfig`]
//! - Cooperative interruption at symbol boundaries
//! - The line is forced low on every exit path
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use kaku433::config::TransmitConfig;
//! use kaku433::encoding::encode;
//! use kaku433::timer::PulseTiming;
//! use kaku433::transmitter::KakuTransmitter;
//!
//! # let mut expected = vec![PinTransaction::set(PinState::Low)];
//! # for symbol in encode(0, 0, 1, 0).unwrap().symbols() {
//! #     for pulse in symbol.pulses() {
//! #         expected.push(PinTransaction::set(if pulse.high { PinState::High } else { PinState::Low }));
//! #     }
//! # }
//! # expected.push(PinTransaction::set(PinState::Low));
//! # let tx_pin = Pin::new(&expected);
//! let config = TransmitConfig::new(PulseTiming::default(), 1).unwrap();
//! let mut transmitter = KakuTransmitter::new(tx_pin, NoopDelay::new(), config);
//!
//! let frame = encode(0, 0, 1, 0).unwrap();
//! transmitter.transmit(&frame).unwrap();
//! # let (mut tx_pin, _) = transmitter.release();
//! # tx_pin.done();
//! ```
//!
//! ## Timing Notes
//!
//! Holds go through [`DelayNs::delay_us`]. On hosts without a real-time
//! scheduler a sleeping delay can overshoot by more than a whole pulse; see
//! [`crate::timer`] for a spinning alternative.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::TransmitConfig;
use crate::consts::FRAME_GAP_UNITS;
use crate::encoding::{Frame, Message, Pulse};
use crate::error::KakuError;

/// A blocking KaKu transmitter owning one output line.
///
/// Owning the pin is what makes access exclusive: two transmissions can
/// never interleave on the same line. Wrap the transmitter in
/// [`crate::shared`] to hand it between contexts.
///
/// ## Type Parameters
///
/// - `TX`: A type implementing [`embedded_hal::digital::OutputPin`] wired to
///   the data input of the RF module
/// - `D`: A type implementing [`embedded_hal::delay::DelayNs`] used for every hold
#[derive(Debug)]
pub struct KakuTransmitter<TX, D>
where
    TX: OutputPin,
    D: DelayNs,
{
    tx: TX,
    delay: D,
    config: TransmitConfig,

    /// Number of complete frames put on air since construction, counting
    /// every repeat.
    pub frames_sent: u32,

    /// Number of transmissions that stopped before their last repeat.
    pub interrupted: u16,
}

impl<TX, D> KakuTransmitter<TX, D>
where
    TX: OutputPin,
    D: DelayNs,
{
    /// Creates a new transmitter on an already initialised output line.
    ///
    /// # Notes
    /// TX is driven `LOW` initially (carrier off). A failure to do so is
    /// ignored here; use [`try_new`](Self::try_new) to see it.
    pub fn new(mut tx: TX, delay: D, config: TransmitConfig) -> Self {
        let _ = tx.set_low(); // Ensure idle
        Self::idle(tx, delay, config)
    }

    /// Like [`new`](Self::new), but fails with [`KakuError::Pin`] when the
    /// line cannot be driven low, so nothing is sent on a line in an unknown
    /// state.
    pub fn try_new(mut tx: TX, delay: D, config: TransmitConfig) -> Result<Self, KakuError> {
        tx.set_low().map_err(KakuError::pin)?;
        Ok(Self::idle(tx, delay, config))
    }

    fn idle(tx: TX, delay: D, config: TransmitConfig) -> Self {
        Self {
            tx,
            delay,
            config,
            frames_sent: 0,
            interrupted: 0,
        }
    }

    /// The timing and repeat count in use.
    pub fn config(&self) -> TransmitConfig {
        self.config
    }

    /// Stops using the line and hands back the pin and delay.
    ///
    /// The line is low at this point: every transmission ends low, and so does
    /// every failed one.
    pub fn release(self) -> (TX, D) {
        (self.tx, self.delay)
    }

    /// Sends `frame` `repeat_count` times, blocking until done.
    pub fn transmit(&mut self, frame: &Frame) -> Result<(), KakuError> {
        self.transmit_until(frame, || false)
    }

    /// Sends `frame` like [`transmit`](Self::transmit), polling `interrupted`
    /// before every symbol.
    ///
    /// When `interrupted` returns `true` the current symbol is not started,
    /// the line is forced low and [`KakuError::TransmissionInterrupted`] is
    /// returned. Pin failures are handled the same way and surface as
    /// [`KakuError::Pin`].
    pub fn transmit_until<F>(&mut self, frame: &Frame, mut interrupted: F) -> Result<(), KakuError>
    where
        F: FnMut() -> bool,
    {
        debug!("kaku: sending {} x{}", frame, self.config.repeat_count());
        let result = self.emit(frame, &mut interrupted);
        if let Err(err) = result {
            if err == KakuError::TransmissionInterrupted {
                self.interrupted = self.interrupted.saturating_add(1);
            }
            warn!("kaku: transmission aborted after {} frames", self.frames_sent);
            // Never leave the carrier keyed.
            let _ = self.tx.set_low();
        }
        result
    }

    /// Parses `symbols` and sends the frame. Nothing is emitted when parsing
    /// fails.
    pub fn transmit_str(&mut self, symbols: &str) -> Result<(), KakuError> {
        let frame: Frame = symbols.parse()?;
        self.transmit(&frame)
    }

    /// Encodes and sends one message.
    pub fn send(&mut self, message: &Message) -> Result<(), KakuError> {
        self.transmit(&message.encode())
    }

    /// Sends each message in turn, stopping at the first failure.
    pub fn send_all(&mut self, messages: &[Message]) -> Result<(), KakuError> {
        for message in messages {
            self.send(message)?;
        }
        Ok(())
    }

    fn emit<F>(&mut self, frame: &Frame, interrupted: &mut F) -> Result<(), KakuError>
    where
        F: FnMut() -> bool,
    {
        for attempt in 0..self.config.repeat_count() {
            trace!("kaku: repeat {}", attempt);
            for symbol in frame.symbols() {
                if interrupted() {
                    return Err(KakuError::TransmissionInterrupted);
                }
                for pulse in symbol.pulses() {
                    self.emit_pulse(pulse)?;
                }
            }
            self.write_tx(false)?;
            self.hold(FRAME_GAP_UNITS);
            self.frames_sent = self.frames_sent.wrapping_add(1);
        }
        Ok(())
    }

    fn emit_pulse(&mut self, pulse: &Pulse) -> Result<(), KakuError> {
        self.write_tx(pulse.high)?;
        self.hold(pulse.units);
        Ok(())
    }

    fn write_tx(&mut self, high: bool) -> Result<(), KakuError> {
        if high {
            self.tx.set_high().map_err(KakuError::pin)
        } else {
            self.tx.set_low().map_err(KakuError::pin)
        }
    }

    fn hold(&mut self, units: u8) {
        if units > 0 {
            self.delay.delay_us(self.config.timing().hold_us(units));
        }
    }
}
