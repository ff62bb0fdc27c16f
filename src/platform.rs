//! Scoped use of a platform output line.
//!
//! The transmitter only ever drives an already initialised pin. Setting the
//! pin up and handing it back belongs to the platform, described here by the
//! [`PinPlatform`] trait. [`run_command`] ties the two together: it validates
//! and encodes everything first, acquires the line, transmits one frame per
//! configured unit, and releases the line on every exit path.
//!
//! ## Example
//!
//! ```rust
//! # use core::convert::Infallible;
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::digital::{Mock as MockPin, State as PinState, Transaction as PinTransaction};
//! use kaku433::config::KakuConfig;
//! use kaku433::encoding::State;
//! use kaku433::platform::{PinPlatform, run_command};
//!
//! struct Board;
//!
//! impl PinPlatform for Board {
//!     type Pin = MockPin;
//!     type Error = Infallible;
//!
//!     fn acquire(&mut self, _pin: u8) -> Result<MockPin, Infallible> {
//!         # let mut expected = vec![PinTransaction::set(PinState::Low)];
//!         # for _ in 0..(1 + 32 * 2 + 1) {
//!         #     expected.push(PinTransaction::set(PinState::High));
//!         #     expected.push(PinTransaction::set(PinState::Low));
//!         # }
//!         # expected.push(PinTransaction::set(PinState::Low));
//!         # expected.push(PinTransaction::set(PinState::Low));
//!         Ok(MockPin::new(&expected))
//!     }
//!
//!     fn release(&mut self, mut pin: MockPin) {
//!         pin.done();
//!     }
//! }
//!
//! let config = KakuConfig::new(1234, 0, &[1]).unwrap().with_num_attempts(1).unwrap();
//! run_command(&mut Board, NoopDelay::new(), &config, State::On).unwrap();
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error, OutputPin};

use crate::config::KakuConfig;
use crate::encoding::State;
use crate::error::KakuError;
use crate::transmitter::KakuTransmitter;

/// Acquires and releases platform output lines.
///
/// `acquire` must return the line configured as an output. `release` returns
/// it to the platform, e.g. un-exporting a GPIO on Linux.
pub trait PinPlatform {
    /// The initialised output line.
    type Pin: OutputPin;
    /// Why a line could not be acquired.
    type Error: Error;

    /// Configures line `pin` as an output and hands it over.
    fn acquire(&mut self, pin: u8) -> Result<Self::Pin, Self::Error>;

    /// Takes the line back once transmission is over.
    fn release(&mut self, pin: Self::Pin);
}

/// An acquired line. Dropping it, also while unwinding, drives the line low
/// and hands it back to the platform.
struct Lease<'a, P: PinPlatform> {
    platform: &'a mut P,
    pin: Option<P::Pin>,
}

impl<P: PinPlatform> Drop for Lease<'_, P> {
    fn drop(&mut self) {
        if let Some(mut pin) = self.pin.take() {
            let _ = pin.set_low();
            self.platform.release(pin);
        }
    }
}

/// Sends `state` to every unit in `config`, acquiring the configured pin
/// for the duration.
///
/// # Errors
/// - [`KakuError::ResourceUnavailable`] when the platform refuses the pin;
///   nothing has been emitted.
/// - [`KakuError::Pin`] when the line cannot be driven low before the first
///   frame.
/// - Whatever [`KakuTransmitter::transmit`] returns.
///
/// The pin is forced low and released on every path once acquired.
pub fn run_command<P, D>(
    platform: &mut P,
    delay: D,
    config: &KakuConfig,
    state: State,
) -> Result<(), KakuError>
where
    P: PinPlatform,
    D: DelayNs,
{
    run_command_until(platform, delay, config, state, || false)
}

/// Like [`run_command`], but polls `interrupted` before every symbol and
/// stops with [`KakuError::TransmissionInterrupted`] once it returns `true`.
pub fn run_command_until<P, D, F>(
    platform: &mut P,
    delay: D,
    config: &KakuConfig,
    state: State,
    mut interrupted: F,
) -> Result<(), KakuError>
where
    P: PinPlatform,
    D: DelayNs,
    F: FnMut() -> bool,
{
    let messages = config.messages(state);

    let pin = match platform.acquire(config.transmit_pin()) {
        Ok(pin) => pin,
        Err(err) => {
            warn!(
                "kaku: pin {} unavailable: {:?}",
                config.transmit_pin(),
                err.kind()
            );
            return Err(KakuError::ResourceUnavailable);
        }
    };
    let mut lease = Lease {
        platform,
        pin: None,
    };
    let pin = lease.pin.insert(pin);

    let mut transmitter = KakuTransmitter::try_new(pin, delay, config.transmit())?;
    for message in &messages {
        transmitter.transmit_until(&message.encode(), &mut interrupted)?;
    }
    Ok(())
}
