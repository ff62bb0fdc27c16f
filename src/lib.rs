//! # kaku433
//!
//! A portable, no_std Rust transmitter for "Klik aan Klik uit" (KaKu) compatible
//! 433 MHz mains switches, driven through a cheap OOK transmitter module such
//! as the FS1000A.
//!
//! The crate does two things:
//! - encodes an on/off command into a fixed 34-symbol KaKu frame
//! - reproduces that frame as precisely timed pulses on one output pin,
//!   repeated several times since the receiver never acknowledges anything
//!
//! It is built on:
//! - `embedded-hal` traits for the output pin and the delays
//! - `critical-section` to share one transmitter between contexts
//! - `heapless` for bounded unit lists
//!
//! ## Crate features
//! | Feature            | Description |
//! |--------------------|-------------|
//! | `std`              | Disables `#![no_std]` |
//! | `spin-delay`       | Adds [`timer::SpinDelay`], a busy-waiting `DelayNs` for hosts |
//! | `shared` (default) | Adds [`shared`], a `critical_section` guarded transmitter |
//! | `serde`            | Deserialises [`config::KakuConfig`] |
//! | `defmt-0-3`        | Uses `defmt` logging |
//! | `log`              | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use kaku433::config::TransmitConfig;
//! use kaku433::encoding::encode;
//! use kaku433::transmitter::KakuTransmitter;
//!
//! let frame = encode(0x12_3456, 0, 1, 2).unwrap();
//! println!("{frame}");
//!
//! # let mut expected = vec![PinTransaction::set(PinState::Low)];
//! # for _ in 0..20 {
//! #     for symbol in frame.symbols() {
//! #         for pulse in symbol.pulses() {
//! #             expected.push(PinTransaction::set(if pulse.high { PinState::High } else { PinState::Low }));
//! #         }
//! #     }
//! #     expected.push(PinTransaction::set(PinState::Low));
//! # }
//! # let tx_pin = Pin::new(&expected);
//! let mut transmitter = KakuTransmitter::new(tx_pin, NoopDelay::new(), TransmitConfig::default());
//! transmitter.transmit(&frame).unwrap();
//! # let (mut tx_pin, _) = transmitter.release();
//! # tx_pin.done();
//! ```
//!
//! For the whole command cycle (acquire the pin, one frame per unit, release
//! the pin) see [`platform::run_command`].
//!
//! ## Integration Notes
//!
//! - A base unit of about 300 µs decodes reliably; the 275/375 µs quoted for
//!   the receivers tends to fail once scheduling jitter is added
//! - With the defaults (20 repeats) one command keeps the line busy for
//!   about 1.6 s per unit
//! - On a non-realtime host, prefer [`timer::SpinDelay`] to a sleeping delay
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "shared")]
pub use critical_section;

pub use heapless;

#[macro_use]
mod fmt;

pub mod config;
pub mod consts;
pub mod encoding;
pub mod error;
pub mod platform;
#[cfg(feature = "shared")]
pub mod shared;
pub mod timer;
pub mod transmitter;

#[cfg(test)]
mod test_support;

pub use encoding::{Frame, Message, RemoteId, State, Unit, encode};
pub use error::{InvalidArgument, KakuError};
pub use transmitter::KakuTransmitter;
