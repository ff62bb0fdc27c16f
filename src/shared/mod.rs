//! One transmitter shared between contexts.
//!
//! Interleaved pulses from two commands would corrupt both frames, so only
//! one transmission may use the line at a time. The helpers here keep a
//! [`KakuTransmitter`] in a `critical_section::Mutex`. A caller checks it out
//! inside a short critical section, transmits with interrupts enabled, and
//! puts it back. While it is checked out, other callers see
//! [`nb::Error::WouldBlock`], and [`global_transmitter_setup`] refuses to
//! swap in another transmitter.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use kaku433::config::TransmitConfig;
//! use kaku433::encoding::encode;
//! use kaku433::shared::{SharedTransmitter, global_transmit, global_transmitter_init, global_transmitter_setup};
//! use kaku433::transmitter::KakuTransmitter;
//!
//! static KAKU: SharedTransmitter<Pin, NoopDelay> = global_transmitter_init();
//!
//! # let pin = Pin::new(&[PinTransaction::set(PinState::Low)]);
//! let previous = global_transmitter_setup(&KAKU, KakuTransmitter::new(pin, NoopDelay::new(), TransmitConfig::default()));
//! assert!(matches!(previous, Ok(None)));
//! // From any context:
//! # if false {
//! global_transmit(&KAKU, &encode(1234, 0, 1, 2).unwrap()).unwrap();
//! # }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use nb::block;

use crate::encoding::Frame;
use crate::error::KakuError;
use crate::transmitter::KakuTransmitter;

mod macros;

/// Where the shared transmitter currently is.
#[derive(Debug)]
pub enum Slot<T> {
    /// Not set up yet.
    Empty,
    /// Available for the next transmission.
    Ready(T),
    /// Checked out by a transmission in progress.
    Busy,
}

/// A transmitter guarded for use from several contexts.
pub type SharedTransmitter<TX, D> = Mutex<RefCell<Slot<KakuTransmitter<TX, D>>>>;

/// Used to initialize a global static [`SharedTransmitter`].
///
/// # Returns
/// * An empty slot; call [`global_transmitter_setup`] before transmitting.
pub const fn global_transmitter_init<TX: OutputPin, D: DelayNs>() -> SharedTransmitter<TX, D> {
    Mutex::new(RefCell::new(Slot::Empty))
}

/// Puts `transmitter` into the shared slot.
///
/// # Returns
/// - `Ok(Some(previous))` when it replaced an idle transmitter, so the
///   caller can release the old pin
/// - `Ok(None)` when the slot was empty
/// - `Err(transmitter)` while a transmission holds the slot; the line is
///   still in use and nothing changes
pub fn global_transmitter_setup<TX: OutputPin, D: DelayNs>(
    shared: &SharedTransmitter<TX, D>,
    transmitter: KakuTransmitter<TX, D>,
) -> Result<Option<KakuTransmitter<TX, D>>, KakuTransmitter<TX, D>> {
    critical_section::with(|cs| {
        let mut slot = shared.borrow(cs).borrow_mut();
        if matches!(*slot, Slot::Busy) {
            return Err(transmitter);
        }
        match core::mem::replace(&mut *slot, Slot::Ready(transmitter)) {
            Slot::Ready(previous) => Ok(Some(previous)),
            _ => Ok(None),
        }
    })
}

/// Takes the transmitter back out of the shared slot, e.g. to release its pin.
///
/// Returns `None` when the slot is empty or a transmission is in progress.
pub fn global_transmitter_take<TX: OutputPin, D: DelayNs>(
    shared: &SharedTransmitter<TX, D>,
) -> Option<KakuTransmitter<TX, D>> {
    critical_section::with(|cs| {
        let mut slot = shared.borrow(cs).borrow_mut();
        match core::mem::replace(&mut *slot, Slot::Empty) {
            Slot::Ready(transmitter) => Some(transmitter),
            other => {
                *slot = other;
                None
            }
        }
    })
}

/// Sends `frame` if the shared transmitter is free.
///
/// # Returns
/// - `Err(nb::Error::WouldBlock)` while another transmission holds it
/// - `Err(nb::Error::Other(KakuError::ResourceUnavailable))` if it was never set up
/// - otherwise the result of [`KakuTransmitter::transmit`]
pub fn try_global_transmit<TX: OutputPin, D: DelayNs>(
    shared: &SharedTransmitter<TX, D>,
    frame: &Frame,
) -> nb::Result<(), KakuError> {
    let mut transmitter = critical_section::with(|cs| {
        let mut slot = shared.borrow(cs).borrow_mut();
        match core::mem::replace(&mut *slot, Slot::Busy) {
            Slot::Ready(transmitter) => Ok(transmitter),
            Slot::Busy => Err(nb::Error::WouldBlock),
            Slot::Empty => {
                *slot = Slot::Empty;
                Err(nb::Error::Other(KakuError::ResourceUnavailable))
            }
        }
    })?;

    let result = transmitter.transmit(frame);

    critical_section::with(|cs| {
        let _ = shared.borrow(cs).replace(Slot::Ready(transmitter));
    });
    result.map_err(nb::Error::Other)
}

/// Sends `frame` on the shared transmitter, waiting for any transmission in
/// progress to finish first.
///
/// # Notes
/// - Waiting spins. On a single core, calling this from an interrupt that
///   preempted the current holder never returns; use
///   [`try_global_transmit`] there.
pub fn global_transmit<TX: OutputPin, D: DelayNs>(
    shared: &SharedTransmitter<TX, D>,
    frame: &Frame,
) -> Result<(), KakuError> {
    block!(try_global_transmit(shared, frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransmitConfig;
    use crate::encoding::encode;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    fn frame_transactions() -> Vec<PinTransaction> {
        let frame = encode(3, 0, 1, 3).unwrap();
        let mut expected = Vec::new();
        for symbol in frame.symbols() {
            for pulse in symbol.pulses() {
                expected.push(PinTransaction::set(if pulse.high {
                    PinState::High
                } else {
                    PinState::Low
                }));
            }
        }
        expected.push(PinTransaction::set(PinState::Low));
        expected
    }

    fn transmitter(expected: &[PinTransaction]) -> KakuTransmitter<PinMock, NoopDelay> {
        let mut all = vec![PinTransaction::set(PinState::Low)];
        all.extend_from_slice(expected);
        let config = TransmitConfig::new(Default::default(), 1).unwrap();
        KakuTransmitter::new(PinMock::new(&all), NoopDelay::new(), config)
    }

    #[test]
    fn test_unset_slot_is_unavailable() {
        static SHARED: SharedTransmitter<PinMock, NoopDelay> = global_transmitter_init();
        let frame = encode(3, 0, 1, 3).unwrap();
        assert_eq!(
            try_global_transmit(&SHARED, &frame),
            Err(nb::Error::Other(KakuError::ResourceUnavailable))
        );
        assert_eq!(
            global_transmit(&SHARED, &frame),
            Err(KakuError::ResourceUnavailable)
        );
        assert!(global_transmitter_take(&SHARED).is_none());
    }

    #[test]
    fn test_shared_transmit_returns_transmitter() {
        static SHARED: SharedTransmitter<PinMock, NoopDelay> = global_transmitter_init();
        let expected = [frame_transactions(), frame_transactions()].concat();
        assert!(matches!(
            global_transmitter_setup(&SHARED, transmitter(&expected)),
            Ok(None)
        ));

        let frame = encode(3, 0, 1, 3).unwrap();
        global_transmit(&SHARED, &frame).unwrap();
        global_transmit(&SHARED, &frame).unwrap();

        let transmitter = global_transmitter_take(&SHARED).unwrap();
        assert_eq!(transmitter.frames_sent, 2);
        let (mut pin, _) = transmitter.release();
        pin.done();
        assert!(global_transmitter_take(&SHARED).is_none());
    }

    #[test]
    fn test_busy_slot_would_block() {
        static SHARED: SharedTransmitter<PinMock, NoopDelay> = global_transmitter_init();
        critical_section::with(|cs| {
            let _ = SHARED.borrow(cs).replace(Slot::Busy);
        });
        let frame = encode(3, 0, 1, 3).unwrap();
        assert_eq!(
            try_global_transmit(&SHARED, &frame),
            Err(nb::Error::WouldBlock)
        );
        assert!(global_transmitter_take(&SHARED).is_none());
    }

    #[test]
    fn test_setup_refused_while_busy() {
        static SHARED: SharedTransmitter<PinMock, NoopDelay> = global_transmitter_init();
        critical_section::with(|cs| {
            let _ = SHARED.borrow(cs).replace(Slot::Busy);
        });

        let rejected = match global_transmitter_setup(&SHARED, transmitter(&[])) {
            Err(rejected) => rejected,
            Ok(_) => panic!("setup replaced a transmitter that was on air"),
        };
        let (mut pin, _) = rejected.release();
        pin.done();

        let frame = encode(3, 0, 1, 3).unwrap();
        assert_eq!(
            try_global_transmit(&SHARED, &frame),
            Err(nb::Error::WouldBlock)
        );
        assert!(global_transmitter_take(&SHARED).is_none());
    }

    #[test]
    fn test_setup_hands_back_idle_transmitter() {
        static SHARED: SharedTransmitter<PinMock, NoopDelay> = global_transmitter_init();
        assert!(matches!(
            global_transmitter_setup(&SHARED, transmitter(&[])),
            Ok(None)
        ));

        let previous = match global_transmitter_setup(&SHARED, transmitter(&[])) {
            Ok(Some(previous)) => previous,
            _ => panic!("previous transmitter was not handed back"),
        };
        let (mut pin, _) = previous.release();
        pin.done();

        let current = global_transmitter_take(&SHARED).unwrap();
        let (mut pin, _) = current.release();
        pin.done();
    }
}
