/// Declares a static global `KAKU_TRANSMITTER` protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `KAKU_TRANSMITTER` suitable for
/// firmware where several tasks or interrupt handlers may want to switch
/// something, but only one frame may be on air at a time.
///
/// # Arguments
/// - `$tx`: The concrete type of the TX pin (must implement `OutputPin`)
/// - `$delay`: The concrete type of the delay (must implement `DelayNs`)
///
/// # Example
/// ```rust
/// # use embedded_hal_mock::eh1::delay::NoopDelay;
/// # use embedded_hal_mock::eh1::digital::Mock as MyTxPinType;
/// kaku433::init_kaku_transmitter!(MyTxPinType, NoopDelay);
/// ```
#[macro_export]
macro_rules! init_kaku_transmitter {
    ( $tx:ty, $delay:ty ) => {
        pub static KAKU_TRANSMITTER: $crate::shared::SharedTransmitter<$tx, $delay> =
            $crate::shared::global_transmitter_init();
    };
}

/// Initializes the global `KAKU_TRANSMITTER` with a new transmitter.
///
/// # Arguments
/// - `$tx`: The TX pin (must implement `OutputPin`)
/// - `$delay`: The delay provider (must implement `DelayNs`)
/// - `$config`: A [`TransmitConfig`](crate::config::TransmitConfig)
///
/// # Notes
/// - Requires `init_kaku_transmitter!` to have been used earlier.
/// - Evaluates to the result of
///   [`global_transmitter_setup`](crate::shared::global_transmitter_setup),
///   which refuses the new transmitter while a frame is on air.
#[macro_export]
macro_rules! setup_kaku_transmitter {
    ( $tx:expr, $delay:expr, $config:expr ) => {
        $crate::shared::global_transmitter_setup(
            &KAKU_TRANSMITTER,
            $crate::transmitter::KakuTransmitter::new($tx, $delay, $config),
        )
    };
}

/// Sends a frame on the global `KAKU_TRANSMITTER`, waiting for any
/// transmission in progress.
///
/// # Example
/// ```rust,ignore
/// let frame = kaku433::encoding::encode(1234, 0, 1, 2)?;
/// kaku_transmit!(&frame)?;
/// ```
///
/// # Notes
/// - Evaluates to `Err(KakuError::ResourceUnavailable)` if the transmitter
///   hasn't been set up yet.
#[macro_export]
macro_rules! kaku_transmit {
    ( $frame:expr ) => {
        $crate::shared::global_transmit(&KAKU_TRANSMITTER, $frame)
    };
}
