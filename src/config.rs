//! Configuration records.
//!
//! [`KakuConfig`] mirrors the on-disk configuration of a deployment (remote
//! identity, group flag, units, transmit pin, repeat count and base unit).
//! Reading the file is left to the application; with the `serde` feature the
//! record deserialises from any serde format, with range checks applied while
//! deserialising. `name`, `group` and `unit` are required; the pin, repeat
//! count and base unit fall back to their defaults.
//!
//! [`TransmitConfig`] is the part the transmitter needs: timing and repeat
//! count.

use heapless::Vec;

use crate::consts::{DEFAULT_NUM_ATTEMPTS, DEFAULT_TRANSMIT_PIN, UNIT_COUNT};
use crate::encoding::{Message, RemoteId, State, Unit, bit};
use crate::error::{InvalidArgument, KakuError};
use crate::timer::PulseTiming;

/// Timing and repetition for one transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TransmitConfig {
    timing: PulseTiming,
    repeat_count: u16,
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            timing: PulseTiming::default(),
            repeat_count: DEFAULT_NUM_ATTEMPTS,
        }
    }
}

impl TransmitConfig {
    /// Creates a config sending each frame `repeat_count` times.
    ///
    /// # Errors
    /// [`InvalidArgument::ZeroRepeatCount`] when `repeat_count` is zero.
    pub const fn new(timing: PulseTiming, repeat_count: u16) -> Result<Self, InvalidArgument> {
        if repeat_count == 0 {
            Err(InvalidArgument::ZeroRepeatCount)
        } else {
            Ok(Self {
                timing,
                repeat_count,
            })
        }
    }

    /// The pulse timing.
    pub const fn timing(&self) -> PulseTiming {
        self.timing
    }

    /// How many times each frame is sent.
    pub const fn repeat_count(&self) -> u16 {
        self.repeat_count
    }
}

/// The units a command addresses, one frame each.
pub type Units = Vec<Unit, UNIT_COUNT>;

/// A deployment's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig"))]
pub struct KakuConfig {
    name: RemoteId,
    group: bool,
    units: Units,
    transmit_pin: u8,
    transmit: TransmitConfig,
}

impl KakuConfig {
    /// Creates a config for `name` addressing `units`, with the default pin,
    /// repeat count and base unit.
    ///
    /// # Errors
    /// [`KakuError::InvalidArgument`] when `name`, `group` or any unit is out
    /// of range, or when `units` is empty or longer than 16.
    pub fn new(name: u32, group: u8, units: &[u8]) -> Result<Self, KakuError> {
        if units.is_empty() {
            return Err(InvalidArgument::NoUnits.into());
        }
        if units.len() > UNIT_COUNT {
            return Err(InvalidArgument::TooManyUnits.into());
        }
        let mut checked = Units::new();
        for &unit in units {
            let _ = checked.push(Unit::new(unit)?);
        }
        Ok(Self {
            name: RemoteId::new(name)?,
            group: bit(group)?,
            units: checked,
            transmit_pin: DEFAULT_TRANSMIT_PIN,
            transmit: TransmitConfig::default(),
        })
    }

    /// Uses `pin` as the transmit line.
    pub fn with_transmit_pin(mut self, pin: u8) -> Self {
        self.transmit_pin = pin;
        self
    }

    /// Sends each frame `attempts` times.
    pub fn with_num_attempts(mut self, attempts: u16) -> Result<Self, KakuError> {
        self.transmit = TransmitConfig::new(self.transmit.timing(), attempts)?;
        Ok(self)
    }

    /// Uses a base unit of `base_us` microseconds.
    pub fn with_base_unit_us(mut self, base_us: u32) -> Result<Self, KakuError> {
        let timing = PulseTiming::new(base_us)?;
        self.transmit = TransmitConfig::new(timing, self.transmit.repeat_count())?;
        Ok(self)
    }

    /// Identity of the virtual remote.
    pub fn name(&self) -> RemoteId {
        self.name
    }

    /// Whether commands address the whole group.
    pub fn group(&self) -> bool {
        self.group
    }

    /// The addressed units, in sending order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// The platform identifier of the transmit line.
    pub fn transmit_pin(&self) -> u8 {
        self.transmit_pin
    }

    /// Timing and repeat count.
    pub fn transmit(&self) -> TransmitConfig {
        self.transmit
    }

    /// One message per configured unit, all requesting `state`.
    pub fn messages(&self, state: State) -> Vec<Message, UNIT_COUNT> {
        let mut messages = Vec::new();
        for &unit in &self.units {
            let _ = messages.push(Message::new(self.name, self.group, state, unit));
        }
        messages
    }
}

/// `unit` accepts either a single index or a list of them.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum UnitSelection {
    One(Unit),
    Many(Units),
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawConfig {
    name: RemoteId,
    group: u8,
    unit: UnitSelection,
    #[serde(default = "default_transmit_pin")]
    transmit_pin: u8,
    #[serde(default = "default_num_attempts")]
    num_attempts: u16,
    #[serde(default = "default_base_unit_us")]
    base_unit_us: u32,
}

#[cfg(feature = "serde")]
fn default_transmit_pin() -> u8 {
    DEFAULT_TRANSMIT_PIN
}

#[cfg(feature = "serde")]
fn default_num_attempts() -> u16 {
    DEFAULT_NUM_ATTEMPTS
}

#[cfg(feature = "serde")]
fn default_base_unit_us() -> u32 {
    crate::consts::DEFAULT_BASE_UNIT_US
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for KakuConfig {
    type Error = KakuError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let units = match raw.unit {
            UnitSelection::One(unit) => {
                let mut units = Units::new();
                let _ = units.push(unit);
                units
            }
            UnitSelection::Many(units) => units,
        };
        if units.is_empty() {
            return Err(InvalidArgument::NoUnits.into());
        }
        Ok(Self {
            name: raw.name,
            group: bit(raw.group)?,
            units,
            transmit_pin: raw.transmit_pin,
            transmit: TransmitConfig::new(
                PulseTiming::new(raw.base_unit_us)?,
                raw.num_attempts,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KakuConfig::new(1234, 0, &[1]).unwrap();
        assert_eq!(config.transmit_pin(), 18);
        assert_eq!(config.transmit().repeat_count(), 20);
        assert_eq!(config.transmit().timing().base_us(), 300);
        assert_eq!(config.units(), &[Unit::new(1).unwrap()]);
        assert_eq!(config.name().get(), 1234);
        assert!(!config.group());
    }

    #[test]
    fn test_builders() {
        let config = KakuConfig::new(1, 1, &[0, 2])
            .unwrap()
            .with_transmit_pin(17)
            .with_num_attempts(10)
            .unwrap()
            .with_base_unit_us(275)
            .unwrap();
        assert_eq!(config.transmit_pin(), 17);
        assert_eq!(config.transmit().repeat_count(), 10);
        assert_eq!(config.transmit().timing().base_us(), 275);
        assert!(config.group());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert_eq!(
            KakuConfig::new(1 << 26, 0, &[0]),
            Err(KakuError::InvalidArgument(
                InvalidArgument::RemoteIdOutOfRange(1 << 26)
            ))
        );
        assert_eq!(
            KakuConfig::new(0, 0, &[]),
            Err(KakuError::InvalidArgument(InvalidArgument::NoUnits))
        );
        assert_eq!(
            KakuConfig::new(0, 3, &[0]),
            Err(KakuError::InvalidArgument(InvalidArgument::NotABit(3)))
        );
        assert_eq!(
            KakuConfig::new(0, 0, &[0]).unwrap().with_num_attempts(0),
            Err(KakuError::InvalidArgument(InvalidArgument::ZeroRepeatCount))
        );
        assert_eq!(
            TransmitConfig::new(PulseTiming::default(), 0),
            Err(InvalidArgument::ZeroRepeatCount)
        );
    }

    #[test]
    fn test_messages_follow_unit_order() {
        let config = KakuConfig::new(99, 0, &[4, 1, 9]).unwrap();
        let messages = config.messages(State::Off);
        let units: std::vec::Vec<u8> = messages.iter().map(|m| m.unit.get()).collect();
        assert_eq!(units, [4, 1, 9]);
        assert!(messages.iter().all(|m| m.state == State::Off));
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;
        use serde::Deserialize;
        use serde::de::IntoDeserializer;
        use serde::de::value::{Error, MapDeserializer, SeqDeserializer};
        use std::vec::Vec;

        #[derive(Debug)]
        enum Field {
            Int(u32),
            List(Vec<u8>),
        }

        impl<'de> IntoDeserializer<'de, Error> for Field {
            type Deserializer = FieldDeserializer;

            fn into_deserializer(self) -> Self::Deserializer {
                FieldDeserializer(self)
            }
        }

        struct FieldDeserializer(Field);

        impl<'de> serde::Deserializer<'de> for FieldDeserializer {
            type Error = Error;

            fn deserialize_any<V: serde::de::Visitor<'de>>(
                self,
                visitor: V,
            ) -> Result<V::Value, Self::Error> {
                match self.0 {
                    Field::Int(v) => visitor.visit_u32(v),
                    Field::List(v) => {
                        visitor.visit_seq(SeqDeserializer::<_, Error>::new(v.into_iter()))
                    }
                }
            }

            serde::forward_to_deserialize_any! {
                bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
                bytes byte_buf option unit unit_struct newtype_struct seq tuple
                tuple_struct map struct enum identifier ignored_any
            }
        }

        fn parse(fields: Vec<(&'static str, Field)>) -> Result<KakuConfig, Error> {
            KakuConfig::deserialize(MapDeserializer::new(fields.into_iter()))
        }

        #[test]
        fn test_deserialize_single_unit_with_defaults() {
            let config = parse(vec![
                ("name", Field::Int(4321)),
                ("group", Field::Int(0)),
                ("unit", Field::Int(3)),
            ])
            .unwrap();
            assert_eq!(config, KakuConfig::new(4321, 0, &[3]).unwrap());
        }

        #[test]
        fn test_deserialize_unit_list_and_overrides() {
            let config = parse(vec![
                ("name", Field::Int(7)),
                ("group", Field::Int(1)),
                ("unit", Field::List(vec![1, 2])),
                ("transmit_pin", Field::Int(27)),
                ("num_attempts", Field::Int(12)),
            ])
            .unwrap();
            assert_eq!(config.units().len(), 2);
            assert_eq!(config.transmit_pin(), 27);
            assert_eq!(config.transmit().repeat_count(), 12);
            assert!(config.group());
        }

        #[test]
        fn test_deserialize_rejects_out_of_range() {
            let with = |name: u32, unit: u32, attempts: u32| {
                parse(vec![
                    ("name", Field::Int(name)),
                    ("group", Field::Int(0)),
                    ("unit", Field::Int(unit)),
                    ("num_attempts", Field::Int(attempts)),
                ])
            };
            assert!(with(1, 0, 1).is_ok());
            assert!(with(1 << 26, 0, 1).is_err());
            assert!(with(1, 16, 1).is_err());
            assert!(with(1, 0, 0).is_err());
            assert!(parse(vec![("name", Field::Int(1)), ("group", Field::Int(2)), ("unit", Field::Int(0))]).is_err());
        }

        #[test]
        fn test_deserialize_requires_group() {
            assert!(parse(vec![("name", Field::Int(1)), ("unit", Field::Int(0))]).is_err());
        }
    }
}
