//! Logical pin to port/bit mapping for supported microcontroller variants.

use crate::consts::m328;
use crate::error::{Error, Result};
use crate::gpio::PinAddress;
use std::fmt;

/// An 8-bit I/O port of the microcontroller.
///
/// Each port owns three registers: PINx (input), DDRx (direction) and PORTx
/// (output). They sit at consecutive addresses, so only the output address
/// is stored and the other two are derived here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortId {
    B,
    C,
    D,
}

impl PortId {
    /// Address of the PORTx (output / pull-up enable) register.
    #[inline]
    pub const fn output_register(self) -> u8 {
        match self {
            PortId::B => m328::PORTB,
            PortId::C => m328::PORTC,
            PortId::D => m328::PORTD,
        }
    }

    /// Address of the DDRx (data direction) register.
    #[inline]
    pub const fn direction_register(self) -> u8 {
        self.output_register() - m328::DIRECTION_OFFSET
    }

    /// Address of the PINx (input) register.
    #[inline]
    pub const fn input_register(self) -> u8 {
        self.output_register() - m328::INPUT_OFFSET
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortId::B => 'B',
            PortId::C => 'C',
            PortId::D => 'D',
        };
        write!(f, "PORT{}", name)
    }
}

const fn pin(bit: u8, port: PortId) -> PinAddress {
    PinAddress::new_const(bit, port)
}

/// Arduino UNO pinout: D0-D7 on PORTD, D8-D13 on PORTB, A0-A5 (14-19) on PORTC.
const ATMEGA328P_PINS: [PinAddress; 20] = [
    pin(0, PortId::D),
    pin(1, PortId::D),
    pin(2, PortId::D),
    pin(3, PortId::D),
    pin(4, PortId::D),
    pin(5, PortId::D),
    pin(6, PortId::D),
    pin(7, PortId::D),
    pin(0, PortId::B),
    pin(1, PortId::B),
    pin(2, PortId::B),
    pin(3, PortId::B),
    pin(4, PortId::B),
    pin(5, PortId::B),
    pin(0, PortId::C),
    pin(1, PortId::C),
    pin(2, PortId::C),
    pin(3, PortId::C),
    pin(4, PortId::C),
    pin(5, PortId::C),
];

/// Immutable pin table of one microcontroller variant.
///
/// A table is handed to a [`DeviceSession`](crate::DeviceSession) when it is
/// created; nothing in the crate keeps a global copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinTable {
    name: &'static str,
    pins: &'static [PinAddress],
    analog_channels: u8,
}

impl PinTable {
    /// ATmega328P as wired on the Arduino UNO.
    pub const ATMEGA328P: PinTable = PinTable {
        name: "ATmega328P (Arduino UNO)",
        pins: &ATMEGA328P_PINS,
        analog_channels: m328::adc::CHANNEL_COUNT,
    };

    /// Human-readable variant name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of logical pins (valid pins are `0..pin_count()`).
    pub fn pin_count(&self) -> u8 {
        self.pins.len() as u8
    }

    /// Number of ADC multiplexer channels.
    pub fn analog_channels(&self) -> u8 {
        self.analog_channels
    }

    /// Looks up the port and bit behind a logical pin number.
    pub fn resolve(&self, pin: u8) -> Result<PinAddress> {
        self.pins
            .get(pin as usize)
            .copied()
            .ok_or(Error::InvalidPin {
                pin,
                pin_count: self.pin_count(),
            })
    }

    /// Checks an ADC channel against the variant's multiplexer.
    pub fn check_analog_channel(&self, channel: u8) -> Result<()> {
        if channel < self.analog_channels {
            Ok(())
        } else {
            Err(Error::InvalidAnalogChannel {
                channel,
                channel_count: self.analog_channels,
            })
        }
    }

    /// Iterates over all pin addresses in logical order.
    pub fn iter(&self) -> impl Iterator<Item = PinAddress> + '_ {
        self.pins.iter().copied()
    }
}

impl Default for PinTable {
    fn default() -> Self {
        PinTable::ATMEGA328P
    }
}
