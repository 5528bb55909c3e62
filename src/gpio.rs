//! Digital pin types and pin-level operations.

use crate::board::PortId;
use crate::codec::{decode_unsigned, ByteOrder, CommandFrame};
use crate::error::{Error, Result};
use crate::session::DeviceSession;
use crate::transport::SerialTransport;
use log::{debug, trace};

/// Logic level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    Low,
    High,
}

/// Direction of a digital pin, set through its DDRx bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
    /// Input with the internal pull-up enabled.
    InputPullup,
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

/// Represents a valid bit index inside an 8-bit register (0-7).
/// Use `BitIndex::new(num)` to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitIndex(u8);

impl BitIndex {
    /// Creates a new BitIndex, returning an error if the index is above 7.
    ///
    /// The command byte has room for 0-15, but registers are 8 bits wide; a
    /// larger index is always a caller bug and is never wrapped.
    pub fn new(bit: u8) -> Result<Self> {
        if bit <= 7 {
            Ok(BitIndex(bit))
        } else {
            Err(Error::InvalidBitIndex(bit))
        }
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the bit mask (1 << index).
    #[inline]
    pub fn mask(&self) -> u8 {
        1u8 << self.0
    }
}

/// Physical location of a logical pin: bit `bit` of port `port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinAddress {
    bit: BitIndex,
    port: PortId,
}

impl PinAddress {
    pub fn new(bit: BitIndex, port: PortId) -> Self {
        PinAddress { bit, port }
    }

    // For static pin tables; an index above 7 fails const evaluation.
    pub(crate) const fn new_const(bit: u8, port: PortId) -> Self {
        assert!(bit <= 7, "bit index out of range");
        PinAddress {
            bit: BitIndex(bit),
            port,
        }
    }

    #[inline]
    pub fn bit(&self) -> BitIndex {
        self.bit
    }

    #[inline]
    pub fn port(&self) -> PortId {
        self.port
    }
}

impl<T: SerialTransport> DeviceSession<T> {
    /// Drives an output pin high or low.
    pub fn write_digital_pin(&mut self, pin: u8, level: PinLevel) -> Result<()> {
        self.ensure_ready()?;
        let address = self.pin_table().resolve(pin)?;
        let register = address.port().output_register();
        trace!(
            "Setting pin {} {:?} ({} bit {})",
            pin,
            level,
            address.port(),
            address.bit().value()
        );
        let frame = match level {
            PinLevel::High => CommandFrame::new().set_bit(address.bit(), register),
            PinLevel::Low => CommandFrame::new().clear_bit(address.bit(), register),
        };
        self.send(&frame)
    }

    /// Reads the level of a pin from its port's input register.
    pub fn read_digital_pin(&mut self, pin: u8) -> Result<PinLevel> {
        self.ensure_ready()?;
        let address = self.pin_table().resolve(pin)?;
        let frame =
            CommandFrame::new().read_bit(address.bit(), address.port().input_register());
        let reply = self.execute(&frame)?;
        let level = PinLevel::from(decode_unsigned(&reply, ByteOrder::BigEndian)? != 0);
        trace!("Read pin {}: {:?}", pin, level);
        Ok(level)
    }

    /// Configures a pin as input, output or input with pull-up.
    ///
    /// `InputPullup` is two separate frames: clear the direction bit, then set
    /// the output bit, which enables the pull-up on an input pin.
    pub fn set_pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<()> {
        self.ensure_ready()?;
        let address = self.pin_table().resolve(pin)?;
        let port = address.port();
        let bit = address.bit();
        debug!("Setting pin {} mode {:?}", pin, mode);
        match mode {
            PinMode::Output => self.send(&CommandFrame::new().set_bit(bit, port.direction_register())),
            PinMode::Input => {
                self.send(&CommandFrame::new().clear_bit(bit, port.direction_register()))
            }
            PinMode::InputPullup => {
                self.send(&CommandFrame::new().clear_bit(bit, port.direction_register()))?;
                self.send(&CommandFrame::new().set_bit(bit, port.output_register()))
            }
        }
    }

    /// Blocks the firmware until the pin reads high. Later commands queue up on
    /// the device while it waits.
    pub fn wait_until_pin_set(&mut self, pin: u8) -> Result<()> {
        self.ensure_ready()?;
        let address = self.pin_table().resolve(pin)?;
        debug!("Device waits for pin {} to go high", pin);
        self.send(
            &CommandFrame::new().wait_until_set(address.bit(), address.port().input_register()),
        )
    }

    /// Blocks the firmware until the pin reads low.
    pub fn wait_until_pin_cleared(&mut self, pin: u8) -> Result<()> {
        self.ensure_ready()?;
        let address = self.pin_table().resolve(pin)?;
        debug!("Device waits for pin {} to go low", pin);
        self.send(
            &CommandFrame::new()
                .wait_until_cleared(address.bit(), address.port().input_register()),
        )
    }
}
