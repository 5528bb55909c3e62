//! Process-command encoding and reply decoding.
//!
//! A frame is a plain concatenation of two-byte commands (command byte, operand
//! byte). There is no delimiter and no length prefix: the firmware knows the
//! arity of every opcode, and the host knows how many reply bytes a frame
//! elicits. [`CommandFrame`] tracks that reply length while it is built.

use crate::consts::opcode;
use crate::error::{Error, Result};
use crate::gpio::BitIndex;
use std::fmt;

/// Process-command opcodes (high nibble of a command byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Reset = opcode::PROCESS_RESET,
    ReadRegister = opcode::READ_REGISTER,
    SetRegister = opcode::SET_REGISTER,
    SetRegisterBit = opcode::SET_REGISTER_BIT,
    ClearRegisterBit = opcode::CLR_REGISTER_BIT,
    ReadRegisterBit = opcode::READ_REGISTER_BIT,
    WaitUntilBitSet = opcode::WAIT_UNTIL_BIT_IS_SET,
    WaitUntilBitCleared = opcode::WAIT_UNTIL_BIT_IS_CLEARED,
    Read16Incrementing = opcode::READ_16_BIT_REGISTER_INCR_ADDR,
    Read16Decrementing = opcode::READ_16_BIT_REGISTER_DECR_ADDR,
    RepeatCommandBuffer = opcode::REPEAT_CMD_BUFFER,
    SetData = opcode::SET_DATA,
}

impl Opcode {
    /// Raw opcode value, low nibble zero.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Splits a command byte into its opcode and inline low-nibble operand.
    /// Returns `None` for the unassigned opcodes 0xC0-0xF0.
    pub fn from_command_byte(byte: u8) -> Option<(Opcode, u8)> {
        let op = match byte & opcode::OPCODE_MASK {
            opcode::PROCESS_RESET => Opcode::Reset,
            opcode::READ_REGISTER => Opcode::ReadRegister,
            opcode::SET_REGISTER => Opcode::SetRegister,
            opcode::SET_REGISTER_BIT => Opcode::SetRegisterBit,
            opcode::CLR_REGISTER_BIT => Opcode::ClearRegisterBit,
            opcode::READ_REGISTER_BIT => Opcode::ReadRegisterBit,
            opcode::WAIT_UNTIL_BIT_IS_SET => Opcode::WaitUntilBitSet,
            opcode::WAIT_UNTIL_BIT_IS_CLEARED => Opcode::WaitUntilBitCleared,
            opcode::READ_16_BIT_REGISTER_INCR_ADDR => Opcode::Read16Incrementing,
            opcode::READ_16_BIT_REGISTER_DECR_ADDR => Opcode::Read16Decrementing,
            opcode::REPEAT_CMD_BUFFER => Opcode::RepeatCommandBuffer,
            opcode::SET_DATA => Opcode::SetData,
            _ => return None,
        };
        Some((op, byte & opcode::OPERAND_MASK))
    }

    /// True for opcodes that carry a bit index in the low nibble.
    pub const fn takes_bit_operand(self) -> bool {
        matches!(
            self,
            Opcode::SetRegisterBit
                | Opcode::ClearRegisterBit
                | Opcode::ReadRegisterBit
                | Opcode::WaitUntilBitSet
                | Opcode::WaitUntilBitCleared
        )
    }

    /// Number of reply bytes the firmware sends for this opcode.
    pub const fn response_len(self) -> usize {
        match self {
            // version byte
            Opcode::Reset => 1,
            Opcode::ReadRegister | Opcode::ReadRegisterBit => 1,
            Opcode::Read16Incrementing | Opcode::Read16Decrementing => 2,
            _ => 0,
        }
    }
}

/// The version query: a lone reset byte.
///
/// Every other command is two bytes long. The firmware answers a single
/// reset byte with its version and treats a following byte as a framing
/// error that restarts it, so the query is written on its own and is not a
/// [`CommandFrame`].
pub(crate) const VERSION_QUERY: [u8; 1] = [Opcode::Reset.code()];

/// Address stepping of a 16-bit burst read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstDirection {
    /// Read `addr`, then `addr + 1` (low byte first, e.g. ADCL/ADCH).
    Incrementing,
    /// Read `addr`, then `addr - 1`.
    Decrementing,
}

impl BurstDirection {
    fn opcode(self) -> Opcode {
        match self {
            BurstDirection::Incrementing => Opcode::Read16Incrementing,
            BurstDirection::Decrementing => Opcode::Read16Decrementing,
        }
    }
}

/// Byte order for [`decode_unsigned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// One or more process commands written to the device in a single call.
///
/// Built by chaining:
///
/// ```
/// use arduino_uart_api::{codec::CommandFrame, gpio::BitIndex};
///
/// let bit = BitIndex::new(5)?;
/// let frame = CommandFrame::new().set_bit(bit, 0x25).clear_bit(bit, 0x25);
/// assert_eq!(frame.as_bytes(), &[0x35, 0x25, 0x45, 0x25]);
/// assert_eq!(frame.response_len(), 0);
/// # Ok::<(), arduino_uart_api::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: Vec<u8>,
    response_len: usize,
}

impl CommandFrame {
    /// Creates an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, command: u8, operand: u8, op: Opcode) -> Self {
        self.bytes.push(command);
        self.bytes.push(operand);
        self.response_len += op.response_len();
        self
    }

    fn push_bit_command(self, op: Opcode, bit: BitIndex, register: u8) -> Self {
        debug_assert!(op.takes_bit_operand());
        self.push(op.code() | bit.value(), register, op)
    }

    /// `register = value`: loads the immediate data byte, then stores it.
    pub fn register_write(self, register: u8, value: u8) -> Self {
        self.push(Opcode::SetData.code(), value, Opcode::SetData)
            .push(Opcode::SetRegister.code(), register, Opcode::SetRegister)
    }

    /// Reads one register. Elicits 1 reply byte.
    pub fn register_read(self, register: u8) -> Self {
        self.push(Opcode::ReadRegister.code(), register, Opcode::ReadRegister)
    }

    /// Sets one bit of a register.
    pub fn set_bit(self, bit: BitIndex, register: u8) -> Self {
        self.push_bit_command(Opcode::SetRegisterBit, bit, register)
    }

    /// Clears one bit of a register.
    pub fn clear_bit(self, bit: BitIndex, register: u8) -> Self {
        self.push_bit_command(Opcode::ClearRegisterBit, bit, register)
    }

    /// Reads one bit of a register. Elicits 1 reply byte (0 or 1).
    pub fn read_bit(self, bit: BitIndex, register: u8) -> Self {
        self.push_bit_command(Opcode::ReadRegisterBit, bit, register)
    }

    /// Blocks the firmware until the bit reads 1. Commands sent meanwhile are
    /// buffered on the device.
    pub fn wait_until_set(self, bit: BitIndex, register: u8) -> Self {
        self.push_bit_command(Opcode::WaitUntilBitSet, bit, register)
    }

    /// Blocks the firmware until the bit reads 0.
    pub fn wait_until_cleared(self, bit: BitIndex, register: u8) -> Self {
        self.push_bit_command(Opcode::WaitUntilBitCleared, bit, register)
    }

    /// Reads a 16-bit register pair starting at `register`. Elicits 2 reply
    /// bytes, low byte first.
    pub fn burst_read16(self, register: u8, direction: BurstDirection) -> Self {
        let op = direction.opcode();
        self.push(op.code(), register, op)
    }

    /// Makes the firmware re-execute the last `count` buffered command bytes.
    pub fn replay_buffer(self, count: u8) -> Self {
        self.push(
            Opcode::RepeatCommandBuffer.code(),
            count,
            Opcode::RepeatCommandBuffer,
        )
    }

    /// Appends all commands of `other`.
    pub fn append(mut self, other: &CommandFrame) -> Self {
        self.bytes.extend_from_slice(&other.bytes);
        self.response_len += other.response_len;
        self
    }

    /// Wire bytes of the frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes on the wire.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of reply bytes the firmware will send for this frame.
    pub fn response_len(&self) -> usize {
        self.response_len
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pair) in self.bytes.chunks(2).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match Opcode::from_command_byte(pair[0]) {
                Some((op, nibble)) if op.takes_bit_operand() => write!(f, "{:?}[{}]", op, nibble)?,
                Some((op, _)) => write!(f, "{:?}", op)?,
                None => write!(f, "?{:02X}", pair[0])?,
            }
            if let Some(operand) = pair.get(1) {
                write!(f, "(0x{:02X})", operand)?;
            }
        }
        Ok(())
    }
}

/// Turns reply bytes into an unsigned integer.
///
/// An empty slice is an error rather than zero: it means the reply never
/// arrived. At most 4 bytes are accepted.
pub fn decode_unsigned(bytes: &[u8], order: ByteOrder) -> Result<u32> {
    if bytes.is_empty() {
        return Err(Error::Decode(
            "empty response where data was expected".to_string(),
        ));
    }
    if bytes.len() > 4 {
        return Err(Error::Decode(format!(
            "{} response bytes do not fit a 32-bit value",
            bytes.len()
        )));
    }
    let fold = |acc: u32, b: &u8| (acc << 8) | u32::from(*b);
    Ok(match order {
        ByteOrder::LittleEndian => bytes.iter().rev().fold(0, fold),
        ByteOrder::BigEndian => bytes.iter().fold(0, fold),
    })
}
