//! # arduino-uart-api
//!
//! A Rust crate for driving the pins and registers of an ATmega328P
//! (Arduino UNO) from a host computer over UART, without writing per-project
//! firmware.
//!
//! The board runs a small fixed interpreter of *process commands*. Each
//! command is two bytes: an opcode in the high nibble of the first byte (with
//! a bit index in the low nibble for bit commands) and a register address or
//! data byte. This crate encodes pin and register operations into those
//! commands and handles the request/response exchange.
//!
//! ## Features
//!
//! *   Version handshake when a session opens (`DeviceSession::connect`, `open_port`).
//! *   Port discovery by probing candidates (`discover`, `serial::open_first`).
//! *   Arduino-style pin control (`set_pin_mode`, `write_digital_pin`, `read_digital_pin`).
//! *   Analog reads with the conversion wait executed on the device (`read_analog`, `read_adc`).
//! *   Direct register access (`read_register`, `write_register`, bit set/clear/read,
//!     16-bit burst reads).
//! *   Device-side waits (`wait_until_pin_set`, `wait_until_bit_cleared`, ...).
//! *   On-device loops by replaying the firmware's command buffer
//!     (`mark_buffer_position`, `replay_from_mark`).
//! *   Raw frame composition (`codec::CommandFrame`, `DeviceSession::execute`).
//!
//! ## Basic Usage
//!
//! ```no_run
//! use arduino_uart_api::{serial, PinLevel, PinMode, PinTable, Result, SessionConfig};
//! use std::{thread, time::Duration};
//!
//! fn main() -> Result<()> {
//!     // Optional: Initialize logging
//!     // env_logger::init();
//!
//!     let mut board = serial::open_first(PinTable::ATMEGA328P, SessionConfig::default())?;
//!
//!     board.set_pin_mode(13, PinMode::Output)?;
//!     board.write_digital_pin(13, PinLevel::High)?;
//!     thread::sleep(Duration::from_millis(500));
//!     board.write_digital_pin(13, PinLevel::Low)?;
//!
//!     println!("A0 = {}", board.read_analog(0)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Pin Mapping
//!
//! *   Pins 0-7 map to PORTD bits 0-7.
//! *   Pins 8-13 map to PORTB bits 0-5.
//! *   Pins 14-19 (A0-A5) map to PORTC bits 0-5.
//!
//! ## Threading
//!
//! Replies carry no request id, so a [`DeviceSession`] serves one caller at a
//! time. All operations take `&mut self`; wrap the session in a `Mutex` to
//! share it.

mod analog;
pub mod board;
pub mod codec;
mod config;
mod consts;
mod discovery;
mod error;
pub mod gpio;
#[cfg(feature = "serialport")]
pub mod serial;
mod session;
pub mod transport;

pub use board::{PinTable, PortId};
pub use codec::{decode_unsigned, BurstDirection, ByteOrder, CommandFrame, Opcode};
pub use config::SessionConfig;
pub use discovery::discover;
pub use error::{Error, HandshakeFailure, Result};
pub use gpio::{BitIndex, PinAddress, PinLevel, PinMode};
pub use session::{replay_count, DeviceSession, LinkState, SessionState};
pub use transport::{SerialTransport, TransportOpener};
// Re-export only essential public constants
pub use consts::{DEFAULT_BAUD_RATE, DEFAULT_SETTLE_DELAY, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

/// ATmega328P register addresses for use with the register-level API.
pub mod registers {
    pub use crate::consts::m328::{
        ADCH, ADCL, ADCSRA, ADCSRB, ADMUX, PORTB, PORTC, PORTD,
    };
    /// ADC control bits.
    pub mod adc {
        pub use crate::consts::m328::adc::{ADCSRA_START, ADMUX_AVCC, ADSC_BIT};
    }
}
