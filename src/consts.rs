//! Internal constants, process-command opcodes and register addresses.

use std::time::Duration;

/// Version byte the firmware answers with after a single reset byte.
pub const PROTOCOL_VERSION: u8 = 6;

/// Default UART speed of the firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Default timeout for every blocking read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
/// The board resets when the port is opened; the bootloader needs this long
/// before the firmware listens.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);
/// How often the receive buffer is polled while a reply is outstanding.
pub const READ_POLL_INTERVAL: Duration = Duration::from_millis(1);

// --- Process commands ---
// High nibble of the command byte. Bit-oriented commands carry the bit index
// in the low nibble.
pub mod opcode {
    pub const PROCESS_RESET: u8 = 0x00;
    pub const READ_REGISTER: u8 = 0x10;
    pub const SET_REGISTER: u8 = 0x20;
    pub const SET_REGISTER_BIT: u8 = 0x30;
    pub const CLR_REGISTER_BIT: u8 = 0x40;
    pub const READ_REGISTER_BIT: u8 = 0x50;
    pub const WAIT_UNTIL_BIT_IS_SET: u8 = 0x60;
    pub const WAIT_UNTIL_BIT_IS_CLEARED: u8 = 0x70;
    pub const READ_16_BIT_REGISTER_INCR_ADDR: u8 = 0x80;
    pub const READ_16_BIT_REGISTER_DECR_ADDR: u8 = 0x90;
    pub const REPEAT_CMD_BUFFER: u8 = 0xA0;
    pub const SET_DATA: u8 = 0xB0;

    pub const OPCODE_MASK: u8 = 0xF0;
    pub const OPERAND_MASK: u8 = 0x0F;
}

// --- ATmega328P register map (data memory addresses) ---
pub mod m328 {
    // Only the output register is listed per port; DDRx and PINx are derived
    // from it (see `board::PortId`).
    pub const PORTB: u8 = 0x25;
    pub const PORTC: u8 = 0x28;
    pub const PORTD: u8 = 0x2B;

    /// Offset from PORTx down to DDRx.
    pub const DIRECTION_OFFSET: u8 = 1;
    /// Offset from PORTx down to PINx.
    pub const INPUT_OFFSET: u8 = 2;

    pub const ADCL: u8 = 0x78;
    pub const ADCH: u8 = 0x79;
    pub const ADCSRA: u8 = 0x7A;
    pub const ADCSRB: u8 = 0x7B;
    pub const ADMUX: u8 = 0x7C;

    pub mod adc {
        /// ADSC: start conversion, cleared by hardware when the result is ready.
        pub const ADSC_BIT: u8 = 6;
        /// ADEN | ADSC | prescaler /128.
        pub const ADCSRA_START: u8 = 0xC7;
        /// REFS0: AVcc reference, right adjusted result.
        pub const ADMUX_AVCC: u8 = 0x40;
        pub const ADMUX_CHANNEL_MASK: u8 = 0x0F;
        pub const RESULT_MASK: u16 = 0x03FF;
        pub const CHANNEL_COUNT: u8 = 8;
    }
}
