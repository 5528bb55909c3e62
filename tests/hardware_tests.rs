// tests/hardware_tests.rs
#![cfg(feature = "serialport")]

use arduino_uart_api::{
    registers, serial, DeviceSession, PinLevel, PinMode, PinTable, Result, SessionConfig,
};
use std::{thread, time::Duration};

// Helper to open the first board found, panics on failure for test simplicity
fn open_test_device() -> DeviceSession<serial::SerialPortTransport> {
    serial::open_first(PinTable::ATMEGA328P, SessionConfig::default())
        .expect("Failed to find an Arduino with the process-command firmware. Is it connected?")
}

#[test]
#[ignore] // Ignore by default, requires hardware
fn test_led_output_readback() -> Result<()> {
    let mut board = open_test_device();
    println!("Testing output readback on pin 13");
    board.set_pin_mode(13, PinMode::Output)?;

    board.write_digital_pin(13, PinLevel::High)?;
    thread::sleep(Duration::from_millis(5));
    assert_eq!(
        board.read_digital_pin(13)?,
        PinLevel::High,
        "Pin should read HIGH"
    );

    board.write_digital_pin(13, PinLevel::Low)?;
    thread::sleep(Duration::from_millis(5));
    assert_eq!(
        board.read_digital_pin(13)?,
        PinLevel::Low,
        "Pin should read LOW"
    );

    board.set_pin_mode(13, PinMode::Input)?;
    Ok(())
}

#[test]
#[ignore] // Ignore by default, requires hardware
fn test_pullup_reads_high() -> Result<()> {
    // A0 must be left unconnected
    let mut board = open_test_device();
    board.set_pin_mode(14, PinMode::InputPullup)?;
    thread::sleep(Duration::from_millis(5));
    assert_eq!(board.read_digital_pin(14)?, PinLevel::High);
    Ok(())
}

#[test]
#[ignore] // Ignore by default, requires hardware
fn test_register_round_trip() -> Result<()> {
    let mut board = open_test_device();
    let saved = board.read_register(registers::PORTB)?;
    board.write_register(registers::PORTB, 0x20)?;
    assert_eq!(board.read_register(registers::PORTB)?, 0x20);
    board.write_register(registers::PORTB, saved)?;
    Ok(())
}

#[test]
#[ignore] // Ignore by default, requires hardware
fn test_analog_range() -> Result<()> {
    let mut board = open_test_device();
    for channel in 0..6 {
        let value = board.read_analog(channel)?;
        println!("A{} = {}", channel, value);
        assert!(value <= 1023);
    }
    Ok(())
}
