use arduino_uart_api::{serial, PinLevel, PinMode, PinTable, Result, SessionConfig};
use std::{thread, time::Duration};

// On-board LED of the UNO
const BLINK_PIN: u8 = 13;

fn main() -> Result<()> {
    env_logger::init();
    println!("Looking for an Arduino with the process-command firmware...");
    let mut board = serial::open_first(PinTable::ATMEGA328P, SessionConfig::default())?;
    println!(
        "Board ready ({}, protocol version {:?}).",
        board.pin_table().name(),
        board.protocol_version()
    );

    board.set_pin_mode(BLINK_PIN, PinMode::Output)?;

    println!("Blinking pin {} (Press Ctrl+C to stop)", BLINK_PIN);
    loop {
        board.write_digital_pin(BLINK_PIN, PinLevel::High)?;
        thread::sleep(Duration::from_millis(500));
        board.write_digital_pin(BLINK_PIN, PinLevel::Low)?;
        thread::sleep(Duration::from_millis(500));
    }
}
