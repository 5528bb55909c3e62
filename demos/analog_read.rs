use arduino_uart_api::{serial, PinLevel, PinMode, PinTable, Result, SessionConfig};
use std::{env, time::Instant};

const SAMPLES: u32 = 100;

fn main() -> Result<()> {
    env_logger::init();
    let config = SessionConfig::default();
    let table = PinTable::ATMEGA328P;

    // Optional port name as first argument, otherwise try all ports.
    let mut board = match env::args().nth(1) {
        Some(port) => arduino_uart_api::DeviceSession::open_port(
            &serial::SystemSerial,
            &port,
            table,
            config,
        )?,
        None => serial::open_first(table, config)?,
    };

    println!("A0 = {}", board.read_analog(0)?);

    let start = Instant::now();
    for _ in 0..SAMPLES {
        board.read_analog(0)?;
    }
    let rate = f64::from(SAMPLES) / start.elapsed().as_secs_f64();
    println!("analog read: {:.1} Hz", rate);

    board.set_pin_mode(14, PinMode::InputPullup)?;
    let start = Instant::now();
    let mut high = 0;
    for _ in 0..SAMPLES {
        if board.read_digital_pin(14)? == PinLevel::High {
            high += 1;
        }
    }
    let rate = f64::from(SAMPLES) / start.elapsed().as_secs_f64();
    println!("digital read: {:.1} Hz ({} of {} high)", rate, high, SAMPLES);
    Ok(())
}
