//! Makes the board blink on its own: the two pin writes are marked in the
//! firmware's command buffer and replayed forever, with the device waiting
//! on pin A0 between iterations.

use arduino_uart_api::{serial, PinLevel, PinMode, PinTable, Result, SessionConfig};

fn main() -> Result<()> {
    env_logger::init();
    let mut board = serial::open_first(PinTable::ATMEGA328P, SessionConfig::default())?;

    board.set_pin_mode(13, PinMode::Output)?;
    board.set_pin_mode(14, PinMode::InputPullup)?;

    board.mark_buffer_position()?;
    board.write_digital_pin(13, PinLevel::High)?;
    // pull A0 to ground to let each iteration pass
    board.wait_until_pin_cleared(14)?;
    board.write_digital_pin(13, PinLevel::Low)?;
    board.wait_until_pin_set(14)?;
    let loop_len = board.session_state().replay_count();
    board.replay_from_mark()?;

    println!("Loop of {} command bytes running on the device.", loop_len);
    Ok(())
}
