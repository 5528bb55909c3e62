//! ADC reads against the firmware emulator.

mod common;

use arduino_uart_api::{registers, Error};
use common::{ready_session, Emulator};

fn set_adc_result(emulator: &Emulator, low: u8, high: u8) {
    emulator.set_register(registers::ADCL, low);
    emulator.set_register(registers::ADCH, high);
}

#[test]
fn test_read_analog_value() {
    let emulator = Emulator::new();
    set_adc_result(&emulator, 0x00, 0x02);
    let mut session = ready_session(&emulator);

    assert_eq!(session.read_analog(0).unwrap(), 512);
}

#[test]
fn test_read_analog_is_single_frame() {
    let emulator = Emulator::new();
    let mut session = ready_session(&emulator);
    session.read_analog(3).unwrap();

    assert_eq!(
        emulator.writes(),
        vec![vec![
            0xB0, 0x43, 0x20, 0x7C, // ADMUX = AVcc | channel 3
            0xB0, 0xC7, 0x20, 0x7A, // ADCSRA = enable + start
            0x76, 0x7A, // wait until ADSC cleared, on the device
            0x80, 0x78, // ADCL, ADCH
        ]]
    );
    assert_eq!(emulator.register(registers::ADMUX), 0x43);
    assert_eq!(emulator.state().waits, vec![(0x76, 0x7A)]);
}

#[test]
fn test_read_analog_masks_to_ten_bits() {
    let emulator = Emulator::new();
    set_adc_result(&emulator, 0xFF, 0xFF);
    let mut session = ready_session(&emulator);
    assert_eq!(session.read_analog(1).unwrap(), 1023);
}

#[test]
fn test_read_adc_uses_preset_channel() {
    let emulator = Emulator::new();
    set_adc_result(&emulator, 0x34, 0x01);
    let mut session = ready_session(&emulator);

    assert_eq!(session.read_adc().unwrap(), 0x134);
    assert_eq!(
        emulator.writes(),
        vec![vec![0x36, 0x7A, 0x76, 0x7A, 0x80, 0x78]]
    );
    assert_eq!(emulator.register(registers::ADMUX), 0);
}

#[test]
fn test_invalid_channel() {
    let emulator = Emulator::new();
    let mut session = ready_session(&emulator);
    assert!(matches!(
        session.read_analog(8),
        Err(Error::InvalidAnalogChannel {
            channel: 8,
            channel_count: 8
        })
    ));
    assert_eq!(emulator.io_calls(), 0);
}

#[test]
fn test_missing_reply_times_out() {
    let emulator = Emulator::new();
    let mut session = ready_session(&emulator);
    emulator.state_mut().mute = true;
    assert!(matches!(
        session.read_analog(0),
        Err(Error::IoTimeout {
            expected: 2,
            received: 0
        })
    ));
    assert!(session.is_ready());
}
