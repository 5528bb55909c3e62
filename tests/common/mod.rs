//! Firmware emulator used by the integration tests.
//!
//! Interprets the process-command stream against a 256-byte register file
//! and records everything the host does, so tests can check both the wire
//! bytes and the resulting device state.

#![allow(dead_code)]

use arduino_uart_api::{
    DeviceSession, PinTable, SerialTransport, SessionConfig, PROTOCOL_VERSION,
};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

pub const ADCSRA: u8 = 0x7A;
const ADSC: u8 = 1 << 6;

#[derive(Debug)]
pub struct FirmwareState {
    pub registers: [u8; 256],
    /// Reply to a reset byte; `None` stays silent.
    pub version: Option<u8>,
    /// Suppresses every reply.
    pub mute: bool,
    pub fail_writes: bool,
    /// One entry per host write call.
    pub writes: Vec<Vec<u8>>,
    pub rx: VecDeque<u8>,
    pub data: u8,
    pub flushes: usize,
    pub io_calls: usize,
    pub replays: Vec<u8>,
    pub waits: Vec<(u8, u8)>,
}

#[derive(Debug, Clone)]
pub struct Emulator {
    state: Rc<RefCell<FirmwareState>>,
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_version(Some(PROTOCOL_VERSION))
    }

    pub fn with_version(version: Option<u8>) -> Self {
        Emulator {
            state: Rc::new(RefCell::new(FirmwareState {
                registers: [0; 256],
                version,
                mute: false,
                fail_writes: false,
                writes: Vec::new(),
                rx: VecDeque::new(),
                data: 0,
                flushes: 0,
                io_calls: 0,
                replays: Vec::new(),
                waits: Vec::new(),
            })),
        }
    }

    pub fn state(&self) -> Ref<'_, FirmwareState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, FirmwareState> {
        self.state.borrow_mut()
    }

    /// Number of live handles; 1 means the session released its transport.
    pub fn handles(&self) -> usize {
        Rc::strong_count(&self.state)
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state().writes.clone()
    }

    pub fn last_write(&self) -> Vec<u8> {
        self.state().writes.last().cloned().unwrap_or_default()
    }

    pub fn io_calls(&self) -> usize {
        self.state().io_calls
    }

    pub fn register(&self, address: u8) -> u8 {
        self.state().registers[address as usize]
    }

    pub fn set_register(&self, address: u8, value: u8) {
        self.state_mut().registers[address as usize] = value;
    }

    /// Bytes that arrive before the host asks for anything.
    pub fn push_stale(&self, bytes: &[u8]) {
        self.state_mut().rx.extend(bytes.iter().copied());
    }

    pub fn clear_log(&self) {
        let mut state = self.state_mut();
        state.writes.clear();
        state.flushes = 0;
        state.io_calls = 0;
    }
}

impl FirmwareState {
    fn reply(&mut self, byte: u8) {
        if !self.mute {
            self.rx.push_back(byte);
        }
    }

    fn store(&mut self, address: u8, value: u8) {
        // a started conversion completes immediately
        let value = if address == ADCSRA { value & !ADSC } else { value };
        self.registers[address as usize] = value;
    }

    fn process(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            let command = bytes[i];
            let op = command & 0xF0;
            let bit = command & 0x0F;
            if op == 0x00 {
                if let Some(version) = self.version {
                    self.reply(version);
                }
                i += 1;
                continue;
            }
            let Some(&operand) = bytes.get(i + 1) else {
                break;
            };
            let reg = self.registers[operand as usize];
            match op {
                0x10 => self.reply(reg),
                0x20 => self.store(operand, self.data),
                0x30 => self.store(operand, reg | (1 << bit)),
                0x40 => self.store(operand, reg & !(1 << bit)),
                0x50 => self.reply((reg >> bit) & 1),
                0x60 | 0x70 => self.waits.push((command, operand)),
                0x80 => {
                    self.reply(reg);
                    self.reply(self.registers[operand.wrapping_add(1) as usize]);
                }
                0x90 => {
                    self.reply(reg);
                    self.reply(self.registers[operand.wrapping_sub(1) as usize]);
                }
                0xA0 => self.replays.push(operand),
                0xB0 => self.data = operand,
                _ => {}
            }
            i += 2;
        }
    }
}

impl SerialTransport for Emulator {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state_mut();
        state.io_calls += 1;
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        state.writes.push(bytes.to_vec());
        state.process(bytes);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state_mut();
        state.io_calls += 1;
        let mut n = 0;
        while n < buf.len() {
            match state.rx.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state_mut();
        state.io_calls += 1;
        state.flushes += 1;
        Ok(())
    }

    fn bytes_pending(&mut self) -> io::Result<usize> {
        let mut state = self.state_mut();
        state.io_calls += 1;
        Ok(state.rx.len())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        let mut state = self.state_mut();
        state.io_calls += 1;
        state.rx.clear();
        Ok(())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_config() -> SessionConfig {
    SessionConfig::default()
        .with_timeout(Duration::from_millis(20))
        .with_settle_delay(Duration::ZERO)
}

/// Opens a session on `emulator` and clears the handshake from its log.
pub fn ready_session(emulator: &Emulator) -> DeviceSession<Emulator> {
    init_logging();
    let session = DeviceSession::connect(emulator.clone(), PinTable::ATMEGA328P, test_config())
        .expect("handshake with emulator");
    emulator.clear_log();
    session
}
