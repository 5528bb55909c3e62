//! Port discovery over a set of fake ports.

mod common;

use arduino_uart_api::{discover, Error, PinTable, SessionConfig, TransportOpener};
use common::{init_logging, test_config, Emulator};
use std::collections::HashMap;
use std::io;

/// Ports by name; a missing entry fails to open like a busy or absent port.
struct FakePorts {
    ports: HashMap<&'static str, Emulator>,
}

impl FakePorts {
    fn new(ports: &[(&'static str, Emulator)]) -> Self {
        FakePorts {
            ports: ports.iter().cloned().collect(),
        }
    }
}

impl TransportOpener for FakePorts {
    type Transport = Emulator;

    fn open(&self, identifier: &str, config: &SessionConfig) -> io::Result<Emulator> {
        assert_eq!(config.baud_rate, 115_200);
        self.ports.get(identifier).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", identifier))
        })
    }
}

#[test]
fn test_discover_skips_bad_candidates() {
    init_logging();
    let wrong_firmware = Emulator::with_version(Some(0x42));
    let silent = Emulator::with_version(None);
    let board = Emulator::new();
    let ports = FakePorts::new(&[
        ("/dev/ttyUSB0", wrong_firmware.clone()),
        ("/dev/ttyUSB1", silent.clone()),
        ("/dev/ttyACM0", board.clone()),
    ]);

    let session = discover(
        &ports,
        ["/dev/ttyS0", "/dev/ttyUSB0", "/dev/ttyUSB1", "/dev/ttyACM0"],
        PinTable::ATMEGA328P,
        test_config(),
    )
    .unwrap();

    assert!(session.is_ready());
    assert_eq!(board.writes(), vec![vec![0x00]]);
    // every tried port got exactly the version query
    assert_eq!(wrong_firmware.writes(), vec![vec![0x00]]);
    assert_eq!(silent.writes(), vec![vec![0x00]]);
}

#[test]
fn test_discover_stops_at_first_match() {
    init_logging();
    let first = Emulator::new();
    let second = Emulator::new();
    let ports = FakePorts::new(&[("COM3", first.clone()), ("COM4", second.clone())]);

    let names = vec!["COM3".to_string(), "COM4".to_string()];
    discover(&ports, &names, PinTable::ATMEGA328P, test_config()).unwrap();
    assert_eq!(first.writes().len(), 1);
    assert!(second.writes().is_empty());
}

#[test]
fn test_discover_exhausted() {
    init_logging();
    let ports = FakePorts::new(&[("/dev/ttyUSB0", Emulator::with_version(Some(1)))]);
    let result = discover(
        &ports,
        ["/dev/ttyUSB0", "/dev/ttyUSB1"],
        PinTable::ATMEGA328P,
        test_config(),
    );
    assert!(matches!(result, Err(Error::DeviceNotFound)));

    let empty: [&str; 0] = [];
    assert!(matches!(
        discover(&ports, empty, PinTable::ATMEGA328P, test_config()),
        Err(Error::DeviceNotFound)
    ));
}
