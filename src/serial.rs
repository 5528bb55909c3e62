//! Transport and port listing on top of the `serialport` crate.

use crate::board::PinTable;
use crate::config::SessionConfig;
use crate::discovery::discover;
use crate::error::Result;
use crate::session::DeviceSession;
use crate::transport::{SerialTransport, TransportOpener};
use log::{debug, trace};
use serialport::{ClearBuffer, SerialPort};
use std::fmt;
use std::io::{self, Read, Write};

/// Opens OS serial ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSerial;

impl TransportOpener for SystemSerial {
    type Transport = SerialPortTransport;

    fn open(&self, identifier: &str, config: &SessionConfig) -> io::Result<SerialPortTransport> {
        let port = serialport::new(identifier, config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(io::Error::from)?;
        Ok(SerialPortTransport {
            name: identifier.to_string(),
            port,
        })
    }
}

/// An open OS serial port.
pub struct SerialPortTransport {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialPortTransport {
    /// Wraps a port opened elsewhere, e.g. with custom flow control.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        let name = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        SerialPortTransport { name, port }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("name", &self.name)
            .finish()
    }
}

impl SerialTransport for SerialPortTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.port, bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match Read::read(&mut self.port, buf) {
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                trace!("{}: read timed out", self.name);
                Ok(0)
            }
            result => result,
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.port)
    }

    fn bytes_pending(&mut self) -> io::Result<usize> {
        let pending = self.port.bytes_to_read().map_err(io::Error::from)?;
        Ok(pending as usize)
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(io::Error::from)
    }
}

/// Names of all serial ports the OS reports.
pub fn available_port_names() -> Result<Vec<String>> {
    let names: Vec<String> = serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect();
    debug!("Serial ports: {:?}", names);
    Ok(names)
}

/// Opens the first serial port that answers the handshake.
///
/// **Warning:** Every listed port is opened in turn, which resets any Arduino
/// attached to it. Use [`DeviceSession::open_port`] when the port is known.
pub fn open_first(
    table: PinTable,
    config: SessionConfig,
) -> Result<DeviceSession<SerialPortTransport>> {
    discover(&SystemSerial, available_port_names()?, table, config)
}
