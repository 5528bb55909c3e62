//! Byte-stream capabilities the session is built on.
//!
//! The crate never talks to an OS serial API directly from the core; anything
//! implementing [`SerialTransport`] will do (see `serial` for the
//! `serialport`-backed implementation).

use crate::config::SessionConfig;
use std::io;

/// A blocking, bidirectional byte stream to the device.
pub trait SerialTransport {
    /// Writes all bytes.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Reads up to `buf.len()` bytes, blocking until at least one byte
    /// arrives or the transport's timeout passes. `Ok(0)` means timeout.
    ///
    /// The session only reads bytes [`bytes_pending`](Self::bytes_pending)
    /// reports and enforces its configured reply timeout itself.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Pushes buffered output onto the wire.
    fn flush(&mut self) -> io::Result<()>;

    /// Number of received bytes waiting to be read.
    fn bytes_pending(&mut self) -> io::Result<usize>;

    /// Drops everything waiting in the receive buffer.
    fn clear_input(&mut self) -> io::Result<()> {
        let mut scratch = [0u8; 64];
        let mut pending = self.bytes_pending()?;
        while pending > 0 {
            let chunk = pending.min(scratch.len());
            let read = self.read(&mut scratch[..chunk])?;
            if read == 0 {
                break;
            }
            pending = self.bytes_pending()?;
        }
        Ok(())
    }
}

impl<T: SerialTransport + ?Sized> SerialTransport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
    fn bytes_pending(&mut self) -> io::Result<usize> {
        (**self).bytes_pending()
    }
    fn clear_input(&mut self) -> io::Result<()> {
        (**self).clear_input()
    }
}

/// Opens transports by identifier (port name, path, ...).
pub trait TransportOpener {
    type Transport: SerialTransport;

    /// Opens `identifier` with the baud rate and read timeout from `config`.
    fn open(&self, identifier: &str, config: &SessionConfig) -> io::Result<Self::Transport>;
}
