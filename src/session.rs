//! Device session: lifecycle, version handshake and request/response exchange.

use crate::board::PinTable;
use crate::codec::{decode_unsigned, BurstDirection, ByteOrder, CommandFrame, VERSION_QUERY};
use crate::config::SessionConfig;
use crate::consts;
use crate::error::{Error, HandshakeFailure, Result};
use crate::gpio::BitIndex;
use crate::transport::{SerialTransport, TransportOpener};
use log::{debug, trace, warn};
use std::time::{Duration, Instant};
use std::{fmt, io, thread};

/// Lifecycle of a [`DeviceSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No transport attached.
    Closed,
    /// Reset byte sent, waiting for the version reply.
    Handshaking,
    /// Version verified; operations are allowed.
    Ready,
}

/// Protocol bookkeeping of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    bytes_sent: u8,
    mark: u8,
    protocol_version: Option<u8>,
}

impl SessionState {
    /// Command bytes sent since the handshake, modulo 256. Mirrors the
    /// firmware's 8-bit command buffer position.
    pub fn bytes_sent(&self) -> u8 {
        self.bytes_sent
    }

    /// Counter value recorded by the last `mark_buffer_position`.
    pub fn mark(&self) -> u8 {
        self.mark
    }

    /// Version byte received during the handshake.
    pub fn protocol_version(&self) -> Option<u8> {
        self.protocol_version
    }

    /// Bytes sent since the mark, i.e. the replay length for the firmware.
    pub fn replay_count(&self) -> u8 {
        replay_count(self.mark, self.bytes_sent)
    }

    fn record_sent(&mut self, len: usize) {
        self.bytes_sent = self.bytes_sent.wrapping_add((len % 256) as u8);
    }
}

/// Distance from `marked` to `current` on the firmware's 8-bit buffer ring.
#[inline]
pub fn replay_count(marked: u8, current: u8) -> u8 {
    current.wrapping_sub(marked)
}

/// A verified connection to a process-command firmware.
///
/// One request is in flight at a time and replies carry no request id, so a
/// session must be driven from one thread; every operation takes `&mut self`.
pub struct DeviceSession<T: SerialTransport> {
    transport: Option<T>,
    link: LinkState,
    state: SessionState,
    table: PinTable,
    config: SessionConfig,
}

impl<T: SerialTransport> fmt::Debug for DeviceSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("link", &self.link)
            .field("state", &self.state)
            .field("board", &self.table.name())
            .field("config", &self.config)
            .finish()
    }
}

impl<T: SerialTransport> DeviceSession<T> {
    // --- Constructors and Info ---

    /// Creates a closed session for a board variant.
    pub fn new(table: PinTable, config: SessionConfig) -> Self {
        DeviceSession {
            transport: None,
            link: LinkState::Closed,
            state: SessionState::default(),
            table,
            config,
        }
    }

    /// Creates a session and performs the handshake on `transport`.
    pub fn connect(transport: T, table: PinTable, config: SessionConfig) -> Result<Self> {
        let mut session = Self::new(table, config);
        session.open(transport)?;
        Ok(session)
    }

    /// Opens `identifier` through `opener`, waits for the board to boot and
    /// performs the handshake.
    pub fn open_port<O>(
        opener: &O,
        identifier: &str,
        table: PinTable,
        config: SessionConfig,
    ) -> Result<Self>
    where
        O: TransportOpener<Transport = T>,
    {
        let transport = opener.open(identifier, &config)?;
        debug!("Opened {} at {} baud", identifier, config.baud_rate);
        if !config.settle_delay.is_zero() {
            trace!("Waiting {:?} for the board to boot", config.settle_delay);
            thread::sleep(config.settle_delay);
        }
        Self::connect(transport, table, config)
    }

    /// Attaches `transport` and verifies the firmware version.
    ///
    /// Sends a lone reset byte and expects [`PROTOCOL_VERSION`](crate::PROTOCOL_VERSION)
    /// back within the timeout. On failure the transport is dropped and the
    /// session stays closed.
    pub fn open(&mut self, mut transport: T) -> Result<()> {
        if self.transport.take().is_some() {
            warn!("Replacing the transport of an open session");
        }
        self.link = LinkState::Handshaking;
        self.state = SessionState::default();
        debug!("Handshaking ({})", self.table.name());

        match handshake(&mut transport, self.config.timeout) {
            Ok(version) => {
                self.state.protocol_version = Some(version);
                self.transport = Some(transport);
                self.link = LinkState::Ready;
                debug!("Session ready, protocol version {}", version);
                Ok(())
            }
            Err(failure) => {
                warn!("Handshake failed: {}", failure);
                self.link = LinkState::Closed;
                Err(Error::HandshakeFailed(failure))
            }
        }
    }

    /// Closes the session and hands the transport back.
    pub fn close(&mut self) -> Option<T> {
        if self.link != LinkState::Closed {
            debug!("Closing session");
        }
        self.link = LinkState::Closed;
        self.state = SessionState::default();
        self.transport.take()
    }

    pub fn state(&self) -> LinkState {
        self.link
    }

    pub fn is_ready(&self) -> bool {
        self.link == LinkState::Ready
    }

    /// Counter, mark and handshake result.
    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    /// Version reported by the firmware, if the session is open.
    pub fn protocol_version(&self) -> Option<u8> {
        self.state.protocol_version
    }

    pub fn pin_table(&self) -> &PinTable {
        &self.table
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The attached transport, if any.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    #[inline]
    pub(crate) fn ensure_ready(&self) -> Result<()> {
        if self.link == LinkState::Ready && self.transport.is_some() {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    // A transport failure ends the session; there is no reconnect.
    fn fail(&mut self, err: io::Error) -> Error {
        warn!("Transport error, closing session: {}", err);
        self.close();
        Error::Transport(err)
    }

    // --- Request/Response ---

    /// Sends `frame` and reads exactly `frame.response_len()` reply bytes.
    ///
    /// Stale input is discarded before any frame that expects a reply.
    /// A short reply is [`Error::IoTimeout`] and leaves the session open; a
    /// transport failure closes it.
    pub fn execute(&mut self, frame: &CommandFrame) -> Result<Vec<u8>> {
        self.ensure_ready()?;
        if frame.is_empty() {
            return Ok(Vec::new());
        }
        let expected = frame.response_len();
        let timeout = self.config.timeout;
        let result = match self.transport.as_mut() {
            Some(transport) => exchange(transport, &mut self.state, frame, timeout),
            None => return Err(Error::NotReady),
        };
        match result {
            Ok(reply) if reply.len() == expected => Ok(reply),
            Ok(reply) => {
                debug!(
                    "Reply timed out after {} of {} bytes",
                    reply.len(),
                    expected
                );
                Err(Error::IoTimeout {
                    expected,
                    received: reply.len(),
                })
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // Frames without a reply.
    pub(crate) fn send(&mut self, frame: &CommandFrame) -> Result<()> {
        debug_assert_eq!(frame.response_len(), 0);
        self.execute(frame).map(|_| ())
    }

    fn read_byte(&mut self, frame: &CommandFrame) -> Result<u8> {
        let reply = self.execute(frame)?;
        Ok(decode_unsigned(&reply, ByteOrder::BigEndian)? as u8)
    }

    // --- Register Access ---

    /// Reads a register by data-memory address.
    pub fn read_register(&mut self, address: u8) -> Result<u8> {
        let value = self.read_byte(&CommandFrame::new().register_read(address))?;
        debug!("registerRead: 0x{:02X} = 0x{:02X}", address, value);
        Ok(value)
    }

    /// Writes a register by data-memory address.
    pub fn write_register(&mut self, address: u8, value: u8) -> Result<()> {
        debug!("registerWrite: 0x{:02X} = 0x{:02X}", address, value);
        self.send(&CommandFrame::new().register_write(address, value))
    }

    pub fn set_register_bit(&mut self, bit: u8, address: u8) -> Result<()> {
        self.ensure_ready()?;
        let bit = BitIndex::new(bit)?;
        self.send(&CommandFrame::new().set_bit(bit, address))
    }

    pub fn clear_register_bit(&mut self, bit: u8, address: u8) -> Result<()> {
        self.ensure_ready()?;
        let bit = BitIndex::new(bit)?;
        self.send(&CommandFrame::new().clear_bit(bit, address))
    }

    /// Reads a single register bit; `true` when set.
    pub fn read_register_bit(&mut self, bit: u8, address: u8) -> Result<bool> {
        self.ensure_ready()?;
        let bit = BitIndex::new(bit)?;
        Ok(self.read_byte(&CommandFrame::new().read_bit(bit, address))? != 0)
    }

    /// Blocks the firmware until the register bit is set.
    pub fn wait_until_bit_set(&mut self, bit: u8, address: u8) -> Result<()> {
        self.ensure_ready()?;
        let bit = BitIndex::new(bit)?;
        debug!(
            "Device waits for bit {} of 0x{:02X} to be set",
            bit.value(),
            address
        );
        self.send(&CommandFrame::new().wait_until_set(bit, address))
    }

    /// Blocks the firmware until the register bit is cleared.
    pub fn wait_until_bit_cleared(&mut self, bit: u8, address: u8) -> Result<()> {
        self.ensure_ready()?;
        let bit = BitIndex::new(bit)?;
        debug!(
            "Device waits for bit {} of 0x{:02X} to be cleared",
            bit.value(),
            address
        );
        self.send(&CommandFrame::new().wait_until_cleared(bit, address))
    }

    /// Reads a 16-bit register pair, low byte at `address`.
    pub fn read_register16(&mut self, address: u8, direction: BurstDirection) -> Result<u16> {
        let reply = self.execute(&CommandFrame::new().burst_read16(address, direction))?;
        let value = decode_unsigned(&reply, ByteOrder::LittleEndian)? as u16;
        trace!("Read16 0x{:02X} {:?} = 0x{:04X}", address, direction, value);
        Ok(value)
    }

    // --- Command Buffer ---

    /// Remembers the current position in the firmware's command buffer.
    pub fn mark_buffer_position(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.state.mark = self.state.bytes_sent;
        debug!("Command buffer mark at {}", self.state.mark);
        Ok(())
    }

    /// Makes the firmware re-execute everything sent since the mark.
    ///
    /// The replay command itself is buffered too, so the device keeps looping
    /// over the marked block.
    pub fn replay_from_mark(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let count = self.state.replay_count();
        if count == 0 {
            warn!("Nothing sent since the buffer mark, replaying 0 bytes");
        }
        debug!(
            "Replaying last {} command bytes (mark {}, counter {})",
            count, self.state.mark, self.state.bytes_sent
        );
        self.send(&CommandFrame::new().replay_buffer(count))
    }

    /// Restarts the firmware's command interpreter and checks the version it
    /// answers with. Any failure closes the session.
    ///
    /// The reset byte is counted like any other sent byte and the mark is
    /// kept, so a mark set before the reset still refers to command buffer
    /// positions from before it. Call [`mark_buffer_position`](Self::mark_buffer_position)
    /// again before replaying.
    pub fn software_reset(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let timeout = self.config.timeout;
        let result = match self.transport.as_mut() {
            Some(transport) => handshake(transport, timeout),
            None => return Err(Error::NotReady),
        };
        match result {
            Ok(_) => {
                self.state.record_sent(VERSION_QUERY.len());
                debug!("Software reset done");
                Ok(())
            }
            Err(failure) => {
                warn!("Software reset failed: {}", failure);
                self.close();
                Err(Error::HandshakeFailed(failure))
            }
        }
    }
}

fn handshake<T: SerialTransport>(
    transport: &mut T,
    timeout: Duration,
) -> std::result::Result<u8, HandshakeFailure> {
    let failed = |e: io::Error| HandshakeFailure::Transport(e.to_string());
    if transport.bytes_pending().map_err(failed)? > 0 {
        transport.clear_input().map_err(failed)?;
    }
    trace!("Writing version query: {:02X?}", VERSION_QUERY);
    transport.write(&VERSION_QUERY).map_err(failed)?;
    transport.flush().map_err(failed)?;

    let mut reply = [0u8; 1];
    if read_full(transport, &mut reply, timeout).map_err(failed)? == 0 {
        return Err(HandshakeFailure::NoReply);
    }
    trace!("Version reply: {:02X?}", reply);
    match reply[0] {
        consts::PROTOCOL_VERSION => Ok(reply[0]),
        actual => Err(HandshakeFailure::VersionMismatch {
            expected: consts::PROTOCOL_VERSION,
            actual,
        }),
    }
}

fn exchange<T: SerialTransport>(
    transport: &mut T,
    state: &mut SessionState,
    frame: &CommandFrame,
    timeout: Duration,
) -> io::Result<Vec<u8>> {
    if frame.response_len() > 0 {
        let pending = transport.bytes_pending()?;
        if pending > 0 {
            warn!("Discarding {} stale input bytes", pending);
            transport.clear_input()?;
        }
    }
    trace!("Writing frame [{}]: {:02X?}", frame, frame.as_bytes());
    transport.write(frame.as_bytes())?;
    transport.flush()?;
    state.record_sent(frame.len());

    let mut reply = vec![0u8; frame.response_len()];
    if !reply.is_empty() {
        let received = read_full(transport, &mut reply, timeout)?;
        reply.truncate(received);
        trace!("Read {} reply bytes: {:02X?}", received, reply);
    }
    Ok(reply)
}

// Reads until `buf` is full or `timeout` has passed; returns bytes read.
// Only bytes the transport already holds are read, so the deadline holds
// whatever read timeout the transport itself was opened with.
fn read_full<T: SerialTransport>(
    transport: &mut T,
    buf: &mut [u8],
    timeout: Duration,
) -> io::Result<usize> {
    let deadline = Instant::now() + timeout;
    let mut filled = 0;
    while filled < buf.len() {
        let pending = transport.bytes_pending()?;
        if pending > 0 {
            let end = buf.len().min(filled + pending);
            let n = transport.read(&mut buf[filled..end])?;
            if n > 0 {
                filled += n;
                continue;
            }
        }
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(consts::READ_POLL_INTERVAL.min(deadline - now));
    }
    Ok(filled)
}
