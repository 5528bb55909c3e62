use thiserror::Error;

/// Why a version handshake did not bring the session to the ready state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeFailure {
    /// Nothing came back within the configured timeout.
    #[error("no reply to the reset byte within the timeout")]
    NoReply,
    /// A byte came back, but it is not the expected protocol version.
    #[error("bad protocol version {actual} (expected {expected}), this is not a process-command firmware")]
    VersionMismatch {
        /// Version this crate speaks.
        expected: u8,
        /// Byte the device answered with.
        actual: u8,
    },
    /// Writing the reset byte or reading the reply failed.
    #[error("transport failed during handshake: {0}")]
    Transport(String),
}

/// Errors that can occur when talking to a process-command firmware.
///
/// Addressing and encoding errors (`InvalidPin`, `InvalidBitIndex`,
/// `InvalidAnalogChannel`) are always reported before anything is written to
/// the transport.
#[derive(Error, Debug)]
pub enum Error {
    /// Logical pin number is outside the board's pin table.
    #[error("Pin {pin} out of range (board has {pin_count} pins)")]
    InvalidPin {
        /// The pin number that was requested.
        pin: u8,
        /// Number of pins in the table.
        pin_count: u8,
    },
    /// Bit index does not fit an 8-bit register.
    #[error("Bit index {0} out of range (0-7)")]
    InvalidBitIndex(u8),
    /// ADC channel is not available on this board.
    #[error("Analog channel {channel} out of range (board has {channel_count} channels)")]
    InvalidAnalogChannel {
        /// The channel that was requested.
        channel: u8,
        /// Number of ADC channels on the board.
        channel_count: u8,
    },
    /// The device did not answer the version query as expected.
    #[error("Handshake failed: {0}")]
    HandshakeFailed(HandshakeFailure),
    /// Operation needs an open, verified session.
    #[error("Session is not ready (closed or handshake not completed)")]
    NotReady,
    /// Underlying write, read or flush failed. The session is closed afterwards.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
    /// Fewer response bytes than expected arrived before the timeout.
    #[error("Timeout waiting for device response (expected {expected} bytes, got {received})")]
    IoTimeout {
        /// Response length implied by the frame.
        expected: usize,
        /// Bytes that did arrive.
        received: usize,
    },
    /// Response bytes could not be turned into a value.
    #[error("Decode error: {0}")]
    Decode(String),
    /// No candidate port answered the handshake.
    #[error("No device with a compatible firmware found")]
    DeviceNotFound,
    /// Error from the `serialport` crate while enumerating ports.
    #[cfg(feature = "serialport")]
    #[error("Serial port error: {0}")]
    Serialport(#[from] serialport::Error),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for failures the caller may simply retry on the same session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::IoTimeout { .. })
    }
}
