//! Finding the port a compatible board is attached to.

use crate::board::PinTable;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::session::DeviceSession;
use crate::transport::TransportOpener;
use log::{debug, info};

/// Probes candidate identifiers in order and returns the first session whose
/// handshake succeeds.
///
/// Candidates that fail to open or answer with the wrong version are skipped.
/// Returns [`Error::DeviceNotFound`] when the sequence is exhausted.
pub fn discover<O, I>(
    opener: &O,
    candidates: I,
    table: PinTable,
    config: SessionConfig,
) -> Result<DeviceSession<O::Transport>>
where
    O: TransportOpener,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for candidate in candidates {
        let identifier = candidate.as_ref();
        debug!("Found {}, testing...", identifier);
        match DeviceSession::open_port(opener, identifier, table, config) {
            Ok(session) => {
                info!("Using port {}.", identifier);
                return Ok(session);
            }
            Err(e) => debug!("Skipping {}: {}", identifier, e),
        }
    }
    Err(Error::DeviceNotFound)
}
