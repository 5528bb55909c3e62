use crate::consts;
use std::time::Duration;

/// Link settings, fixed when a session is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// UART speed in baud.
    pub baud_rate: u32,
    /// Deadline the session applies to every reply, including the handshake.
    pub timeout: Duration,
    /// Pause between opening a port and the handshake while the board reboots.
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            baud_rate: consts::DEFAULT_BAUD_RATE,
            timeout: consts::DEFAULT_TIMEOUT,
            settle_delay: consts::DEFAULT_SETTLE_DELAY,
        }
    }
}

impl SessionConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}
