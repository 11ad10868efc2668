//! Pin control adapter error types.

use hwbridge_domain::channel::ChannelId;
use hwbridge_domain::error::{BridgeError, DriverError};

/// Errors specific to the pin control adapter.
#[derive(Debug, thiserror::Error)]
pub enum PinctrlError {
    /// The tool could not be started.
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure.
    #[error("{program} exited with status {code:?}: {stderr}")]
    ExitStatus {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl PinctrlError {
    /// Convert into a [`DriverError::Output`] for `channel`.
    #[must_use]
    pub fn into_domain(self, channel: &ChannelId) -> BridgeError {
        DriverError::Output {
            channel: channel.to_string(),
            source: Box::new(self),
        }
        .into()
    }
}
