//! Error types for the launch client.

use std::time::Duration;

/// Why a game server could not be provisioned.
///
/// All of these are fatal to the lobby that asked: without a server there
/// is nowhere to send its players.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or its body could not be read.
    #[error("provisioning request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// No complete response arrived within the configured timeout.
    #[error("provisioning request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-success status.
    #[error("provisioning service returned {status}: {body}")]
    Status { status: u16, body: String },
}
