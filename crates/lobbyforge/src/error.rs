//! Unified error type for Lobbyforge.

use lobbyforge_host::HostError;
use lobbyforge_launch::LaunchError;
use lobbyforge_lobby::{DirectoryError, LobbyError};
use lobbyforge_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// Applications using the `lobbyforge` crate deal with this single type;
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LobbyforgeError {
    /// Encoding or decoding a payload failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Building the launch client or provisioning a server failed.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// A lobby hit a fatal error.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// Registry or actor level failure (not found, rejected, stopped).
    #[error(transparent)]
    Host(#[from] HostError),
}
