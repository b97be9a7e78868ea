//! Error types for the lobby layer.

use lobbyforge_launch::LaunchError;
use lobbyforge_protocol::{LobbyId, ProtocolError, SessionId};

/// A lifecycle call that cannot proceed.
///
/// Every variant is fatal to the lobby instance: the host logs it and
/// tears the lobby down. Turning a player away because the lobby is full
/// is not an error; see [`Admission`](crate::Admission).
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The runtime completed a join for a session that never passed
    /// admission.
    #[error("session {0} has no reserved slot")]
    NotReserved(SessionId),

    /// The runtime kept calling after the lobby signalled destruction.
    #[error("lobby {0} has already been destroyed")]
    Destroyed(LobbyId),

    /// The provisioning service could not supply a game server.
    #[error("game server launch failed: {0}")]
    Launch(#[from] LaunchError),

    /// A broadcast or label payload could not be encoded.
    #[error("payload encoding failed: {0}")]
    Encode(#[from] ProtocolError),
}

/// The identity directory could not answer.
///
/// Never fatal: joins proceed with empty display names.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("identity directory unavailable: {0}")]
    Unavailable(String),
}
