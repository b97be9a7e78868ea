//! Error types for the host layer.

use lobbyforge_lobby::LobbyError;
use lobbyforge_protocol::{LobbyId, ProtocolError, SessionId};

/// Errors returned by [`LobbyRegistry`](crate::LobbyRegistry) and
/// [`LobbyHandle`](crate::LobbyHandle).
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// No lobby with this id is registered.
    #[error("lobby {0} not found")]
    NotFound(LobbyId),

    /// The lobby's actor has stopped or its channel is closed.
    #[error("lobby {0} is unavailable")]
    Unavailable(LobbyId),

    /// Admission declined the session.
    #[error("lobby {lobby_id} rejected the session: {reason}")]
    Rejected { lobby_id: LobbyId, reason: String },

    /// A session can be in at most one lobby.
    #[error("session {0} is already in lobby {1}")]
    AlreadyInLobby(SessionId, LobbyId),

    #[error("session {0} is not in any lobby")]
    NotInLobby(SessionId),

    /// A create-lobby payload could not be read.
    #[error("invalid create request: {0}")]
    InvalidRequest(#[from] ProtocolError),

    /// The lobby hit a fatal error and has stopped.
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
