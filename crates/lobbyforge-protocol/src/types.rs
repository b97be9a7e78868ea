//! Identity types and operation codes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifies one network session.
    ///
    /// Unique per connection and stable for the life of that connection.
    /// A user who reconnects gets a new `SessionId`.
    SessionId
);

string_id!(
    /// Identifies a user account in the external identity directory.
    UserId
);

string_id!(
    /// Identifies one lobby instance. Also sent to the provisioning
    /// service as the `matchId` of the game server to stand up.
    LobbyId
);

/// A connected session as reported by the hosting runtime.
///
/// The lobby keeps one of these per player once the join handshake has
/// completed. Before that the player only holds a reserved slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub username: String,
}

impl Presence {
    pub fn new(
        session_id: impl Into<SessionId>,
        user_id: impl Into<UserId>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OpCode
// ---------------------------------------------------------------------------

/// Tags every message exchanged with lobby participants.
///
/// Clients send `Ready`; the lobby broadcasts all four. Codes travel as
/// plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OpCode {
    /// A session declared itself ready. Payload: [`ReadyNotice`](crate::ReadyNotice).
    Ready,
    /// Full roster snapshot. Payload: [`LobbyUpdate`](crate::LobbyUpdate).
    LobbyUpdate,
    /// A game server is up. Payload: the provisioning response, verbatim.
    GameStart,
    /// Provisioning failed and the lobby is closing.
    /// Payload: [`LaunchFailedNotice`](crate::LaunchFailedNotice).
    LaunchFailed,
}

impl OpCode {
    /// The numeric code used on the wire.
    pub fn code(self) -> u8 {
        match self {
            Self::Ready => 1,
            Self::LobbyUpdate => 2,
            Self::GameStart => 3,
            Self::LaunchFailed => 4,
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op.code()
    }
}

impl TryFrom<u8> for OpCode {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Ready),
            2 => Ok(Self::LobbyUpdate),
            3 => Ok(Self::GameStart),
            4 => Ok(Self::LaunchFailed),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown op code {other}"
            ))),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "READY"),
            Self::LobbyUpdate => write!(f, "LOBBY_UPDATE"),
            Self::GameStart => write!(f, "GAME_START"),
            Self::LaunchFailed => write!(f, "LAUNCH_FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn test_ids_display_raw_value() {
        assert_eq!(LobbyId::from("m-1").to_string(), "m-1");
        assert_eq!(UserId::from("u-9").to_string(), "u-9");
    }

    #[test]
    fn test_op_codes_match_wire_values() {
        assert_eq!(OpCode::Ready.code(), 1);
        assert_eq!(OpCode::LobbyUpdate.code(), 2);
        assert_eq!(OpCode::GameStart.code(), 3);
        assert_eq!(OpCode::LaunchFailed.code(), 4);
    }

    #[test]
    fn test_op_code_try_from_rejects_unknown() {
        assert_eq!(OpCode::try_from(2).unwrap(), OpCode::LobbyUpdate);
        assert!(OpCode::try_from(0).is_err());
        assert!(OpCode::try_from(99).is_err());
    }

    #[test]
    fn test_op_code_serializes_as_number() {
        assert_eq!(serde_json::to_string(&OpCode::GameStart).unwrap(), "3");
        let op: OpCode = serde_json::from_str("1").unwrap();
        assert_eq!(op, OpCode::Ready);
        assert!(serde_json::from_str::<OpCode>("7").is_err());
    }

    #[test]
    fn test_presence_json_uses_camel_case() {
        let p = Presence::new("s-1", "u-1", "ann");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["sessionId"], "s-1");
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["username"], "ann");
    }
}
