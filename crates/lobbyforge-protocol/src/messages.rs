//! Payloads exchanged with lobby participants and external services.
//!
//! Field names are camelCase on the wire because that is what the game
//! clients and the provisioning service already expect.

use serde::{Deserialize, Serialize};

use crate::{Codec, LobbyId, OpCode, ProtocolError, SessionId, UserId};

// ---------------------------------------------------------------------------
// Broadcast payloads
// ---------------------------------------------------------------------------

/// `READY` payload: which session just became ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyNotice {
    pub session_id: SessionId,
}

/// One row of a [`LobbyUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub session_id: SessionId,
    pub is_observing: bool,
    pub is_ready: bool,
    pub display_name: String,
    pub user_id: UserId,
}

/// `LOBBY_UPDATE` payload: every player that completed the join handshake.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LobbyUpdate {
    pub players: Vec<PlayerSummary>,
}

/// `LAUNCH_FAILED` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchFailedNotice {
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Discovery label
// ---------------------------------------------------------------------------

/// The lobby's discovery metadata, used for listing and search.
///
/// Listing filters match on exact strings, so the two flags are
/// serialized as `"true"` / `"false"` rather than JSON booleans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyLabel {
    #[serde(with = "flag")]
    pub is_private: bool,
    pub player_count: usize,
    pub match_name: String,
    #[serde(with = "flag")]
    pub can_join: bool,
}

/// Serializes a `bool` as the string `"true"` or `"false"`.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let text = String::deserialize(deserializer)?;
        match text.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(D::Error::custom(format!(
                "expected \"true\" or \"false\", got {other:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Provisioning and lobby creation
// ---------------------------------------------------------------------------

/// Body of the request sent to the provisioning endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub match_id: LobbyId,
}

/// Client request to open a new lobby.
///
/// Unknown keys are ignored. A missing `isPrivate` means public.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateLobbyRequest {
    pub is_private: Option<bool>,
}

impl CreateLobbyRequest {
    /// Reads a request from the raw RPC payload. A blank payload is the
    /// default request.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] when the payload isn't a valid
    /// request.
    pub fn from_payload(codec: &impl Codec, payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.trim_ascii().is_empty() {
            return Ok(Self::default());
        }
        codec.decode(payload)
    }
}

/// Reply to a [`CreateLobbyRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLobbyResponse {
    pub match_id: LobbyId,
    pub match_name: String,
    pub can_join: bool,
}

// ---------------------------------------------------------------------------
// Envelopes between the runtime and a lobby
// ---------------------------------------------------------------------------

/// A client message delivered to the lobby, consumed on the next tick.
///
/// `op_code` stays raw: clients may send codes the lobby doesn't know,
/// and those are skipped rather than rejected at the door.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: SessionId,
    pub op_code: u8,
    pub data: Vec<u8>,
}

impl InboundMessage {
    /// A ready signal from `sender`.
    pub fn ready(sender: impl Into<SessionId>) -> Self {
        Self {
            sender: sender.into(),
            op_code: OpCode::Ready.code(),
            data: Vec::new(),
        }
    }

    /// Parses the op code.
    pub fn op(&self) -> Result<OpCode, ProtocolError> {
        OpCode::try_from(self.op_code)
    }
}

/// A message the lobby broadcasts to every connected session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub op_code: OpCode,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_flags_are_strings() {
        let label = LobbyLabel {
            is_private: false,
            player_count: 3,
            match_name: "Play with Bo".into(),
            can_join: true,
        };
        let json: serde_json::Value = serde_json::to_value(&label).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isPrivate": "false",
                "playerCount": 3,
                "matchName": "Play with Bo",
                "canJoin": "true",
            })
        );
    }

    #[test]
    fn test_label_rejects_non_flag_strings() {
        let raw = r#"{"isPrivate":"yes","playerCount":0,"matchName":"","canJoin":"true"}"#;
        assert!(serde_json::from_str::<LobbyLabel>(raw).is_err());
    }

    #[test]
    fn test_lobby_update_json_shape() {
        let update = LobbyUpdate {
            players: vec![PlayerSummary {
                session_id: "s-1".into(),
                is_observing: false,
                is_ready: true,
                display_name: "Ann".into(),
                user_id: "u-1".into(),
            }],
        };
        let json: serde_json::Value = serde_json::to_value(&update).unwrap();
        let row = &json["players"][0];
        assert_eq!(row["sessionId"], "s-1");
        assert_eq!(row["isObserving"], false);
        assert_eq!(row["isReady"], true);
        assert_eq!(row["displayName"], "Ann");
        assert_eq!(row["userId"], "u-1");
    }

    #[test]
    fn test_launch_request_body() {
        let body = serde_json::to_string(&LaunchRequest {
            match_id: "m-42".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"matchId":"m-42"}"#);
    }

    #[test]
    fn test_create_request_defaults_and_ignores_unknown_keys() {
        let req: CreateLobbyRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.is_private, None);

        let req: CreateLobbyRequest =
            serde_json::from_str(r#"{"isPrivate":true,"colour":"red"}"#).unwrap();
        assert_eq!(req.is_private, Some(true));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_create_request_from_payload() {
        use crate::JsonCodec;

        let blank = CreateLobbyRequest::from_payload(&JsonCodec, b"  \n").unwrap();
        assert_eq!(blank, CreateLobbyRequest::default());

        let private = CreateLobbyRequest::from_payload(&JsonCodec, br#"{"isPrivate":true}"#).unwrap();
        assert_eq!(private.is_private, Some(true));

        let garbage = CreateLobbyRequest::from_payload(&JsonCodec, b"{isPrivate");
        assert!(matches!(garbage, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_create_request_rejects_wrong_type() {
        let result = serde_json::from_str::<CreateLobbyRequest>(r#"{"isPrivate":"yes"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_inbound_ready_constructor() {
        let msg = InboundMessage::ready("s-7");
        assert_eq!(msg.op().unwrap(), OpCode::Ready);
        assert!(msg.data.is_empty());
    }
}
