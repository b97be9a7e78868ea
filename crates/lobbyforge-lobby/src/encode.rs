//! Builds the lobby's outbound payloads from its state.

use lobbyforge_protocol::{
    Codec, LaunchFailedNotice, LobbyLabel, LobbyUpdate, PlayerSummary, ProtocolError,
    ReadyNotice, SessionId, UserId,
};

use crate::LobbyState;

/// The discovery label for `state`.
pub fn label(state: &LobbyState) -> LobbyLabel {
    LobbyLabel {
        is_private: state.is_private,
        player_count: state.player_count,
        match_name: state.match_name.clone(),
        can_join: state.can_join,
    }
}

/// The roster sent with `LOBBY_UPDATE`, in admission order.
///
/// Sessions that were admitted but have not completed their join are left
/// out.
pub fn lobby_update(state: &LobbyState) -> LobbyUpdate {
    let players = state
        .players_by_slot()
        .into_iter()
        .filter(|(_, p)| p.has_joined())
        .map(|(session_id, p)| PlayerSummary {
            session_id: session_id.clone(),
            is_observing: p.is_observing,
            is_ready: p.is_ready,
            display_name: p.display_name.clone(),
            user_id: p
                .user_id
                .clone()
                .unwrap_or_else(|| UserId(String::new())),
        })
        .collect();
    LobbyUpdate { players }
}

pub fn encode_label<C: Codec>(codec: &C, state: &LobbyState) -> Result<String, ProtocolError> {
    codec.encode_text(&label(state))
}

pub fn encode_lobby_update<C: Codec>(
    codec: &C,
    state: &LobbyState,
) -> Result<Vec<u8>, ProtocolError> {
    codec.encode(&lobby_update(state))
}

pub fn encode_ready_signal<C: Codec>(
    codec: &C,
    session_id: &SessionId,
) -> Result<Vec<u8>, ProtocolError> {
    codec.encode(&ReadyNotice {
        session_id: session_id.clone(),
    })
}

pub fn encode_launch_failed<C: Codec>(codec: &C, reason: &str) -> Result<Vec<u8>, ProtocolError> {
    codec.encode(&LaunchFailedNotice {
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use lobbyforge_protocol::{JsonCodec, Presence};
    use serde_json::{Value, json};

    use super::*;
    use crate::{CreateParams, LobbyConfig};

    fn state() -> LobbyState {
        let params = CreateParams::new("m-1").private(true).named("Play with Ann");
        LobbyState::new(&LobbyConfig::default(), params)
    }

    #[test]
    fn test_label_uses_string_flags() {
        let mut s = state();
        s.player_count = 1;
        let raw = encode_label(&JsonCodec, &s).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            json!({
                "isPrivate": "true",
                "playerCount": 1,
                "matchName": "Play with Ann",
                "canJoin": "true",
            })
        );
    }

    #[test]
    fn test_lobby_update_lists_joined_players_in_slot_order() {
        let mut s = state();
        for (session, user) in [("late", "u-1"), ("later", "u-2"), ("pending", "")] {
            s.reserve(&SessionId::from(session));
            if user.is_empty() {
                continue;
            }
            if let Some(p) = s.players.get_mut(&SessionId::from(session)) {
                p.presence = Some(Presence::new(session, user, session));
                p.user_id = Some(UserId::from(user));
            }
        }
        if let Some(p) = s.players.get_mut(&SessionId::from("late")) {
            p.display_name = "Ann".into();
            p.is_ready = true;
        }

        let bytes = encode_lobby_update(&JsonCodec, &s).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({
                "players": [
                    {
                        "sessionId": "late",
                        "isObserving": false,
                        "isReady": true,
                        "displayName": "Ann",
                        "userId": "u-1",
                    },
                    {
                        "sessionId": "later",
                        "isObserving": false,
                        "isReady": false,
                        "displayName": "",
                        "userId": "u-2",
                    },
                ]
            })
        );
    }

    #[test]
    fn test_ready_signal_names_the_sender() {
        let bytes = encode_ready_signal(&JsonCodec, &SessionId::from("s-9")).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({ "sessionId": "s-9" }));
    }

    #[test]
    fn test_launch_failed_carries_reason() {
        let bytes = encode_launch_failed(&JsonCodec, "no capacity").unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({ "reason": "no capacity" }));
    }
}
