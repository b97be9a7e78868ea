use std::collections::HashMap;

use lobbyforge_lobby::Dispatcher;
use lobbyforge_protocol::{LobbyId, OpCode, OutboundMessage, SessionId};
use tokio::sync::mpsc;

/// Channel for delivering outbound messages to one session's connection.
pub type SessionSender = mpsc::UnboundedSender<OutboundMessage>;

/// [`Dispatcher`] that fans broadcasts out over per-session channels and
/// keeps the most recently published label.
#[derive(Debug)]
pub struct ChannelDispatcher {
    lobby_id: LobbyId,
    sessions: HashMap<SessionId, SessionSender>,
    label: String,
}

impl ChannelDispatcher {
    pub fn new(lobby_id: LobbyId) -> Self {
        Self {
            lobby_id,
            sessions: HashMap::new(),
            label: String::new(),
        }
    }

    /// Starts delivering broadcasts to `session_id`.
    pub fn attach(&mut self, session_id: SessionId, sender: SessionSender) {
        self.sessions.insert(session_id, sender);
    }

    pub fn detach(&mut self, session_id: &SessionId) -> Option<SessionSender> {
        self.sessions.remove(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The label as last published.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Dispatcher for ChannelDispatcher {
    fn broadcast(&mut self, op: OpCode, payload: &[u8]) {
        tracing::trace!(
            lobby_id = %self.lobby_id,
            %op,
            sessions = self.sessions.len(),
            "broadcast"
        );
        for (session_id, sender) in &self.sessions {
            let msg = OutboundMessage {
                op_code: op,
                data: payload.to_vec(),
            };
            // A closed receiver means the connection is gone; the leave
            // for it is on its way.
            if sender.send(msg).is_err() {
                tracing::debug!(lobby_id = %self.lobby_id, %session_id, "session channel closed");
            }
        }
    }

    fn update_label(&mut self, label: &str) {
        tracing::debug!(lobby_id = %self.lobby_id, %label, "label updated");
        label.clone_into(&mut self.label);
    }
}
