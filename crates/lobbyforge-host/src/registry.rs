//! Lobby registry: creates, tracks, and routes sessions to lobbies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use lobbyforge_launch::Launcher;
use lobbyforge_lobby::{
    Admission, CreateParams, Dispatcher, IdentityDirectory, LobbyConfig, LobbyHandler,
};
use lobbyforge_protocol::{
    CreateLobbyRequest, CreateLobbyResponse, InboundMessage, JsonCodec, LobbyId, Presence,
    SessionId,
};
use rand::Rng;

use crate::actor::spawn_lobby;
use crate::{ChannelDispatcher, HostError, LobbyHandle, LobbyInfo, SessionSender};

/// Default command channel size for lobby actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Which lobbies [`LobbyRegistry::list_lobbies`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LobbyFilter {
    #[default]
    All,
    /// Public lobbies that have not launched and still have a free slot.
    Open,
}

/// Owns every live lobby and knows which session is in which.
///
/// A session can be in at most one lobby at a time.
pub struct LobbyRegistry<I, L> {
    config: LobbyConfig,
    directory: Arc<I>,
    launcher: Arc<L>,
    lobbies: HashMap<LobbyId, LobbyHandle>,
    session_lobbies: HashMap<SessionId, LobbyId>,
}

impl<I, L> LobbyRegistry<I, L>
where
    I: IdentityDirectory,
    L: Launcher,
{
    pub fn new(config: LobbyConfig, directory: Arc<I>, launcher: Arc<L>) -> Self {
        Self {
            config: config.validated(),
            directory,
            launcher,
            lobbies: HashMap::new(),
            session_lobbies: HashMap::new(),
        }
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Creates a lobby on behalf of `creator` and starts its actor.
    ///
    /// The lobby is named after the creator's display name, falling back
    /// to their username when the directory has no record.
    pub async fn create_lobby(
        &mut self,
        creator: &Presence,
        request: CreateLobbyRequest,
    ) -> Result<CreateLobbyResponse, HostError> {
        self.prune_closed();
        let is_private = request.is_private.unwrap_or(false);
        let match_name = self.match_name_for(creator, is_private).await;
        let lobby_id = generate_lobby_id();

        let params = CreateParams::new(lobby_id.clone())
            .private(is_private)
            .named(match_name.clone());
        let (mut handler, created) = LobbyHandler::create(
            self.config.clone(),
            params,
            ChannelDispatcher::new(lobby_id.clone()),
            Arc::clone(&self.directory),
            Arc::clone(&self.launcher),
        )?;

        handler.dispatcher_mut().update_label(&created.label);
        let handle = spawn_lobby(handler, created.tick_rate, DEFAULT_CHANNEL_SIZE);
        self.lobbies.insert(lobby_id.clone(), handle);

        tracing::info!(
            %lobby_id,
            creator = %creator.user_id,
            %match_name,
            is_private,
            "lobby created"
        );

        Ok(CreateLobbyResponse {
            match_id: lobby_id,
            match_name,
            can_join: true,
        })
    }

    /// Same as [`create_lobby`](Self::create_lobby), reading the request
    /// from a raw JSON payload. A blank payload creates a public lobby.
    pub async fn create_lobby_from_payload(
        &mut self,
        creator: &Presence,
        payload: &[u8],
    ) -> Result<CreateLobbyResponse, HostError> {
        let request = CreateLobbyRequest::from_payload(&JsonCodec, payload)?;
        self.create_lobby(creator, request).await
    }

    async fn match_name_for(&self, creator: &Presence, is_private: bool) -> String {
        let lookup = self
            .directory
            .users_by_id(std::slice::from_ref(&creator.user_id))
            .await;
        match lookup {
            Ok(records) => match records.get(&creator.user_id) {
                Some(record) if is_private => format!("Play with {} (Private)", record.display_name),
                Some(record) => format!("Play with {}", record.display_name),
                None => format!("Play with {}", creator.username),
            },
            Err(e) => {
                tracing::warn!(user_id = %creator.user_id, error = %e, "creator lookup failed");
                format!("Play with {}", creator.username)
            }
        }
    }

    fn handle(&self, lobby_id: &LobbyId) -> Result<&LobbyHandle, HostError> {
        self.lobbies
            .get(lobby_id)
            .ok_or_else(|| HostError::NotFound(lobby_id.clone()))
    }

    /// Admits `presence` into a lobby and completes its join.
    ///
    /// Broadcasts reach the session on `sender` from the moment the join
    /// completes.
    pub async fn join(
        &mut self,
        lobby_id: &LobbyId,
        presence: Presence,
        sender: SessionSender,
    ) -> Result<(), HostError> {
        // A lobby that stopped on its own must not pin its sessions.
        self.prune_closed();
        if let Some(current) = self.session_lobbies.get(&presence.session_id) {
            return Err(HostError::AlreadyInLobby(
                presence.session_id.clone(),
                current.clone(),
            ));
        }

        let handle = self.handle(lobby_id)?;
        match handle.join_attempt(presence.session_id.clone()).await? {
            Admission::Accepted { .. } => {}
            Admission::Rejected { reason } => {
                return Err(HostError::Rejected {
                    lobby_id: lobby_id.clone(),
                    reason,
                });
            }
        }

        let session_id = presence.session_id.clone();
        handle.join(presence, sender).await?;
        self.session_lobbies.insert(session_id, lobby_id.clone());
        Ok(())
    }

    /// Removes a session from whichever lobby it is in.
    pub async fn leave(&mut self, session_id: &SessionId) -> Result<(), HostError> {
        let lobby_id = self
            .session_lobbies
            .remove(session_id)
            .ok_or_else(|| HostError::NotInLobby(session_id.clone()))?;

        match self.lobbies.get(&lobby_id) {
            Some(handle) => handle.leave(session_id.clone()).await,
            None => Ok(()),
        }
    }

    /// Routes a client message to the sender's lobby.
    pub async fn send(&self, message: InboundMessage) -> Result<(), HostError> {
        let lobby_id = self
            .session_lobbies
            .get(&message.sender)
            .ok_or_else(|| HostError::NotInLobby(message.sender.clone()))?;
        self.handle(lobby_id)?.send(message).await
    }

    pub async fn signal(&self, lobby_id: &LobbyId, data: String) -> Result<String, HostError> {
        self.handle(lobby_id)?.signal(data).await
    }

    pub async fn info(&self, lobby_id: &LobbyId) -> Result<LobbyInfo, HostError> {
        self.handle(lobby_id)?.info().await
    }

    /// Queries every lobby concurrently. Lobbies that fail to answer
    /// (e.g. shutting down) are skipped.
    pub async fn list_lobbies(&self, filter: LobbyFilter) -> Vec<LobbyInfo> {
        let infos = join_all(self.lobbies.values().map(|handle| handle.info())).await;
        let mut infos: Vec<LobbyInfo> = infos
            .into_iter()
            .filter_map(Result::ok)
            .filter(|info| match filter {
                LobbyFilter::All => true,
                LobbyFilter::Open => info.is_open(),
            })
            .collect();
        infos.sort_by(|a, b| a.lobby_id.cmp(&b.lobby_id));
        infos
    }

    /// Shuts a lobby down and forgets its sessions.
    pub async fn destroy(&mut self, lobby_id: &LobbyId, grace: Duration) -> Result<(), HostError> {
        let handle = self
            .lobbies
            .remove(lobby_id)
            .ok_or_else(|| HostError::NotFound(lobby_id.clone()))?;

        let _ = handle.terminate(grace).await;
        self.session_lobbies.retain(|_, lid| lid != lobby_id);

        tracing::info!(%lobby_id, "lobby destroyed");
        Ok(())
    }

    /// Forgets lobbies whose actors have stopped on their own (empty
    /// timeout, failed launch) and returns their ids. Runs automatically
    /// before every create and join.
    pub fn prune_closed(&mut self) -> Vec<LobbyId> {
        let closed: Vec<LobbyId> = self
            .lobbies
            .iter()
            .filter(|(_, handle)| handle.is_closed())
            .map(|(id, _)| id.clone())
            .collect();

        for lobby_id in &closed {
            self.lobbies.remove(lobby_id);
            self.session_lobbies.retain(|_, lid| lid != lobby_id);
            tracing::debug!(%lobby_id, "pruned stopped lobby");
        }
        closed
    }

    /// Returns the lobby a session is currently in, if any.
    pub fn session_lobby(&self, session_id: &SessionId) -> Option<&LobbyId> {
        self.session_lobbies.get(session_id)
    }

    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }

    pub fn lobby_ids(&self) -> Vec<LobbyId> {
        self.lobbies.keys().cloned().collect()
    }
}

/// 16 random bytes as lowercase hex.
fn generate_lobby_id() -> LobbyId {
    let bytes: [u8; 16] = rand::rng().random();
    LobbyId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_hex_and_distinct() {
        let a = generate_lobby_id();
        let b = generate_lobby_id();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
