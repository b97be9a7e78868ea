//! The lobby lifecycle state machine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use lobbyforge_launch::Launcher;
use lobbyforge_protocol::{
    Codec, InboundMessage, JsonCodec, OpCode, Presence, SessionId, UserId,
};

use crate::{
    CreateParams, Dispatcher, IdentityDirectory, LobbyConfig, LobbyError, LobbyState, Phase,
    encode, recompute_observers,
};

/// Reason given to sessions turned away by a full lobby.
pub const MATCH_FULL: &str = "Match full";

/// Result of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// A slot was reserved for the session.
    Accepted { slot: u64 },
    /// The lobby cannot take the session.
    Rejected { reason: String },
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// What the host should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The lobby sat empty for too long. Release it.
    Destroy,
}

/// Values a freshly created lobby hands back to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// Ticks per second the host should drive this lobby at.
    pub tick_rate: u32,
    /// Initial discovery label.
    pub label: String,
}

/// Owns one lobby's state and every mutation of it.
///
/// The host must serialize calls. Async operations hold `&mut self`
/// across the external lookups, which enforces that per instance.
pub struct LobbyHandler<D, I, L, C = JsonCodec> {
    state: LobbyState,
    config: LobbyConfig,
    dispatcher: D,
    directory: Arc<I>,
    launcher: Arc<L>,
    codec: C,
    destroyed: bool,
}

impl<D, I, L> LobbyHandler<D, I, L, JsonCodec>
where
    D: Dispatcher,
    I: IdentityDirectory,
    L: Launcher,
{
    /// Creates a lobby that encodes its payloads as JSON.
    pub fn create(
        config: LobbyConfig,
        params: CreateParams,
        dispatcher: D,
        directory: Arc<I>,
        launcher: Arc<L>,
    ) -> Result<(Self, Created), LobbyError> {
        Self::create_with_codec(config, params, dispatcher, directory, launcher, JsonCodec)
    }
}

impl<D, I, L, C> LobbyHandler<D, I, L, C>
where
    D: Dispatcher,
    I: IdentityDirectory,
    L: Launcher,
    C: Codec,
{
    pub fn create_with_codec(
        config: LobbyConfig,
        params: CreateParams,
        dispatcher: D,
        directory: Arc<I>,
        launcher: Arc<L>,
        codec: C,
    ) -> Result<(Self, Created), LobbyError> {
        let config = config.validated();
        let state = LobbyState::new(&config, params);
        let label = encode::encode_label(&codec, &state)?;

        tracing::info!(
            lobby_id = %state.match_id,
            required = config.required_player_count,
            observers = config.allowed_observers,
            private = state.is_private,
            "lobby created"
        );

        let created = Created {
            tick_rate: config.tick_rate,
            label,
        };
        let handler = Self {
            state,
            config,
            dispatcher,
            directory,
            launcher,
            codec,
            destroyed: false,
        };
        Ok((handler, created))
    }

    pub fn state(&self) -> &LobbyState {
        &self.state
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Mutable access for hosts that attach and detach session channels.
    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    /// Returns `true` once a tick reported destruction or a launch failed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_alive(&self) -> Result<(), LobbyError> {
        if self.destroyed {
            return Err(LobbyError::Destroyed(self.state.match_id.clone()));
        }
        Ok(())
    }

    // -- admission --------------------------------------------------------

    /// Decides whether `session_id` may join, reserving a slot if so.
    ///
    /// The slot exists from this moment, so capacity cannot be oversold
    /// between admission and join completion.
    pub fn join_attempt(&mut self, session_id: &SessionId) -> Result<Admission, LobbyError> {
        self.ensure_alive()?;

        if let Some(existing) = self.state.players.get(session_id) {
            return Ok(Admission::Accepted {
                slot: existing.slot_number,
            });
        }

        if self.state.players.len() >= self.state.capacity() {
            tracing::debug!(
                lobby_id = %self.state.match_id,
                session_id = %session_id,
                "admission rejected, lobby full"
            );
            return Ok(Admission::Rejected {
                reason: MATCH_FULL.to_string(),
            });
        }

        let slot = self.state.reserve(session_id);
        self.state.sync_player_count();
        recompute_observers(&mut self.state);
        tracing::info!(
            lobby_id = %self.state.match_id,
            session_id = %session_id,
            slot,
            "player admitted"
        );
        Ok(Admission::Accepted { slot })
    }

    // -- membership -------------------------------------------------------

    /// Completes the join for admitted sessions.
    ///
    /// Display names come from one batch directory lookup. If the
    /// directory fails, or doesn't know a user, that player gets an empty
    /// display name and the join goes ahead.
    pub async fn join(&mut self, presences: &[Presence]) -> Result<(), LobbyError> {
        self.ensure_alive()?;

        // Refuse the whole batch before touching anything.
        if let Some(stray) = presences
            .iter()
            .find(|p| !self.state.players.contains_key(&p.session_id))
        {
            return Err(LobbyError::NotReserved(stray.session_id.clone()));
        }

        let mut user_ids: Vec<UserId> = presences.iter().map(|p| p.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();

        let records = match self.directory.users_by_id(&user_ids).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    lobby_id = %self.state.match_id,
                    error = %e,
                    "identity lookup failed, joining without display names"
                );
                HashMap::new()
            }
        };

        for presence in presences {
            let display_name = match records.get(&presence.user_id) {
                Some(record) => record.display_name.clone(),
                None => {
                    tracing::debug!(user_id = %presence.user_id, "no directory record");
                    String::new()
                }
            };
            if let Some(player) = self.state.players.get_mut(&presence.session_id) {
                player.user_id = Some(presence.user_id.clone());
                player.display_name = display_name;
                player.presence = Some(presence.clone());
            }
            tracing::info!(
                lobby_id = %self.state.match_id,
                session_id = %presence.session_id,
                user_id = %presence.user_id,
                "player joined"
            );
        }

        self.state.sync_player_count();
        if self.state.players.len() >= self.state.required_player_count {
            self.state.advance_to(Phase::WaitingForPlayersReady);
        }
        recompute_observers(&mut self.state);
        self.broadcast_lobby_update()?;
        self.publish_label()
    }

    /// Removes departing sessions. Their slot numbers are never reused
    /// and the phase never reverts.
    pub fn leave(&mut self, sessions: &[SessionId]) -> Result<(), LobbyError> {
        self.ensure_alive()?;

        for session_id in sessions {
            if self.state.players.remove(session_id).is_some() {
                tracing::info!(
                    lobby_id = %self.state.match_id,
                    session_id = %session_id,
                    "player left"
                );
            } else {
                tracing::debug!(session_id = %session_id, "leave for unknown session");
            }
        }

        self.state.sync_player_count();
        recompute_observers(&mut self.state);
        self.broadcast_lobby_update()?;
        self.publish_label()
    }

    // -- tick -------------------------------------------------------------

    /// Runs one scheduling interval: idle tracking, ready signals, then
    /// launch evaluation.
    ///
    /// A failed launch is reported to every session as `LAUNCH_FAILED`
    /// before the error is returned; the lobby is dead afterwards.
    pub async fn tick(&mut self, messages: Vec<InboundMessage>) -> Result<TickOutcome, LobbyError> {
        self.ensure_alive()?;

        if self.state.player_count == 0 {
            self.state.empty_ticks += 1;
            if self.state.empty_ticks > self.config.max_empty_ticks() {
                tracing::info!(
                    lobby_id = %self.state.match_id,
                    empty_ticks = self.state.empty_ticks,
                    "lobby empty too long, destroying"
                );
                self.destroyed = true;
                return Ok(TickOutcome::Destroy);
            }
        } else {
            self.state.empty_ticks = 0;
        }

        let mut update_owed = false;
        for message in &messages {
            match message.op() {
                Ok(OpCode::Ready) => {
                    if self.mark_ready(&message.sender)? {
                        update_owed = true;
                    }
                }
                Ok(op) => {
                    tracing::debug!(sender = %message.sender, %op, "ignoring client message");
                }
                Err(e) => {
                    tracing::debug!(sender = %message.sender, error = %e, "ignoring client message");
                }
            }
        }
        if update_owed {
            self.broadcast_lobby_update()?;
        }

        if self.state.phase.awaits_ready()
            && self.state.ready_active_count() >= self.state.required_player_count
        {
            self.launch().await?;
        }

        Ok(TickOutcome::Continue)
    }

    /// Marks `sender` ready and announces it. Returns `false` if the
    /// sender is not in this lobby or has not finished joining.
    fn mark_ready(&mut self, sender: &SessionId) -> Result<bool, LobbyError> {
        let Some(player) = self
            .state
            .players
            .get_mut(sender)
            .filter(|p| p.has_joined())
        else {
            tracing::debug!(
                lobby_id = %self.state.match_id,
                sender = %sender,
                "ready signal from a session that has not joined"
            );
            return Ok(false);
        };
        player.is_ready = true;

        let payload = encode::encode_ready_signal(&self.codec, sender)?;
        self.dispatcher.broadcast(OpCode::Ready, &payload);
        Ok(true)
    }

    /// Hands the lobby off to a provisioned game server.
    ///
    /// The phase moves to `InProgress` before the call is made, so a
    /// lobby never launches twice.
    async fn launch(&mut self) -> Result<(), LobbyError> {
        self.state.advance_to(Phase::InProgress);
        self.state.can_join = false;
        self.publish_label()?;

        tracing::info!(
            lobby_id = %self.state.match_id,
            ready = self.state.ready_active_count(),
            "launch conditions met"
        );

        match self.launcher.launch(&self.state.match_id).await {
            Ok(body) => {
                self.dispatcher.broadcast(OpCode::GameStart, &body);
                tracing::info!(lobby_id = %self.state.match_id, "game started");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    lobby_id = %self.state.match_id,
                    error = %e,
                    "game server launch failed"
                );
                self.destroyed = true;
                let notice = encode::encode_launch_failed(&self.codec, &e.to_string())?;
                self.dispatcher.broadcast(OpCode::LaunchFailed, &notice);
                Err(LobbyError::Launch(e))
            }
        }
    }

    // -- runtime hooks ----------------------------------------------------

    /// Called when the host shuts the lobby down. Returns the phase the
    /// lobby ended in.
    pub fn terminate(&self, grace: Duration) -> Phase {
        tracing::info!(
            lobby_id = %self.state.match_id,
            phase = %self.state.phase,
            grace_secs = grace.as_secs(),
            "lobby terminating"
        );
        self.state.phase
    }

    /// Out-of-band administrative signal. Echoes `data` back.
    pub fn signal(&self, data: String) -> Result<String, LobbyError> {
        self.ensure_alive()?;
        tracing::debug!(lobby_id = %self.state.match_id, bytes = data.len(), "signal received");
        Ok(data)
    }

    // -- helpers ----------------------------------------------------------

    fn broadcast_lobby_update(&mut self) -> Result<(), LobbyError> {
        let payload = encode::encode_lobby_update(&self.codec, &self.state)?;
        self.dispatcher.broadcast(OpCode::LobbyUpdate, &payload);
        Ok(())
    }

    fn publish_label(&mut self) -> Result<(), LobbyError> {
        let label = encode::encode_label(&self.codec, &self.state)?;
        self.dispatcher.update_label(&label);
        Ok(())
    }
}
