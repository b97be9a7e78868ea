//! Lobby actor: one Tokio task per lobby, owning its `LobbyHandler`.
//!
//! The actor alternates between commands from its channel and ticks from
//! its scheduler. Client messages that arrive between ticks are buffered
//! and handed to the next tick as one batch.

use std::ops::ControlFlow;
use std::time::Duration;

use lobbyforge_launch::Launcher;
use lobbyforge_lobby::{
    Admission, IdentityDirectory, LobbyError, LobbyHandler, Phase, TickOutcome,
};
use lobbyforge_protocol::{InboundMessage, LobbyId, Presence, SessionId};
use lobbyforge_tick::TickScheduler;
use tokio::sync::{mpsc, oneshot};

use crate::{ChannelDispatcher, HostError, SessionSender};

/// Commands sent to a lobby actor through its channel.
pub(crate) enum LobbyCommand {
    JoinAttempt {
        session_id: SessionId,
        reply: oneshot::Sender<Result<Admission, LobbyError>>,
    },

    /// Attach the session's channel, then complete its join.
    Join {
        presence: Presence,
        sender: SessionSender,
        reply: oneshot::Sender<Result<(), LobbyError>>,
    },

    Leave {
        session_id: SessionId,
        reply: oneshot::Sender<Result<(), LobbyError>>,
    },

    /// Queue a client message for the next tick.
    Message(InboundMessage),

    Signal {
        data: String,
        reply: oneshot::Sender<Result<String, LobbyError>>,
    },

    Info {
        reply: oneshot::Sender<LobbyInfo>,
    },

    Terminate {
        grace: Duration,
    },
}

/// A snapshot of one lobby, as used for discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyInfo {
    pub lobby_id: LobbyId,
    pub match_name: String,
    pub phase: Phase,
    pub player_count: usize,
    /// Active plus observer slots.
    pub capacity: usize,
    pub is_private: bool,
    pub can_join: bool,
    /// The discovery label as last published.
    pub label: String,
}

impl LobbyInfo {
    /// Public, not yet launched, and with a free slot.
    pub fn is_open(&self) -> bool {
        !self.is_private && self.can_join && self.player_count < self.capacity
    }
}

/// Handle to a running lobby actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LobbyHandle {
    lobby_id: LobbyId,
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    pub fn lobby_id(&self) -> &LobbyId {
        &self.lobby_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn unavailable(&self) -> HostError {
        HostError::Unavailable(self.lobby_id.clone())
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> LobbyCommand,
    ) -> Result<T, HostError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Asks the lobby to reserve a slot for `session_id`.
    pub async fn join_attempt(&self, session_id: SessionId) -> Result<Admission, HostError> {
        let result = self
            .request(|reply| LobbyCommand::JoinAttempt { session_id, reply })
            .await?;
        Ok(result?)
    }

    /// Completes the join of an admitted session. From here on the
    /// session receives the lobby's broadcasts on `sender`.
    pub async fn join(&self, presence: Presence, sender: SessionSender) -> Result<(), HostError> {
        self.request(|reply| LobbyCommand::Join {
            presence,
            sender,
            reply,
        })
        .await??;
        Ok(())
    }

    pub async fn leave(&self, session_id: SessionId) -> Result<(), HostError> {
        self.request(|reply| LobbyCommand::Leave { session_id, reply })
            .await??;
        Ok(())
    }

    /// Queues a client message for the next tick (fire-and-forget).
    pub async fn send(&self, message: InboundMessage) -> Result<(), HostError> {
        self.sender
            .send(LobbyCommand::Message(message))
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn signal(&self, data: String) -> Result<String, HostError> {
        let echoed = self
            .request(|reply| LobbyCommand::Signal { data, reply })
            .await??;
        Ok(echoed)
    }

    pub async fn info(&self) -> Result<LobbyInfo, HostError> {
        self.request(|reply| LobbyCommand::Info { reply }).await
    }

    /// Tells the lobby to shut down.
    pub async fn terminate(&self, grace: Duration) -> Result<(), HostError> {
        self.sender
            .send(LobbyCommand::Terminate { grace })
            .await
            .map_err(|_| self.unavailable())
    }
}

/// The lobby actor's state. Runs inside a Tokio task.
struct LobbyActor<I, L> {
    lobby_id: LobbyId,
    handler: LobbyHandler<ChannelDispatcher, I, L>,
    scheduler: TickScheduler,
    pending: Vec<InboundMessage>,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl<I, L> LobbyActor<I, L>
where
    I: IdentityDirectory,
    L: Launcher,
{
    async fn run(mut self) {
        tracing::info!(
            lobby_id = %self.lobby_id,
            rate_hz = self.scheduler.rate_hz(),
            "lobby actor started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else {
                        tracing::debug!(lobby_id = %self.lobby_id, "all handles dropped");
                        break;
                    };
                    if self.handle_command(cmd).await.is_break() {
                        break;
                    }
                }
                info = self.scheduler.wait_for_tick() => {
                    if info.ticks_skipped > 0 {
                        tracing::debug!(
                            lobby_id = %self.lobby_id,
                            tick = info.tick,
                            skipped = info.ticks_skipped,
                            "lobby fell behind"
                        );
                    }
                    let flow = self.handle_tick().await;
                    self.scheduler.record_tick_end();
                    if flow.is_break() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            lobby_id = %self.lobby_id,
            phase = %self.handler.state().phase(),
            "lobby actor stopped"
        );
    }

    async fn handle_tick(&mut self) -> ControlFlow<()> {
        let batch = std::mem::take(&mut self.pending);
        match self.handler.tick(batch).await {
            Ok(TickOutcome::Continue) => ControlFlow::Continue(()),
            Ok(TickOutcome::Destroy) => ControlFlow::Break(()),
            Err(e) => self.fatal(&e),
        }
    }

    async fn handle_command(&mut self, cmd: LobbyCommand) -> ControlFlow<()> {
        match cmd {
            LobbyCommand::JoinAttempt { session_id, reply } => {
                let result = self.handler.join_attempt(&session_id);
                self.reply(reply, result)
            }
            LobbyCommand::Join {
                presence,
                sender,
                reply,
            } => {
                let session_id = presence.session_id.clone();
                self.handler
                    .dispatcher_mut()
                    .attach(session_id.clone(), sender);
                let result = self.handler.join(std::slice::from_ref(&presence)).await;
                if result.is_err() {
                    self.handler.dispatcher_mut().detach(&session_id);
                }
                self.reply(reply, result)
            }
            LobbyCommand::Leave { session_id, reply } => {
                self.handler.dispatcher_mut().detach(&session_id);
                let result = self.handler.leave(std::slice::from_ref(&session_id));
                self.reply(reply, result)
            }
            LobbyCommand::Message(message) => {
                self.pending.push(message);
                ControlFlow::Continue(())
            }
            LobbyCommand::Signal { data, reply } => {
                let result = self.handler.signal(data);
                self.reply(reply, result)
            }
            LobbyCommand::Info { reply } => {
                let _ = reply.send(self.info());
                ControlFlow::Continue(())
            }
            LobbyCommand::Terminate { grace } => {
                self.handler.terminate(grace);
                ControlFlow::Break(())
            }
        }
    }

    /// Sends `result` back to the caller. Any error stops the lobby.
    fn reply<T>(
        &self,
        reply: oneshot::Sender<Result<T, LobbyError>>,
        result: Result<T, LobbyError>,
    ) -> ControlFlow<()> {
        let flow = match &result {
            Ok(_) => ControlFlow::Continue(()),
            Err(e) => self.fatal(e),
        };
        let _ = reply.send(result);
        flow
    }

    fn fatal(&self, err: &LobbyError) -> ControlFlow<()> {
        tracing::error!(lobby_id = %self.lobby_id, error = %err, "lobby failed, shutting down");
        ControlFlow::Break(())
    }

    fn info(&self) -> LobbyInfo {
        let state = self.handler.state();
        LobbyInfo {
            lobby_id: self.lobby_id.clone(),
            match_name: state.match_name().to_string(),
            phase: state.phase(),
            player_count: state.player_count(),
            capacity: state.capacity(),
            is_private: state.is_private(),
            can_join: state.can_join(),
            label: self.handler.dispatcher().label().to_string(),
        }
    }
}

/// Spawns a lobby actor ticking at `tick_rate` and returns its handle.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_lobby<I, L>(
    handler: LobbyHandler<ChannelDispatcher, I, L>,
    tick_rate: u32,
    channel_size: usize,
) -> LobbyHandle
where
    I: IdentityDirectory,
    L: Launcher,
{
    let lobby_id = handler.state().match_id().clone();
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = LobbyActor {
        lobby_id: lobby_id.clone(),
        handler,
        scheduler: TickScheduler::with_rate(tick_rate),
        pending: Vec::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    LobbyHandle {
        lobby_id,
        sender: tx,
    }
}
