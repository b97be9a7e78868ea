//! Lobby configuration, creation parameters, and the phase state machine.

use std::fmt;

use lobbyforge_protocol::LobbyId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Settings shared by every lobby a host creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Active players needed before the lobby can launch.
    pub required_player_count: usize,

    /// Extra slots beyond `required_player_count`, filled by observers.
    pub allowed_observers: usize,

    /// Ticks per second.
    pub tick_rate: u32,

    /// How long a lobby may sit with nobody in it before it is destroyed.
    pub empty_timeout_secs: u32,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            required_player_count: 2,
            allowed_observers: 0,
            tick_rate: 10,
            empty_timeout_secs: 10,
        }
    }
}

impl LobbyConfig {
    /// Highest accepted tick rate.
    pub const MAX_TICK_RATE: u32 = 128;

    /// Clamps values that would make the lobby unusable: a lobby needs at
    /// least one required player and must tick at least once per second.
    pub fn validated(mut self) -> Self {
        if self.required_player_count == 0 {
            tracing::warn!("required_player_count of 0 is meaningless, using 1");
            self.required_player_count = 1;
        }
        let rate = self.tick_rate.clamp(1, Self::MAX_TICK_RATE);
        if rate != self.tick_rate {
            tracing::warn!(requested = self.tick_rate, used = rate, "lobby tick rate out of range");
            self.tick_rate = rate;
        }
        self
    }

    /// Total players (active and observing) one lobby can hold.
    pub fn capacity(&self) -> usize {
        self.required_player_count + self.allowed_observers
    }

    /// Consecutive empty ticks tolerated before destruction.
    pub fn max_empty_ticks(&self) -> u64 {
        u64::from(self.tick_rate) * u64::from(self.empty_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// CreateParams
// ---------------------------------------------------------------------------

/// Per-lobby values fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParams {
    /// Identifier of this lobby, also the `matchId` sent to provisioning.
    pub match_id: LobbyId,
    /// Private lobbies are still listed, but flagged so clients can hide them.
    pub is_private: bool,
    pub match_name: String,
}

impl CreateParams {
    pub fn new(match_id: impl Into<LobbyId>) -> Self {
        Self {
            match_id: match_id.into(),
            is_private: false,
            match_name: String::new(),
        }
    }

    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    pub fn named(mut self, match_name: impl Into<String>) -> Self {
        self.match_name = match_name.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a lobby is in its life.
///
/// ```text
/// WaitingForPlayers → WaitingForPlayersReady → InProgress
/// ```
///
/// - **WaitingForPlayers**: fewer than `required_player_count` players
///   have joined.
/// - **WaitingForPlayersReady**: enough players joined at least once;
///   waiting for them to signal ready. Never reverts, even if players
///   leave again.
/// - **Launching**: reserved. Nothing enters it; provisioning happens
///   while already `InProgress`.
/// - **InProgress**: a game server was requested and the lobby is closed
///   to new play.
///
/// Destruction is not a phase: the handler reports it through
/// [`TickOutcome::Destroy`](crate::TickOutcome::Destroy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    WaitingForPlayers,
    WaitingForPlayersReady,
    Launching,
    InProgress,
}

impl Phase {
    /// The phase that follows this one, or `None` once `InProgress`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::WaitingForPlayers => Some(Self::WaitingForPlayersReady),
            Self::WaitingForPlayersReady | Self::Launching => Some(Self::InProgress),
            Self::InProgress => None,
        }
    }

    /// Returns `true` if `target` immediately follows this phase.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Returns `true` while launch evaluation runs on each tick.
    pub fn awaits_ready(self) -> bool {
        matches!(self, Self::WaitingForPlayersReady)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WaitingForPlayers"),
            Self::WaitingForPlayersReady => write!(f, "WaitingForPlayersReady"),
            Self::Launching => write!(f, "Launching"),
            Self::InProgress => write!(f, "InProgress"),
        }
    }
}
