//! The authoritative per-lobby snapshot.

use std::collections::HashMap;

use lobbyforge_protocol::{LobbyId, Presence, SessionId, UserId};

use crate::{CreateParams, LobbyConfig, Phase};

/// One admitted participant.
///
/// Created on admission with no presence; the rest is filled in when the
/// runtime completes the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    /// Set once the join completes.
    pub presence: Option<Presence>,
    pub is_ready: bool,
    /// Admission order. Unique within the lobby and never reused.
    pub slot_number: u64,
    /// Recomputed after every join and leave.
    pub is_observing: bool,
    /// Empty until the identity directory answered for this user.
    pub display_name: String,
    pub user_id: Option<UserId>,
}

impl PlayerState {
    pub(crate) fn reserved(slot_number: u64) -> Self {
        Self {
            presence: None,
            is_ready: false,
            slot_number,
            is_observing: false,
            display_name: String::new(),
            user_id: None,
        }
    }

    /// Returns `true` once the runtime has completed this player's join.
    pub fn has_joined(&self) -> bool {
        self.presence.is_some()
    }
}

/// Everything one lobby knows about itself.
///
/// Only [`LobbyHandler`](crate::LobbyHandler) mutates this; everyone else
/// reads it through the accessors.
#[derive(Debug, Clone)]
pub struct LobbyState {
    pub(crate) match_id: LobbyId,
    pub(crate) match_name: String,
    pub(crate) is_private: bool,
    pub(crate) can_join: bool,
    pub(crate) phase: Phase,
    pub(crate) players: HashMap<SessionId, PlayerState>,
    pub(crate) player_count: usize,
    pub(crate) required_player_count: usize,
    pub(crate) allowed_observers: usize,
    pub(crate) empty_ticks: u64,
    pub(crate) next_slot_number: u64,
}

impl LobbyState {
    pub(crate) fn new(config: &LobbyConfig, params: CreateParams) -> Self {
        Self {
            match_id: params.match_id,
            match_name: params.match_name,
            is_private: params.is_private,
            can_join: true,
            phase: Phase::WaitingForPlayers,
            players: HashMap::new(),
            player_count: 0,
            required_player_count: config.required_player_count,
            allowed_observers: config.allowed_observers,
            empty_ticks: 0,
            next_slot_number: 0,
        }
    }

    /// Creates a player entry with the next slot number and returns it.
    ///
    /// A session that already holds an entry keeps its original slot.
    pub(crate) fn reserve(&mut self, session_id: &SessionId) -> u64 {
        if let Some(existing) = self.players.get(session_id) {
            return existing.slot_number;
        }
        let slot = self.next_slot_number;
        self.next_slot_number += 1;
        self.players
            .insert(session_id.clone(), PlayerState::reserved(slot));
        slot
    }

    pub(crate) fn sync_player_count(&mut self) {
        self.player_count = self.players.len();
    }

    /// Moves to `target` if it directly follows the current phase.
    /// Returns whether the phase changed.
    pub(crate) fn advance_to(&mut self, target: Phase) -> bool {
        if self.phase.can_transition_to(target) {
            tracing::info!(
                lobby_id = %self.match_id,
                from = %self.phase,
                to = %target,
                "lobby phase changed"
            );
            self.phase = target;
            true
        } else {
            false
        }
    }

    pub fn match_id(&self) -> &LobbyId {
        &self.match_id
    }

    pub fn match_name(&self) -> &str {
        &self.match_name
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    /// `false` once a launch has begun.
    pub fn can_join(&self) -> bool {
        self.can_join
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &HashMap<SessionId, PlayerState> {
        &self.players
    }

    pub fn player(&self, session_id: &SessionId) -> Option<&PlayerState> {
        self.players.get(session_id)
    }

    /// Mirrors the number of entries in [`players`](Self::players) as of
    /// the last completed join or leave.
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn required_player_count(&self) -> usize {
        self.required_player_count
    }

    pub fn allowed_observers(&self) -> usize {
        self.allowed_observers
    }

    pub fn capacity(&self) -> usize {
        self.required_player_count + self.allowed_observers
    }

    pub fn empty_ticks(&self) -> u64 {
        self.empty_ticks
    }

    pub fn next_slot_number(&self) -> u64 {
        self.next_slot_number
    }

    /// Active (non-observing) players that have signalled ready.
    pub fn ready_active_count(&self) -> usize {
        self.players
            .values()
            .filter(|p| p.is_ready && !p.is_observing)
            .count()
    }

    /// Players in admission order.
    pub fn players_by_slot(&self) -> Vec<(&SessionId, &PlayerState)> {
        let mut players: Vec<_> = self.players.iter().collect();
        players.sort_by_key(|(_, p)| p.slot_number);
        players
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LobbyState {
        LobbyState::new(&LobbyConfig::default(), CreateParams::new("m-1"))
    }

    #[test]
    fn test_new_state_is_empty_and_joinable() {
        let s = state();
        assert_eq!(s.phase(), Phase::WaitingForPlayers);
        assert!(s.can_join());
        assert_eq!(s.player_count(), 0);
        assert_eq!(s.next_slot_number(), 0);
        assert_eq!(s.capacity(), 2);
    }

    #[test]
    fn test_reserve_hands_out_increasing_slots() {
        let mut s = state();
        assert_eq!(s.reserve(&SessionId::from("a")), 0);
        assert_eq!(s.reserve(&SessionId::from("b")), 1);
        s.players.remove(&SessionId::from("a"));
        assert_eq!(s.reserve(&SessionId::from("c")), 2);
        assert_eq!(s.next_slot_number(), 3);
    }

    #[test]
    fn test_reserve_same_session_keeps_slot() {
        let mut s = state();
        assert_eq!(s.reserve(&SessionId::from("a")), 0);
        assert_eq!(s.reserve(&SessionId::from("a")), 0);
        assert_eq!(s.next_slot_number(), 1);
        assert_eq!(s.players().len(), 1);
    }

    #[test]
    fn test_advance_to_rejects_skips_and_regressions() {
        let mut s = state();
        assert!(!s.advance_to(Phase::InProgress));
        assert!(s.advance_to(Phase::WaitingForPlayersReady));
        assert!(!s.advance_to(Phase::WaitingForPlayers));
        assert!(s.advance_to(Phase::InProgress));
        assert_eq!(s.phase(), Phase::InProgress);
    }

    #[test]
    fn test_players_by_slot_orders_by_admission() {
        let mut s = state();
        for id in ["z", "y", "x"] {
            s.reserve(&SessionId::from(id));
        }
        let order: Vec<&str> = s
            .players_by_slot()
            .into_iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(order, vec!["z", "y", "x"]);
    }
}
