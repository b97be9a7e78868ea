use crate::LobbyState;

/// Marks the `required_player_count` lowest-slot players as active and
/// everyone else as observing.
///
/// Slots are unique, so a player's rank is the number of slots below its
/// own. When someone active leaves, the earliest observer is promoted.
pub fn recompute_observers(state: &mut LobbyState) {
    let mut slots: Vec<u64> = state.players.values().map(|p| p.slot_number).collect();
    slots.sort_unstable();

    let required = state.required_player_count;
    for player in state.players.values_mut() {
        let rank = slots.partition_point(|s| *s < player.slot_number);
        player.is_observing = rank >= required;
    }
}
