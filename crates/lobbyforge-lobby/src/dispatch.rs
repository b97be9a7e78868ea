use lobbyforge_protocol::OpCode;

/// Outbound capabilities the hosting runtime lends to a lobby.
///
/// Broadcasts go to every session currently attached to the lobby,
/// observers included. Delivery is best effort: a session that went away
/// simply misses the message.
pub trait Dispatcher: Send + 'static {
    fn broadcast(&mut self, op: OpCode, payload: &[u8]);

    /// Replaces the lobby's discovery label.
    fn update_label(&mut self, label: &str);
}
