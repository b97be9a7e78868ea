//! Runs lobbies as isolated Tokio tasks and keeps track of them.
//!
//! Each lobby lives in its own actor task, driven by a
//! [`TickScheduler`](lobbyforge_tick::TickScheduler) and a bounded command
//! channel. The actor is the only thing that ever touches its
//! [`LobbyHandler`](lobbyforge_lobby::LobbyHandler), so lifecycle calls are
//! serialized without locks.
//!
//! [`LobbyRegistry`] is the entry point: it creates lobbies, routes sessions
//! and their messages to the right actor, and answers discovery queries.

mod actor;
mod dispatcher;
mod error;
mod registry;

pub use actor::{LobbyHandle, LobbyInfo};
pub use dispatcher::{ChannelDispatcher, SessionSender};
pub use error::HostError;
pub use registry::{LobbyFilter, LobbyRegistry};
