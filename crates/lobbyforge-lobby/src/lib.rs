//! The pre-game lobby state machine for Lobbyforge.
//!
//! One [`LobbyHandler`] owns one lobby. It admits players up to capacity,
//! designates late joiners as observers, tracks readiness, broadcasts the
//! roster, and hands the lobby off to a freshly provisioned game server
//! once enough active players are ready.
//!
//! # Key types
//!
//! - [`LobbyHandler`]: the lifecycle operations (create, admission, join,
//!   leave, tick, terminate, signal)
//! - [`LobbyState`] / [`PlayerState`]: the authoritative snapshot
//! - [`Phase`]: `WaitingForPlayers → WaitingForPlayersReady → InProgress`
//! - [`LobbyConfig`] / [`CreateParams`]: capacity, tick rate, timeouts
//! - [`Dispatcher`] / [`IdentityDirectory`]: capabilities supplied by the
//!   hosting runtime
//!
//! The handler never locks. Whoever hosts it must call its operations one
//! at a time.

mod config;
mod directory;
mod dispatch;
mod encode;
mod error;
mod handler;
mod observers;
mod state;

pub use config::{CreateParams, LobbyConfig, Phase};
pub use directory::{IdentityDirectory, MemoryDirectory, UserRecord};
pub use dispatch::Dispatcher;
pub use encode::{
    encode_label, encode_launch_failed, encode_lobby_update, encode_ready_signal, label,
    lobby_update,
};
pub use error::{DirectoryError, LobbyError};
pub use handler::{Admission, Created, LobbyHandler, TickOutcome, MATCH_FULL};
pub use observers::recompute_observers;
pub use state::{LobbyState, PlayerState};
