//! # Lobbyforge
//!
//! Authoritative pre-game lobbies for multiplayer games.
//!
//! A lobby admits players up to a capacity, turns late joiners into
//! observers, tracks who is ready, and once enough active players are
//! ready asks a provisioning service for a dedicated game server and hands
//! everyone over to it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lobbyforge::prelude::*;
//!
//! # async fn run() -> Result<(), LobbyforgeError> {
//! lobbyforge::init_tracing("info");
//!
//! let settings = Settings::from_env();
//! let directory = Arc::new(MemoryDirectory::new().with_user("u-1", "Ann"));
//! let mut registry = settings.registry(directory)?;
//!
//! let creator = Presence::new("s-1", "u-1", "ann");
//! let created = registry
//!     .create_lobby(&creator, CreateLobbyRequest::default())
//!     .await?;
//! assert_eq!(created.match_name, "Play with Ann");
//! # Ok(())
//! # }
//! ```

mod error;
mod settings;
mod telemetry;

pub use error::LobbyforgeError;
pub use settings::Settings;
pub use telemetry::init_tracing;

pub use lobbyforge_host as host;
pub use lobbyforge_launch as launch;
pub use lobbyforge_lobby as lobby;
pub use lobbyforge_protocol as protocol;
pub use lobbyforge_tick as tick;

/// The types most applications need.
pub mod prelude {
    pub use crate::{LobbyforgeError, Settings};
    pub use lobbyforge_host::{HostError, LobbyFilter, LobbyHandle, LobbyInfo, LobbyRegistry};
    pub use lobbyforge_launch::{HttpLauncher, LaunchConfig, Launcher};
    pub use lobbyforge_lobby::{
        IdentityDirectory, LobbyConfig, MemoryDirectory, Phase, UserRecord,
    };
    pub use lobbyforge_protocol::{
        CreateLobbyRequest, CreateLobbyResponse, InboundMessage, LobbyId, OpCode,
        OutboundMessage, Presence, SessionId, UserId,
    };
}
