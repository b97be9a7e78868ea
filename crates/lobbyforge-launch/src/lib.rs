//! Game-server provisioning for Lobbyforge.
//!
//! When a lobby has enough ready players it asks an external provisioning
//! service to stand up a dedicated game server, then forwards the
//! service's reply to every participant untouched.
//!
//! - [`Launcher`]: the seam the lobby handler calls through
//! - [`HttpLauncher`]: POSTs `{"matchId": ...}` to one configured endpoint
//! - [`LaunchConfig`]: endpoint and timeout
//! - [`LaunchError`]: every way a launch can fail

mod client;
mod config;
mod error;

pub use client::{HttpLauncher, Launcher};
pub use config::{ENDPOINT_VAR, LaunchConfig, TIMEOUT_VAR};
pub use error::LaunchError;
