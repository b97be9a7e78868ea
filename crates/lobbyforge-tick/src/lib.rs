//! Fixed-rate clock for Lobbyforge lobbies.
//!
//! A lobby's `Tick` step runs on a fixed cadence (10 Hz unless configured
//! otherwise). This crate only answers "is the next tick due yet"; the lobby
//! actor owns what a tick does.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* join, leave, ... */ }
//!         _ = clock.wait_for_tick() => {
//!             handler.tick(std::mem::take(&mut pending)).await?;
//!             clock.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! [`TickScheduler::wait_for_tick`] may lose a `select!` race at any point:
//! state only moves once the deadline has been reached.

mod config;
mod scheduler;

pub use config::TickConfig;
pub use scheduler::{TickInfo, TickScheduler};
