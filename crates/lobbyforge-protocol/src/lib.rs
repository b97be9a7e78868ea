//! Wire protocol for Lobbyforge.
//!
//! This crate defines what a lobby says to its participants and to the
//! outside world:
//!
//! - **Identity** ([`SessionId`], [`UserId`], [`LobbyId`], [`Presence`]):
//!   who is connected and which lobby they are in.
//! - **Messages** ([`OpCode`], [`LobbyUpdate`], [`ReadyNotice`],
//!   [`LobbyLabel`], ...): the payloads broadcast to sessions and
//!   published for discovery.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how payloads become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about lobby rules. It only fixes the
//! shapes that clients and external services rely on.

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{
    CreateLobbyRequest, CreateLobbyResponse, InboundMessage, LaunchFailedNotice,
    LaunchRequest, LobbyLabel, LobbyUpdate, OutboundMessage, PlayerSummary,
    ReadyNotice,
};
pub use types::{LobbyId, OpCode, Presence, SessionId, UserId};
