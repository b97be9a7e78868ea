//! Codec trait and implementations for lobby payloads.
//!
//! Every broadcast, label, and HTTP body in Lobbyforge passes through a
//! [`Codec`]. The lobby handler is generic over it, so a binary format can
//! replace JSON later without touching lobby rules.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts payloads to bytes and back.
///
/// `Send + Sync + 'static` because a codec lives inside a lobby actor for
/// the whole lifetime of the lobby.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] for malformed or mismatched input.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Serializes a value into a UTF-8 string.
    ///
    /// Used for the discovery label, which the hosting runtime stores as
    /// text rather than bytes.
    fn encode_text<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes)
            .map_err(|e| ProtocolError::InvalidMessage(format!("non-utf8 text payload: {e}")))
    }
}

/// A [`Codec`] backed by `serde_json`.
///
/// JSON is what lobby clients and the provisioning service speak today.
///
/// ```rust
/// use lobbyforge_protocol::{Codec, JsonCodec, ReadyNotice, SessionId};
///
/// let codec = JsonCodec;
/// let bytes = codec
///     .encode(&ReadyNotice { session_id: SessionId::from("s-1") })
///     .unwrap();
/// assert_eq!(bytes, br#"{"sessionId":"s-1"}"#);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn encode_text<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }
}
