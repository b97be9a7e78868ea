//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding lobby payloads.
///
/// Payload shapes are fixed and generated by the server itself, so an
/// `Encode` error means something is badly wrong. `Decode` errors are
/// expected when clients or external services send malformed bytes.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a payload to bytes failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Parsing bytes into a payload failed.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The bytes parsed but violate a protocol rule, such as an op code
    /// outside the known range.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
