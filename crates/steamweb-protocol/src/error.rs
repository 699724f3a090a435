//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. This keeps
//! errors specific and meaningful — a `ProtocolError` always means a
//! serialization problem, never a network or crypto one.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    ///
    /// The inner `serde_json::Error` is the original error from the codec.
    /// We wrap it so callers deal with `ProtocolError` uniformly,
    /// regardless of which codec produced it.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, wrong data
    /// types, or truncated message bodies.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is invalid at the protocol level — it decoded fine but
    /// violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
