//! Core protocol types for the steamweb client.
//!
//! This module defines every type the session layer exchanges with the
//! connection: identity types, the message-kind enum, the packet wrapper,
//! and the typed bodies of the messages the web-auth handshake consumes and
//! produces.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::{Codec, ProtocolError};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A 64-bit Steam identifier.
///
/// This is a "newtype wrapper" around `u64` — you can't accidentally pass a
/// login-key unique id where a `SteamId` is expected, even though both are
/// integers underneath.
///
/// `#[serde(transparent)]` makes it serialize as the bare number, not as
/// `{ "0": 76561197960287930 }`.
///
/// The `Display` impl renders the full 64-bit value in decimal. That exact
/// rendering is what the authentication endpoint expects in its `steamid`
/// form field, so web-facing code can just format the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamId(pub u64);

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The deployment universe a connection belongs to.
///
/// Each universe has its own asymmetric public key; the handshake selects
/// the key by this enum. Almost everything real runs in `Public` — the
/// other variants exist because the backend's id format reserves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Universe {
    Invalid,
    Public,
    Beta,
    Internal,
    Dev,
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// ---------------------------------------------------------------------------
// MsgKind — which message is in the packet?
// ---------------------------------------------------------------------------

/// The kind of a protocol message.
///
/// The connection layer tags every inbound [`Packet`] with one of these so
/// handlers can filter without decoding the body first. Only
/// [`MsgKind::NewLoginKey`] and [`MsgKind::WebApiNonceResponse`] matter to
/// the web-auth handshake; the remaining kinds are here so dispatch has
/// something realistic to ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MsgKind {
    /// Server → Client: a new login key is available. Body: [`NewLoginKey`].
    NewLoginKey,

    /// Client → Server: acknowledges a received login key.
    /// Body: [`NewLoginKeyAccepted`]. Mandatory for every `NewLoginKey`.
    NewLoginKeyAccepted,

    /// Client → Server: "my login nonce went stale, send a fresh one."
    /// Body: [`RequestWebApiNonce`] (empty).
    RequestWebApiNonce,

    /// Server → Client: the fresh login nonce. Body: [`WebApiNonceResponse`].
    WebApiNonceResponse,

    /// Keep-alive traffic. Not handled by this layer.
    Heartbeat,

    /// Server → Client: the session was terminated. Not handled by this layer.
    LoggedOff,
}

impl fmt::Display for MsgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// ---------------------------------------------------------------------------
// Packet — a framed, not-yet-decoded message
// ---------------------------------------------------------------------------

/// One already-framed protocol message, as the connection layer hands it
/// over: a kind tag plus the still-encoded body bytes.
///
/// The body stays opaque until a handler that recognizes the kind decodes
/// it with a [`Codec`]. A malformed body is therefore a per-handler
/// decision — dispatch itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Which message this is.
    pub kind: MsgKind,

    /// The codec-encoded message body.
    pub body: Vec<u8>,
}

impl Packet {
    /// Encodes a typed body into a packet of the given kind.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the codec rejects the body.
    pub fn encode<T: Serialize, C: Codec>(
        kind: MsgKind,
        body: &T,
        codec: &C,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            kind,
            body: codec.encode(body)?,
        })
    }

    /// Decodes the packet body into a typed message.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the body is malformed or does
    /// not match the expected shape.
    pub fn decode<T: serde::de::DeserializeOwned, C: Codec>(
        &self,
        codec: &C,
    ) -> Result<T, ProtocolError> {
        codec.decode(&self.body)
    }
}

// ---------------------------------------------------------------------------
// Message bodies
// ---------------------------------------------------------------------------

/// Server → Client: a new login key was issued.
///
/// The handshake only needs the `unique_id` — it is acknowledged verbatim
/// and the web session id is derived from its decimal rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoginKey {
    /// Identifies this particular key issuance. Echoed back in the ack.
    pub unique_id: u32,
}

/// Client → Server: acknowledges [`NewLoginKey`] with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoginKeyAccepted {
    /// The `unique_id` of the key being acknowledged.
    pub unique_id: u32,
}

/// Client → Server: requests a fresh web-auth nonce. Carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestWebApiNonce {}

/// Server → Client: the fresh web-auth nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebApiNonceResponse {
    /// The opaque nonce. The client never inspects it, only encrypts it.
    pub nonce: String,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Tests for protocol types and their JSON shapes.
    //!
    //! The connection layer on the other side of the seam produces and
    //! consumes these exact shapes, so a serde-attribute regression here
    //! breaks interop even though everything still compiles.

    use super::*;
    use crate::JsonCodec;

    #[test]
    fn test_steam_id_serializes_as_plain_number() {
        // `#[serde(transparent)]` means SteamId(n) → `n`, not `{"0":n}`.
        let json = serde_json::to_string(&SteamId(76561197960287930)).unwrap();
        assert_eq!(json, "76561197960287930");
    }

    #[test]
    fn test_steam_id_display_is_decimal() {
        // The Display rendering is sent verbatim as the `steamid` form field.
        assert_eq!(SteamId(76561197960287930).to_string(), "76561197960287930");
    }

    #[test]
    fn test_universe_round_trip() {
        for universe in [
            Universe::Invalid,
            Universe::Public,
            Universe::Beta,
            Universe::Internal,
            Universe::Dev,
        ] {
            let bytes = serde_json::to_vec(&universe).unwrap();
            let decoded: Universe = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(universe, decoded);
        }
    }

    #[test]
    fn test_new_login_key_json_format() {
        let msg = NewLoginKey { unique_id: 12345 };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["unique_id"], 12345);
    }

    #[test]
    fn test_new_login_key_accepted_round_trip() {
        let msg = NewLoginKeyAccepted { unique_id: 7 };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: NewLoginKeyAccepted =
            serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_request_web_api_nonce_is_empty_object() {
        let json = serde_json::to_string(&RequestWebApiNonce {}).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_web_api_nonce_response_round_trip() {
        let msg = WebApiNonceResponse {
            nonce: "opaque-nonce".into(),
        };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: WebApiNonceResponse =
            serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_packet_encode_decode_round_trip() {
        let codec = JsonCodec;
        let packet = Packet::encode(
            MsgKind::NewLoginKey,
            &NewLoginKey { unique_id: 42 },
            &codec,
        )
        .unwrap();

        assert_eq!(packet.kind, MsgKind::NewLoginKey);
        let decoded: NewLoginKey = packet.decode(&codec).unwrap();
        assert_eq!(decoded.unique_id, 42);
    }

    #[test]
    fn test_packet_decode_garbage_returns_error() {
        let packet = Packet {
            kind: MsgKind::NewLoginKey,
            body: b"not json at all".to_vec(),
        };
        let result: Result<NewLoginKey, _> = packet.decode(&JsonCodec);
        assert!(result.is_err());
    }

    #[test]
    fn test_packet_decode_wrong_shape_returns_error() {
        // Valid JSON, but missing the required field.
        let packet = Packet {
            kind: MsgKind::NewLoginKey,
            body: br#"{"name": "hello"}"#.to_vec(),
        };
        let result: Result<NewLoginKey, _> = packet.decode(&JsonCodec);
        assert!(result.is_err());
    }
}
