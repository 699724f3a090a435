//! Wire-level types for the steamweb client.
//!
//! This crate defines the "language" spoken between the session layer and
//! the connection that carries the binary protocol:
//!
//! - **Types** ([`Packet`], [`MsgKind`], the typed message bodies,
//!   [`SteamId`], [`Universe`]) — the structures the connection layer
//!   delivers and accepts.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how message bodies are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer knows nothing about HTTP, cryptography, or session
//! state — it only knows how to name and (de)serialize messages. Transport
//! framing and connection lifecycle live below it and are out of scope.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    MsgKind, NewLoginKey, NewLoginKeyAccepted, Packet, RequestWebApiNonce,
    SteamId, Universe, WebApiNonceResponse,
};
