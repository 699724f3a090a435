//! Handshake cryptography for the steamweb client.
//!
//! This crate builds the encrypted payload that redeems a protocol-delivered
//! login nonce for web session credentials:
//!
//! 1. A fresh 32-byte session key is drawn from OS randomness.
//! 2. The session key is wrapped with RSA-OAEP under the public key of the
//!    target [`Universe`](steamweb_protocol::Universe).
//! 3. The nonce is encrypted with AES-256 under the session key.
//!
//! The session key is one-time: generated per attempt, never cached, never
//! reused. Both outputs are opaque byte strings handed verbatim to the HTTP
//! exchange.
//!
//! Key provisioning is out of scope — callers populate a [`KeyRegistry`]
//! before the first handshake.

mod error;
mod handshake;
mod keys;

pub use error::CryptoError;
pub use handshake::{SESSION_KEY_LEN, SealedNonce, seal_nonce};
pub use keys::KeyRegistry;

// Re-exported so callers can populate a `KeyRegistry` (and tests can mint
// throwaway keys) without pinning the `rsa` crate themselves.
pub use rsa::{RsaPrivateKey, RsaPublicKey};
