//! Error types for the handshake cryptography.

use steamweb_protocol::Universe;

/// Errors that can occur while sealing a login nonce.
///
/// Every variant aborts exactly one log-on attempt and travels the same
/// retry path as an HTTP failure — no partial payload is ever sent.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// No public key was registered for the target universe.
    /// This is a configuration problem, not a transient one: retrying
    /// without fixing the [`KeyRegistry`](crate::KeyRegistry) will fail
    /// the same way.
    #[error("no public key registered for universe {0}")]
    UnknownUniverse(Universe),

    /// The OS randomness source failed while drawing the session key or IV.
    #[error("system randomness unavailable: {0}")]
    Rng(#[from] rand::Error),

    /// RSA-OAEP encryption of the session key failed.
    #[error("asymmetric encryption failed: {0}")]
    Rsa(rsa::Error),
}
