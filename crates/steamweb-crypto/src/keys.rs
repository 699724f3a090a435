//! Universe-scoped public-key registry.
//!
//! The backend publishes a distinct RSA public key per deployment universe,
//! and the handshake must wrap its session key under the right one. The
//! registry is populated by the embedding application at startup — key
//! distribution is not this crate's job.

use std::collections::HashMap;

use rsa::RsaPublicKey;
use steamweb_protocol::Universe;

use crate::CryptoError;

/// Maps each [`Universe`] to its RSA public key.
///
/// Lookups are read-only after startup, so the registry is plain data —
/// callers that share it across tasks wrap it in an `Arc` (it is never
/// mutated mid-session).
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    keys: HashMap<Universe, RsaPublicKey>,
}

impl KeyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the public key for a universe.
    pub fn insert(&mut self, universe: Universe, key: RsaPublicKey) {
        self.keys.insert(universe, key);
    }

    /// Looks up the public key for a universe.
    pub fn get(&self, universe: Universe) -> Option<&RsaPublicKey> {
        self.keys.get(&universe)
    }

    /// Looks up the public key for a universe, failing with
    /// [`CryptoError::UnknownUniverse`] if none was registered.
    pub fn require(
        &self,
        universe: Universe,
    ) -> Result<&RsaPublicKey, CryptoError> {
        self.get(universe)
            .ok_or(CryptoError::UnknownUniverse(universe))
    }
}
