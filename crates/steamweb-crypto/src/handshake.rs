//! Sealing a login nonce into the handshake payload.
//!
//! The payload has two parts, mirroring what the authentication endpoint
//! expects:
//!
//! - `encrypted_session_key` — a fresh 32-byte AES key, wrapped with
//!   RSA-OAEP (SHA-1) under the universe's public key.
//! - `encrypted_nonce` — the UTF-8 bytes of the nonce, encrypted with
//!   AES-256-CBC/PKCS#7 under that session key. The random IV does not
//!   travel in the clear: it is encrypted as a single AES-ECB block and
//!   prepended, so the wire layout is `ECB(IV) || CBC(plaintext)`.
//!
//! That IV construction is unusual but it is what the endpoint decrypts, so
//! it is preserved exactly.

use aes::Aes256;
use aes::cipher::{
    BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit, block_padding::Pkcs7,
    generic_array::GenericArray,
};
use rand::RngCore;
use rand::rngs::OsRng;
use rsa::{Oaep, RsaPublicKey};
use sha1::Sha1;

use crate::CryptoError;

/// Length of the one-time symmetric session key, in bytes (AES-256).
pub const SESSION_KEY_LEN: usize = 32;

/// AES block (and IV) length, in bytes.
const AES_BLOCK_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// The encrypted handshake payload for one log-on attempt.
///
/// Both fields are opaque byte strings; the HTTP exchange percent-encodes
/// them verbatim into form fields. Nothing here is reusable across
/// attempts — the session key inside is one-time by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedNonce {
    /// RSA-OAEP ciphertext of the one-time session key.
    pub encrypted_session_key: Vec<u8>,

    /// `ECB(IV) || CBC(nonce bytes)` under the session key.
    pub encrypted_nonce: Vec<u8>,
}

/// Seals a login nonce under the given universe public key.
///
/// Draws fresh randomness for both the session key and the IV on every
/// call — two calls with the same inputs produce entirely different
/// ciphertexts that redeem the same nonce.
///
/// # Errors
/// [`CryptoError::Rng`] if the OS randomness source fails,
/// [`CryptoError::Rsa`] if the session key can't be wrapped. Either way no
/// partial payload is returned.
pub fn seal_nonce(
    public_key: &RsaPublicKey,
    nonce: &str,
) -> Result<SealedNonce, CryptoError> {
    let mut session_key = [0u8; SESSION_KEY_LEN];
    OsRng.try_fill_bytes(&mut session_key)?;

    let encrypted_session_key = public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha1>(), &session_key)
        .map_err(CryptoError::Rsa)?;

    let mut iv = [0u8; AES_BLOCK_LEN];
    OsRng.try_fill_bytes(&mut iv)?;

    let key = GenericArray::from_slice(&session_key);
    let block_cipher = Aes256::new(key);

    // The IV is exactly one AES block, encrypted in place.
    let mut iv_block = GenericArray::clone_from_slice(&iv);
    block_cipher.encrypt_block(&mut iv_block);

    let ciphertext = Aes256CbcEnc::new(key, GenericArray::from_slice(&iv))
        .encrypt_padded_vec_mut::<Pkcs7>(nonce.as_bytes());

    let mut encrypted_nonce =
        Vec::with_capacity(AES_BLOCK_LEN + ciphertext.len());
    encrypted_nonce.extend_from_slice(&iv_block);
    encrypted_nonce.extend_from_slice(&ciphertext);

    Ok(SealedNonce {
        encrypted_session_key,
        encrypted_nonce,
    })
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use aes::cipher::{BlockDecrypt, BlockDecryptMut};
    use rsa::RsaPrivateKey;

    use super::*;

    /// One shared keypair for the whole test module — RSA generation is by
    /// far the slowest step, so we pay for it once.
    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| {
            RsaPrivateKey::new(&mut OsRng, 1024)
                .expect("key generation should succeed")
        })
    }

    /// Inverts `seal_nonce`: unwrap the session key, decrypt the IV block,
    /// then CBC-decrypt the body.
    fn unseal(private_key: &RsaPrivateKey, sealed: &SealedNonce) -> Vec<u8> {
        let session_key = private_key
            .decrypt(Oaep::new::<Sha1>(), &sealed.encrypted_session_key)
            .expect("session key should unwrap");
        assert_eq!(session_key.len(), SESSION_KEY_LEN);

        let key = GenericArray::from_slice(&session_key);
        let block_cipher = Aes256::new(key);

        let mut iv = GenericArray::clone_from_slice(
            &sealed.encrypted_nonce[..AES_BLOCK_LEN],
        );
        block_cipher.decrypt_block(&mut iv);

        cbc::Decryptor::<Aes256>::new(key, &iv)
            .decrypt_padded_vec_mut::<Pkcs7>(
                &sealed.encrypted_nonce[AES_BLOCK_LEN..],
            )
            .expect("padding should be valid")
    }

    #[test]
    fn test_round_trip_recovers_nonce() {
        let private = test_key();
        let sealed =
            seal_nonce(&private.to_public_key(), "opaque-login-nonce")
                .unwrap();
        assert_eq!(unseal(private, &sealed), b"opaque-login-nonce");
    }

    #[test]
    fn test_session_key_is_fresh_per_call() {
        // Same nonce, two calls: every ciphertext must differ, but both
        // must still decrypt to the same plaintext.
        let private = test_key();
        let public = private.to_public_key();

        let first = seal_nonce(&public, "same-nonce").unwrap();
        let second = seal_nonce(&public, "same-nonce").unwrap();

        assert_ne!(first.encrypted_session_key, second.encrypted_session_key);
        assert_ne!(first.encrypted_nonce, second.encrypted_nonce);
        assert_eq!(unseal(private, &first), unseal(private, &second));
    }

    #[test]
    fn test_encrypted_nonce_layout() {
        // One encrypted IV block in front, then whole CBC blocks. A short
        // nonce pads to a single block, so the total is exactly two.
        let sealed =
            seal_nonce(&test_key().to_public_key(), "abc").unwrap();
        assert_eq!(sealed.encrypted_nonce.len(), 2 * AES_BLOCK_LEN);
    }

    #[test]
    fn test_empty_nonce_still_seals() {
        // The session layer refuses empty nonces before reaching crypto,
        // but the primitive itself has no length restriction.
        let private = test_key();
        let sealed = seal_nonce(&private.to_public_key(), "").unwrap();
        assert_eq!(unseal(private, &sealed), b"");
    }
}
