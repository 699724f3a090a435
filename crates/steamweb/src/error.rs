//! Unified error type for the session layer.

use steamweb_crypto::CryptoError;
use steamweb_protocol::ProtocolError;

/// Errors produced by the web-session handshake.
///
/// Only [`NotInitialized`](WebAuthError::NotInitialized) and
/// [`AttemptInProgress`](WebAuthError::AttemptInProgress) are returned
/// synchronously from `log_on`. Everything else surfaces through the
/// [`WebEvent::LogOnFailed`](crate::WebEvent::LogOnFailed) event, and only
/// after the attempt sequence is exhausted — a 401 from the endpoint is a
/// normal branch, not an error, and never appears here.
#[derive(Debug, thiserror::Error)]
pub enum WebAuthError {
    /// `log_on` was called before the first login nonce arrived over the
    /// protocol channel. Checked before any asynchronous work is scheduled.
    #[error("web session not initialized: no login nonce received yet")]
    NotInitialized,

    /// Another attempt sequence is already in flight (or a stale-nonce
    /// recovery is pending). Calling again once it settles is fine.
    #[error("a log-on attempt is already in progress")]
    AttemptInProgress,

    /// Sealing the nonce failed (randomness, key lookup, or RSA).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Encoding an outbound protocol message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The authentication endpoint could not be reached.
    #[error("authentication endpoint unreachable: {0}")]
    Network(reqwest::Error),

    /// The endpoint answered with a status that is neither success nor the
    /// stale-nonce signal.
    #[error("authentication request failed with status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The endpoint answered 200 but the body did not decode into the
    /// expected credential shape.
    #[error("malformed authentication response: {0}")]
    MalformedResponse(reqwest::Error),

    /// The HTTP client itself could not be constructed (TLS backend
    /// initialization, mostly). Raised once, at session construction.
    #[error("failed to build http client: {0}")]
    HttpClient(reqwest::Error),
}
