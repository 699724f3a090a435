//! The HTTP round trip that redeems a sealed nonce for credentials.
//!
//! One `POST` to the authentication endpoint, one exhaustive
//! classification of the answer:
//!
//! | Answer                      | Meaning                                |
//! |-----------------------------|----------------------------------------|
//! | transport failure           | `WebAuthError::Network` (hard error)   |
//! | 401                         | stale nonce — normal branch, no error  |
//! | 200 + decodable body        | credentials extracted                  |
//! | 200 + undecodable body      | `WebAuthError::MalformedResponse`      |
//! | anything else               | `WebAuthError::UnexpectedStatus`       |
//!
//! The exchange performs no retries and mutates no session state — it is a
//! pure request/classify step the [`WebSession`](crate::WebSession)
//! orchestrates.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use steamweb_crypto::SealedNonce;
use steamweb_protocol::SteamId;
use url::form_urlencoded;

use crate::WebAuthError;

/// The production authentication endpoint. Overridable through
/// [`WebSessionConfig`](crate::WebSessionConfig) so tests can point the
/// exchange at a local server.
pub const AUTH_ENDPOINT: &str =
    "https://api.steampowered.com/ISteamUserAuth/AuthenticateUser/v0001";

/// Success body: `{"authenticateuser": {"token": ..., "tokensecure": ...}}`.
#[derive(Debug, Deserialize)]
struct AuthenticateUserResponse {
    authenticateuser: AuthenticateUserTokens,
}

#[derive(Debug, Deserialize)]
struct AuthenticateUserTokens {
    token: String,
    tokensecure: String,
}

/// The two non-error outcomes of one exchange.
#[derive(Debug)]
pub(crate) enum ExchangeOutcome {
    /// 200 — the two session cookies, both always present.
    Authenticated { token: String, token_secure: String },

    /// 401 — the nonce is no longer valid and must be refreshed over the
    /// protocol channel before another exchange can succeed.
    StaleNonce,
}

/// Owns the HTTP client and the endpoint URL.
#[derive(Debug, Clone)]
pub(crate) struct CredentialExchange {
    http: reqwest::Client,
    endpoint: String,
}

impl CredentialExchange {
    /// Builds the exchange. `timeout: None` reproduces the reference
    /// client, which bounds the request only by the transport.
    pub(crate) fn new(
        endpoint: String,
        timeout: Option<Duration>,
    ) -> Result<Self, WebAuthError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(WebAuthError::HttpClient)?;
        Ok(Self { http, endpoint })
    }

    /// Performs one exchange and classifies the answer.
    ///
    /// # Errors
    /// `Network`, `UnexpectedStatus`, or `MalformedResponse` — each aborts
    /// exactly one attempt; the caller decides whether to retry.
    pub(crate) async fn redeem(
        &self,
        steam_id: SteamId,
        sealed: &SealedNonce,
    ) -> Result<ExchangeOutcome, WebAuthError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form_body(steam_id, sealed))
            .send()
            .await
            .map_err(WebAuthError::Network)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(ExchangeOutcome::StaleNonce),
            StatusCode::OK => {
                let decoded: AuthenticateUserResponse = response
                    .json()
                    .await
                    .map_err(WebAuthError::MalformedResponse)?;
                Ok(ExchangeOutcome::Authenticated {
                    token: decoded.authenticateuser.token,
                    token_secure: decoded.authenticateuser.tokensecure,
                })
            }
            status => Err(WebAuthError::UnexpectedStatus(status)),
        }
    }
}

/// Renders the form body by hand: the two encrypted fields are raw bytes,
/// not UTF-8, so they go through `form_urlencoded::byte_serialize` instead
/// of a string-typed form serializer.
fn form_body(steam_id: SteamId, sealed: &SealedNonce) -> String {
    let session_key: String =
        form_urlencoded::byte_serialize(&sealed.encrypted_session_key)
            .collect();
    let login_key: String =
        form_urlencoded::byte_serialize(&sealed.encrypted_nonce).collect();

    format!(
        "format=json&steamid={steam_id}&sessionkey={session_key}&encrypted_loginkey={login_key}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed(key: &[u8], nonce: &[u8]) -> SealedNonce {
        SealedNonce {
            encrypted_session_key: key.to_vec(),
            encrypted_nonce: nonce.to_vec(),
        }
    }

    #[test]
    fn test_form_body_field_order_and_values() {
        let body = form_body(
            SteamId(76561197960287930),
            &sealed(b"abc", b"xyz"),
        );
        assert_eq!(
            body,
            "format=json&steamid=76561197960287930&sessionkey=abc&encrypted_loginkey=xyz"
        );
    }

    #[test]
    fn test_form_body_percent_encodes_binary() {
        // 0xFF is not valid UTF-8 and must arrive as %FF; a space becomes
        // '+' in form encoding.
        let body = form_body(SteamId(1), &sealed(&[0xFF, b' '], &[0x00]));
        assert!(body.contains("sessionkey=%FF+"));
        assert!(body.contains("encrypted_loginkey=%00"));
    }

    #[test]
    fn test_success_body_decodes() {
        let json = r#"{"authenticateuser":{"token":"a","tokensecure":"b"}}"#;
        let decoded: AuthenticateUserResponse =
            serde_json::from_str(json).unwrap();
        assert_eq!(decoded.authenticateuser.token, "a");
        assert_eq!(decoded.authenticateuser.tokensecure, "b");
    }

    #[test]
    fn test_success_body_missing_field_fails() {
        let json = r#"{"authenticateuser":{"token":"a"}}"#;
        let decoded: Result<AuthenticateUserResponse, _> =
            serde_json::from_str(json);
        assert!(decoded.is_err());
    }
}
