//! The web-session state machine: `log_on`, packet dispatch, and the
//! stale-nonce recovery loop.
//!
//! # State machine
//!
//! ```text
//!   Idle ──(nonce delivered)──→ Ready ──(log_on)──→ Attempting
//!                                 ↑                     │
//!                                 │      ┌──────────────┼────────────┐
//!                                 │      ▼              ▼            ▼
//!                                 │  Authenticated   3 failures   401
//!                                 │   (LoggedOn)    (LogOnFailed)    │
//!                                 │      │              │            ▼
//!                                 │  (log_on again)     │    StaleNoncePending
//!                                 │                     │            │
//!                                 └─────────────────────┴──(fresh nonce: CAS
//!                                                           + auto log_on)
//! ```
//!
//! The state lives in one `AtomicU8` and every transition that two
//! execution contexts could race on — claiming the attempt slot, clearing
//! `StaleNoncePending` when the fresh nonce lands — is a single
//! compare-and-swap. There is deliberately no read-then-write anywhere:
//! two racing 401s can't both request a refresh for the same cause, and a
//! delivered nonce can't be lost between a load and a store.
//!
//! Message dispatch and the attempt task never block each other: `log_on`
//! returns as soon as the slot is claimed, and the (network-bound) attempt
//! sequence runs on its own spawned task.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use steamweb_crypto::{KeyRegistry, seal_nonce};
use steamweb_protocol::{
    JsonCodec, MsgKind, NewLoginKey, NewLoginKeyAccepted, Packet,
    RequestWebApiNonce, Universe, WebApiNonceResponse,
};

use crate::WebAuthError;
use crate::connection::Connection;
use crate::events::WebEvent;
use crate::exchange::{AUTH_ENDPOINT, CredentialExchange, ExchangeOutcome};

/// How many exchange attempts one `log_on` call makes, back to back, with
/// no delay in between. A 401 does not consume a slot — recovery for that
/// is handed to the nonce-delivery path instead.
pub const LOGON_ATTEMPTS: u32 = 3;

// ---------------------------------------------------------------------------
// AuthState
// ---------------------------------------------------------------------------

/// Where the session is in its authentication lifecycle.
///
/// Stored as an `AtomicU8`; the enum exists so transitions are named and
/// observable instead of being an anonymous flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthState {
    /// No login nonce has arrived yet; `log_on` fails synchronously.
    Idle = 0,

    /// A nonce is cached and no attempt is running.
    Ready = 1,

    /// An attempt sequence is in flight on a spawned task.
    Attempting = 2,

    /// A 401 told us the nonce is stale; a refresh was requested and the
    /// next `WebApiNonceResponse` will automatically retry. This state is
    /// the "pending refresh" flag.
    StaleNoncePending = 3,

    /// Both credentials are set. `log_on` may run again and overwrites
    /// them wholesale.
    Authenticated = 4,
}

impl AuthState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => AuthState::Idle,
            1 => AuthState::Ready,
            2 => AuthState::Attempting,
            3 => AuthState::StaleNoncePending,
            4 => AuthState::Authenticated,
            // The atomic is only ever written from AuthState values.
            _ => unreachable!("invalid auth state {raw}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`WebSession`]. `Default` is the production setup.
#[derive(Debug, Clone)]
pub struct WebSessionConfig {
    /// The authentication endpoint. Defaults to [`AUTH_ENDPOINT`].
    pub endpoint: String,

    /// Which universe's public key seals the nonce.
    pub universe: Universe,

    /// Optional bound on each HTTP exchange. `None` (the default)
    /// reproduces the reference client, which applies no timeout.
    pub http_timeout: Option<Duration>,
}

impl Default for WebSessionConfig {
    fn default() -> Self {
        Self {
            endpoint: AUTH_ENDPOINT.to_string(),
            universe: Universe::Public,
            http_timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// WebSession
// ---------------------------------------------------------------------------

/// Everything the handshake reads and writes besides the atomic state.
///
/// All four are opaque strings, empty until first delivered/earned, and
/// overwritten wholesale — never merged. `login_key` and `session_id` are
/// independent: a fresh nonce does not imply a new session id, nor the
/// other way around.
#[derive(Debug, Default)]
struct SessionFields {
    /// The opaque login nonce; plaintext input to the handshake.
    login_key: String,

    /// base64 of the decimal rendering of the last login-key unique id.
    session_id: String,

    /// The `steamLogin` cookie value.
    login_token: String,

    /// The `steamLoginSecure` cookie value.
    login_token_secure: String,
}

struct Inner<C: Connection> {
    conn: Arc<C>,
    exchange: CredentialExchange,
    keys: KeyRegistry,
    universe: Universe,
    codec: JsonCodec,
    state: AtomicU8,
    fields: Mutex<SessionFields>,
}

/// The web-session handle: one per connection, living as long as the
/// connection does.
///
/// The handle is a cheap clone over shared state — `log_on` hands a clone
/// to its spawned attempt task, and the embedding connection layer can keep
/// another for dispatching inbound packets.
pub struct WebSession<C: Connection> {
    inner: Arc<Inner<C>>,
}

// Manual impl: `#[derive(Clone)]` would demand `C: Clone`, but only the
// `Arc` is cloned.
impl<C: Connection> Clone for WebSession<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// How one attempt inside the sequence ended, hard errors aside.
enum AttemptEnd {
    /// Credentials written, `LoggedOn` emitted.
    Authenticated,

    /// 401: recovery armed and a refresh requested; the sequence stops
    /// here and the nonce-delivery path picks it back up.
    AwaitingFreshNonce,
}

impl<C: Connection> WebSession<C> {
    /// Creates the session in `Idle` with all fields empty.
    ///
    /// # Errors
    /// [`WebAuthError::HttpClient`] if the HTTP client can't be built.
    pub fn new(
        conn: Arc<C>,
        keys: KeyRegistry,
        config: WebSessionConfig,
    ) -> Result<Self, WebAuthError> {
        let exchange =
            CredentialExchange::new(config.endpoint, config.http_timeout)?;
        Ok(Self {
            inner: Arc::new(Inner {
                conn,
                exchange,
                keys,
                universe: config.universe,
                codec: JsonCodec,
                state: AtomicU8::new(AuthState::Idle as u8),
                fields: Mutex::new(SessionFields::default()),
            }),
        })
    }

    /// The `sessionid` cookie value. Empty until the first login key
    /// delivery.
    pub fn session_id(&self) -> String {
        self.fields().session_id.clone()
    }

    /// The `steamLogin` cookie value. Empty until the first successful
    /// log-on.
    pub fn login_token(&self) -> String {
        self.fields().login_token.clone()
    }

    /// The `steamLoginSecure` cookie value. Empty until the first
    /// successful log-on.
    pub fn login_token_secure(&self) -> String {
        self.fields().login_token_secure.clone()
    }

    /// Current position in the authentication lifecycle.
    pub fn auth_state(&self) -> AuthState {
        AuthState::from_u8(self.inner.state.load(Ordering::SeqCst))
    }

    /// Starts an asynchronous log-on sequence.
    ///
    /// Returns immediately after claiming the attempt slot; the sequence
    /// (up to [`LOGON_ATTEMPTS`] exchanges) runs on a spawned task and
    /// reports through events: one `LoggedOn` on success, one
    /// `LogOnFailed` after the final hard failure, nothing yet on a
    /// stale-nonce handoff.
    ///
    /// # Errors
    /// - [`WebAuthError::NotInitialized`] — no nonce has arrived yet.
    /// - [`WebAuthError::AttemptInProgress`] — an earlier sequence is
    ///   still in flight or awaiting a fresh nonce.
    pub fn log_on(&self) -> Result<(), WebAuthError> {
        if self.fields().login_key.is_empty() {
            return Err(WebAuthError::NotInitialized);
        }
        self.claim_attempt_slot()?;

        let session = self.clone();
        tokio::spawn(async move { session.run_attempts().await });
        Ok(())
    }

    /// Dispatch entry point: the connection calls this for every inbound
    /// message. Filters to the two kinds the handshake consumes; all
    /// other traffic passes by untouched.
    pub fn handle_packet(&self, packet: &Packet) {
        match packet.kind {
            MsgKind::NewLoginKey => self.handle_new_login_key(packet),
            MsgKind::WebApiNonceResponse => {
                self.handle_nonce_response(packet)
            }
            _ => {}
        }
    }

    // -- attempt sequence ----------------------------------------------------

    /// CAS into `Attempting` from any state that permits a new sequence.
    ///
    /// `Idle` is included because the precondition (non-empty nonce) was
    /// already checked: a caller can observe the nonce before the delivery
    /// handler finishes its own `Idle → Ready` transition.
    fn claim_attempt_slot(&self) -> Result<(), WebAuthError> {
        for from in
            [AuthState::Ready, AuthState::Authenticated, AuthState::Idle]
        {
            if self
                .inner
                .state
                .compare_exchange(
                    from as u8,
                    AuthState::Attempting as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_ok()
            {
                return Ok(());
            }
        }
        Err(WebAuthError::AttemptInProgress)
    }

    async fn run_attempts(self) {
        let mut last_error = None;

        for attempt in 1..=LOGON_ATTEMPTS {
            match self.attempt_once().await {
                Ok(AttemptEnd::Authenticated)
                | Ok(AttemptEnd::AwaitingFreshNonce) => return,
                Err(error) => {
                    tracing::warn!(attempt, %error, "log-on attempt failed");
                    last_error = Some(error);
                }
            }
        }

        // Exhausted. The nonce is still cached, so a later log_on is legal.
        self.inner
            .state
            .store(AuthState::Ready as u8, Ordering::SeqCst);
        let error = last_error.expect("attempt loop ran at least once");
        tracing::warn!(
            %error,
            "log-on gave up after {} attempts",
            LOGON_ATTEMPTS
        );
        self.inner.conn.emit(WebEvent::LogOnFailed(error));
    }

    /// One full seal-and-redeem pipeline.
    async fn attempt_once(&self) -> Result<AttemptEnd, WebAuthError> {
        let login_key = self.fields().login_key.clone();
        if login_key.is_empty() {
            // Unreachable through log_on; kept because the sequence must
            // never hit the crypto layer with an empty plaintext.
            return Err(WebAuthError::NotInitialized);
        }

        let public_key = self.inner.keys.require(self.inner.universe)?;
        let sealed = seal_nonce(public_key, &login_key)?;

        match self
            .inner
            .exchange
            .redeem(self.inner.conn.steam_id(), &sealed)
            .await?
        {
            ExchangeOutcome::Authenticated {
                token,
                token_secure,
            } => {
                {
                    let mut fields = self.fields();
                    fields.login_token = token;
                    fields.login_token_secure = token_secure;
                }
                self.inner
                    .state
                    .store(AuthState::Authenticated as u8, Ordering::SeqCst);
                tracing::info!("web session authenticated");
                self.inner.conn.emit(WebEvent::LoggedOn);
                Ok(AttemptEnd::Authenticated)
            }
            ExchangeOutcome::StaleNonce => {
                // Arm recovery before sending the request, so even an
                // instant response finds the pending state already set.
                self.inner.state.store(
                    AuthState::StaleNoncePending as u8,
                    Ordering::SeqCst,
                );
                let request = Packet::encode(
                    MsgKind::RequestWebApiNonce,
                    &RequestWebApiNonce {},
                    &self.inner.codec,
                )?;
                self.inner.conn.write(request);
                tracing::debug!("login nonce stale, requested a fresh one");
                Ok(AttemptEnd::AwaitingFreshNonce)
            }
        }
    }

    // -- inbound message handlers ----------------------------------------------

    fn handle_new_login_key(&self, packet: &Packet) {
        let msg: NewLoginKey = match packet.decode(&self.inner.codec) {
            Ok(msg) => msg,
            Err(error) => {
                tracing::warn!(%error, "dropping malformed NewLoginKey");
                return;
            }
        };

        // The ack is mandatory and unconditional.
        match Packet::encode(
            MsgKind::NewLoginKeyAccepted,
            &NewLoginKeyAccepted {
                unique_id: msg.unique_id,
            },
            &self.inner.codec,
        ) {
            Ok(ack) => self.inner.conn.write(ack),
            Err(error) => {
                tracing::error!(%error, "failed to encode login key ack")
            }
        }

        // number -> decimal string -> bytes -> base64
        self.fields().session_id = BASE64.encode(msg.unique_id.to_string());

        tracing::debug!(unique_id = msg.unique_id, "web session id ready");
        self.inner.conn.emit(WebEvent::SessionIdReady);
    }

    fn handle_nonce_response(&self, packet: &Packet) {
        let msg: WebApiNonceResponse = match packet.decode(&self.inner.codec)
        {
            Ok(msg) => msg,
            Err(error) => {
                tracing::warn!(
                    %error,
                    "dropping malformed WebApiNonceResponse"
                );
                return;
            }
        };

        // The delivered nonce always replaces the cached one, whether or
        // not anyone was waiting for it.
        self.fields().login_key = msg.nonce;

        // First delivery unlocks log_on.
        let _ = self.inner.state.compare_exchange(
            AuthState::Idle as u8,
            AuthState::Ready as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        // Atomic test-and-clear of the pending recovery: only the delivery
        // that actually clears it retries, exactly once. A delivery nobody
        // was waiting for just updated the cache above.
        if self
            .inner
            .state
            .compare_exchange(
                AuthState::StaleNoncePending as u8,
                AuthState::Ready as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
        {
            tracing::debug!("fresh nonce received, retrying log-on");
            if let Err(error) = self.log_on() {
                // Reported, not re-armed: the next trigger is external.
                tracing::error!(%error, "automatic re-logon failed");
            }
        }
    }

    /// The fields guard is never held across an `await`; poisoning would
    /// mean a panic mid-update, which is fatal to the session anyway.
    fn fields(&self) -> MutexGuard<'_, SessionFields> {
        self.inner
            .fields
            .lock()
            .expect("session fields lock poisoned")
    }
}
