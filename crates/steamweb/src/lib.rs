//! # steamweb
//!
//! Client-side web-session authentication for a Steam-style binary-protocol
//! connection. The backend issues an opaque login nonce over the protocol
//! channel; this crate redeems it — freshly encrypted on every attempt —
//! against the HTTP authentication endpoint and turns it into the session
//! cookies the companion web service expects, re-running the exchange
//! automatically whenever the backend declares the nonce stale.
//!
//! ## How it fits in the stack
//!
//! ```text
//! Application          ← calls log_on(), consumes cookies + events
//!     ↕
//! Session layer (this crate)  ← WebSession state machine, HTTP exchange
//!     ↕
//! Connection (yours)   ← delivers Packets, accepts Packets, emits events
//! ```
//!
//! The connection is abstracted behind the [`Connection`] trait: the crate
//! never opens sockets of its own except for the HTTPS exchange.
//!
//! ## Flow
//!
//! 1. The connection feeds every inbound message to
//!    [`WebSession::handle_packet`]; the session reacts to exactly two
//!    kinds and ignores the rest.
//! 2. Once a nonce has arrived, [`WebSession::log_on`] seals it
//!    (steamweb-crypto) and redeems it over HTTPS, up to three attempts
//!    back to back.
//! 3. Success, stale-nonce recovery, and final failure are all reported
//!    through [`WebEvent`]s on the connection — `log_on` itself only fails
//!    synchronously on preconditions.

mod connection;
mod error;
mod events;
mod exchange;
mod web;

pub use connection::Connection;
pub use error::WebAuthError;
pub use events::WebEvent;
pub use exchange::AUTH_ENDPOINT;
pub use web::{AuthState, LOGON_ATTEMPTS, WebSession, WebSessionConfig};
