//! Events published to the connection layer.

use crate::WebAuthError;

/// Fire-and-forget notifications emitted through
/// [`Connection::emit`](crate::Connection::emit).
///
/// These are the only way to observe the outcome of an asynchronous log-on
/// sequence — `log_on` returns before any network I/O happens.
#[derive(Debug)]
pub enum WebEvent {
    /// The web session id was derived from a freshly delivered login key.
    /// Independent of authentication: it can arrive before or after the
    /// first successful exchange.
    SessionIdReady,

    /// A credential exchange succeeded; both session cookies are set.
    LoggedOn,

    /// An entire attempt sequence failed. Carries the error of the final
    /// attempt. Emitted at most once per `log_on` call.
    LogOnFailed(WebAuthError),
}
