//! The seam to the underlying protocol connection.
//!
//! steamweb does not own the binary-protocol connection — connecting,
//! framing, and reconnect policy all live elsewhere. The session layer only
//! needs three capabilities from it, so those three are a trait. That keeps
//! the real connection out of this crate and lets tests substitute a
//! recording mock.

use steamweb_protocol::{Packet, SteamId};

use crate::WebEvent;

/// What the session layer requires from the owning connection.
///
/// `Send + Sync + 'static` because the session holds the connection in an
/// `Arc` and touches it from spawned attempt tasks on any runtime thread.
///
/// Both `write` and `emit` are fire-and-forget: delivery problems are the
/// connection's concern, not the handshake's.
pub trait Connection: Send + Sync + 'static {
    /// Queues an outbound protocol message.
    fn write(&self, packet: Packet);

    /// Publishes an event to whoever observes this connection.
    fn emit(&self, event: WebEvent);

    /// The identity this connection is logged on as.
    fn steam_id(&self) -> SteamId;
}
