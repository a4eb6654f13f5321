//! The seam between the workspace mirror and the transport that talks to
//! the compositor.
//!
//! [`WorkspaceClient`](crate::client::WorkspaceClient) only depends on
//! [`EventChannel`]; the Wayland socket implementation lives in
//! [`wayland`](crate::wayland) and tests use scripted in-memory channels.

use crate::event::ProtocolEvent;

/// A bidirectional connection to the compositor that delivers decoded
/// events in wire order.
///
/// Both pump methods block.  Any error they return means the connection is
/// unusable; callers do not retry.
pub trait EventChannel {
    /// The error type produced by this channel.
    type Error: std::error::Error + Send + 'static;

    /// Dispatch everything queued and wait until the compositor confirms
    /// it has processed every request sent so far.  Returns the events
    /// dispatched during the round-trip, in order.
    fn roundtrip(&mut self) -> Result<Vec<ProtocolEvent>, Self::Error>;

    /// Block until at least one event is available and return every event
    /// read in that pass.
    fn dispatch(&mut self) -> Result<Vec<ProtocolEvent>, Self::Error>;

    /// Flush outstanding requests and release the connection.
    fn shutdown(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
