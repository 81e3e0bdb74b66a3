//! Event-feed collaborator interface.
//!
//! The gateway protocol itself (handshake, heartbeat, reconnect) lives
//! outside this crate. [`crate::Client`] only consumes this interface and
//! re-emits its events; the payload vocabulary it shares with feed
//! implementations is in [`crate::types`].

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::{GatewayPayload, Message, User};

/// Events emitted by an event feed.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Session established; carries the bot user.
    Ready(User),
    /// A message was created.
    Message(Message),
}

/// A persistent event-feed connection.
#[async_trait]
pub trait EventFeed: Send {
    /// Open the feed with the given credential and start emitting events.
    ///
    /// # Errors
    /// Returns `Error::Feed` if the connection cannot be established.
    async fn connect(&mut self, token: &str) -> Result<mpsc::Receiver<FeedEvent>>;

    /// Close the feed.
    ///
    /// # Errors
    /// Returns `Error::Feed` if the feed fails to shut down cleanly.
    async fn disconnect(&mut self) -> Result<()>;

    /// Send a payload over the feed.
    ///
    /// # Errors
    /// Returns `Error::Feed` if the feed is not connected or the send fails.
    async fn send(&mut self, payload: GatewayPayload) -> Result<()>;
}
