//! The message-passing seam shared by every participant.

use async_trait::async_trait;
use torus_types::torus::{Body, Tag};

use crate::{Error, Rank};

/// Reliable point-to-point messaging between the ranks of a fixed group.
///
/// Delivery is FIFO per (sender, receiver, tag). `receive_any` makes no
/// ordering promise across different senders. Every operation blocks the
/// calling task until it can complete; there are no timeouts.
#[async_trait]
pub trait Transport: Send {
    /// Identifier of the participant owning this endpoint.
    fn rank(&self) -> Rank;

    /// Number of participants in the group, this one included.
    fn size(&self) -> usize;

    /// Hands `body` to the substrate for delivery to `dest`.
    async fn send(&mut self, dest: Rank, tag: Tag, body: Body) -> Result<(), Error>;

    /// Waits for the next message from `source` carrying `tag`.
    async fn receive(&mut self, source: Rank, tag: Tag) -> Result<Body, Error>;

    /// Waits for the next message carrying `tag` from any sender.
    async fn receive_any(&mut self, tag: Tag) -> Result<(Body, Rank), Error>;
}
