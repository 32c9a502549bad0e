//! In-process transport: every participant is a task in the same runtime.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use torus_types::torus::{Body, Envelope, Tag};

use crate::mailbox::{InboxSender, Mailbox};
use crate::{Error, Rank, Transport};

/// Channel-backed endpoint of a simulated group.
///
/// Endpoints are created together by [`LocalTransport::group`]; each one can
/// reach every other one, itself included.
pub struct LocalTransport {
    rank: Rank,
    peers: Arc<[InboxSender]>,
    mailbox: Mailbox,
}

impl LocalTransport {
    /// Creates `size` connected endpoints, indexed by rank.
    pub fn group(size: usize) -> Vec<LocalTransport> {
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..size).map(|_| mpsc::unbounded_channel()).unzip();
        let peers: Arc<[InboxSender]> = senders.into();

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalTransport {
                rank: rank as Rank,
                peers: Arc::clone(&peers),
                mailbox: Mailbox::new(inbox),
            })
            .collect()
    }

    /// Number of delivered messages no receive has consumed yet.
    pub fn pending(&mut self) -> usize {
        self.mailbox.pending()
    }
}

#[async_trait]
impl Transport for LocalTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    async fn send(&mut self, dest: Rank, tag: Tag, body: Body) -> Result<(), Error> {
        let peer = self
            .peers
            .get(dest as usize)
            .ok_or(Error::UnknownPeer(dest))?;
        let envelope = Envelope {
            origin: self.rank,
            tag: tag as i32,
            body: Some(body),
        };
        peer.send(Ok(envelope)).map_err(|_| Error::ConnectionClosed)
    }

    async fn receive(&mut self, source: Rank, tag: Tag) -> Result<Body, Error> {
        if source as usize >= self.peers.len() {
            return Err(Error::UnknownPeer(source));
        }
        self.mailbox.take_from(source, tag).await
    }

    async fn receive_any(&mut self, tag: Tag) -> Result<(Body, Rank), Error> {
        self.mailbox.take_any(tag).await
    }
}
