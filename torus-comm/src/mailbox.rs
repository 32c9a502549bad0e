//! Per-participant inbox with selective receive.

use std::collections::VecDeque;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use torus_types::torus::{Body, Envelope, Tag};

use crate::{Error, Rank};

pub(crate) type Inbound = Result<Envelope, Error>;
pub(crate) type InboxSender = UnboundedSender<Inbound>;

/// Buffers messages that arrived ahead of the receive that wants them.
///
/// The substrate delivers each sender's messages in order, and a message is
/// only ever taken from the front-most matching position, so order within a
/// (sender, receiver, tag) triple is preserved.
pub(crate) struct Mailbox {
    inbox: UnboundedReceiver<Inbound>,
    pending: VecDeque<Envelope>,
    fault: Option<Error>,
}

impl Mailbox {
    pub fn new(inbox: UnboundedReceiver<Inbound>) -> Self {
        Self {
            inbox,
            pending: VecDeque::new(),
            fault: None,
        }
    }

    /// Blocks until a message from `source` with `tag` is available.
    pub async fn take_from(&mut self, source: Rank, tag: Tag) -> Result<Body, Error> {
        let envelope = self
            .take_matching(|e| e.origin == source && e.tag == tag as i32)
            .await?;
        open(envelope).map(|(body, _)| body)
    }

    /// Blocks until any message with `tag` is available.
    pub async fn take_any(&mut self, tag: Tag) -> Result<(Body, Rank), Error> {
        let envelope = self.take_matching(|e| e.tag == tag as i32).await?;
        open(envelope)
    }

    /// Moves everything already delivered into the buffer and reports its size.
    pub fn pending(&mut self) -> usize {
        while self.fault.is_none() {
            match self.inbox.try_recv() {
                Ok(Ok(envelope)) => match check_tag(&envelope) {
                    Ok(()) => self.pending.push_back(envelope),
                    Err(e) => self.fault = Some(e),
                },
                Ok(Err(e)) => self.fault = Some(e),
                Err(_) => break,
            }
        }
        self.pending.len()
    }

    async fn take_matching<F>(&mut self, matches: F) -> Result<Envelope, Error>
    where
        F: Fn(&Envelope) -> bool,
    {
        if let Some(idx) = self.pending.iter().position(&matches) {
            if let Some(envelope) = self.pending.remove(idx) {
                return Ok(envelope);
            }
        }
        if let Some(e) = self.fault.take() {
            return Err(e);
        }

        loop {
            let envelope = self.inbox.recv().await.ok_or(Error::ConnectionClosed)??;
            check_tag(&envelope)?;
            if matches(&envelope) {
                return Ok(envelope);
            }
            self.pending.push_back(envelope);
        }
    }
}

fn check_tag(envelope: &Envelope) -> Result<(), Error> {
    Tag::try_from(envelope.tag)
        .map(|_| ())
        .map_err(|_| Error::InvalidTag {
            origin: envelope.origin,
            tag: envelope.tag,
        })
}

fn open(envelope: Envelope) -> Result<(Body, Rank), Error> {
    let origin = envelope.origin;
    let body = envelope.body.ok_or(Error::MissingBody(origin))?;
    Ok((body, origin))
}
