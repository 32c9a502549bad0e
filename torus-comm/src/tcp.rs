//! TCP transport: one listener per rank, one outbound stream per peer.
//!
//! Streams are opened lazily on first send. The connecting side writes a
//! handshake (magic followed by its own rank) and then length-prefixed
//! prost frames. A reader task per accepted stream forwards decoded frames
//! into the owner's mailbox, so ordering per sender follows TCP ordering.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use prost::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use torus_types::torus::{Body, Envelope, Tag};

use crate::mailbox::{InboxSender, Mailbox};
use crate::{Error, Rank, Transport};

const MAGIC: u64 = 0x746f_7275_735f_636d;
const MAX_FRAME: usize = 1 << 16;
const DEFAULT_CONNECT_ATTEMPTS: usize = 10;
const INITIAL_BACKOFF: Duration = Duration::from_millis(50);

/// Endpoint of a group whose ranks live in separate processes or hosts.
///
/// `peers[r]` is the listening address of rank `r`.
pub struct TcpTransport {
    rank: Rank,
    peers: Vec<SocketAddr>,
    links: HashMap<Rank, TcpStream>,
    connect_attempts: usize,
    mailbox: Mailbox,
    local_addr: SocketAddr,
    acceptor: JoinHandle<()>,
}

impl TcpTransport {
    /// Listens on `peers[rank]` and starts accepting peer streams.
    pub async fn bind(rank: Rank, peers: Vec<SocketAddr>) -> Result<Self, Error> {
        let addr = *peers.get(rank as usize).ok_or(Error::UnknownPeer(rank))?;
        let listener = TcpListener::bind(addr).await?;
        Self::with_listener(rank, peers, listener)
    }

    /// Uses an already bound listener, e.g. one bound to port 0.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_listener(
        rank: Rank,
        peers: Vec<SocketAddr>,
        listener: TcpListener,
    ) -> Result<Self, Error> {
        if rank as usize >= peers.len() {
            return Err(Error::UnknownPeer(rank));
        }
        let local_addr = listener.local_addr()?;
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let acceptor = tokio::spawn(accept_loop(listener, peers.len(), inbox_tx));
        tracing::debug!(rank, %local_addr, "listening");

        Ok(Self {
            rank,
            peers,
            links: HashMap::new(),
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            mailbox: Mailbox::new(inbox_rx),
            local_addr,
            acceptor,
        })
    }

    /// How often to try reaching a peer before a send fails. At least one.
    pub fn with_connect_attempts(mut self, attempts: usize) -> Self {
        self.connect_attempts = attempts.max(1);
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of delivered messages no receive has consumed yet.
    pub fn pending(&mut self) -> usize {
        self.mailbox.pending()
    }

    async fn link(&mut self, dest: Rank) -> Result<&mut TcpStream, Error> {
        if !self.links.contains_key(&dest) {
            let addr = *self
                .peers
                .get(dest as usize)
                .ok_or(Error::UnknownPeer(dest))?;
            let stream = connect(self.rank, dest, addr, self.connect_attempts).await?;
            self.links.insert(dest, stream);
        }
        self.links.get_mut(&dest).ok_or(Error::UnknownPeer(dest))
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.acceptor.abort();
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    async fn send(&mut self, dest: Rank, tag: Tag, body: Body) -> Result<(), Error> {
        let envelope = Envelope {
            origin: self.rank,
            tag: tag as i32,
            body: Some(body),
        };
        let frame = envelope.encode_to_vec();

        let stream = self.link(dest).await?;
        let written = async {
            stream.write_u32(frame.len() as u32).await?;
            stream.write_all(&frame).await
        }
        .await;

        if let Err(e) = written {
            self.links.remove(&dest);
            return Err(e.into());
        }
        Ok(())
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

async fn connect(
    own: Rank,
    rank: Rank,
    addr: SocketAddr,
    max_attempts: usize,
) -> Result<TcpStream, Error> {
    let mut delay = INITIAL_BACKOFF;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match TcpStream::connect(addr).await {
            Ok(mut stream) => {
                stream.set_nodelay(true)?;
                stream.write_u64(MAGIC).await?;
                stream.write_u32(own).await?;
                tracing::debug!(rank, %addr, attempts, "connected");
                return Ok(stream);
            }
            Err(source) if attempts >= max_attempts => {
                return Err(Error::ConnectFailed {
                    rank,
                    attempts,
                    source,
                });
            }
            Err(e) => {
                tracing::debug!(rank, %addr, error = %e, "peer not reachable yet");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
}

async fn accept_loop(listener: TcpListener, group_size: usize, inbox: InboxSender) {
    let mut incoming = TcpListenerStream::new(listener);
    while let Some(conn) = incoming.next().await {
        match conn {
            Ok(stream) => {
                tokio::spawn(read_frames(stream, group_size, inbox.clone()));
            }
            Err(e) => tracing::warn!(error = %e, "accept failed"),
        }
    }
}

async fn read_frames(mut stream: TcpStream, group_size: usize, inbox: InboxSender) {
    let origin = match handshake(&mut stream, group_size).await {
        Ok(origin) => origin,
        Err(e) => {
            tracing::warn!(error = %e, "rejected incoming stream");
            return;
        }
    };

    loop {
        match read_frame(&mut stream).await {
            Ok(Some(mut envelope)) => {
                envelope.origin = origin;
                if inbox.send(Ok(envelope)).is_err() {
                    return;
                }
            }
            Ok(None) => {
                tracing::debug!(origin, "peer closed stream");
                return;
            }
            Err(e) => {
                tracing::error!(origin, error = %e, "stream failed");
                let _ = inbox.send(Err(e));
                return;
            }
        }
    }
}

async fn handshake(stream: &mut TcpStream, group_size: usize) -> Result<Rank, Error> {
    let magic = stream.read_u64().await?;
    if magic != MAGIC {
        return Err(Error::Handshake(magic));
    }
    let origin = stream.read_u32().await?;
    if origin as usize >= group_size {
        return Err(Error::UnknownPeer(origin));
    }
    Ok(origin)
}

async fn read_frame(stream: &mut TcpStream) -> Result<Option<Envelope>, Error> {
    let len = match stream.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if len > MAX_FRAME {
        return Err(Error::FrameTooLarge(len));
    }

    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    Ok(Some(Envelope::decode(buf.as_slice())?))
}
