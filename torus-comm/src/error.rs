//! Error types for torus-comm operations.

use thiserror::Error;

use crate::Rank;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed frame: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("rank {0} is not part of this group")]
    UnknownPeer(Rank),

    #[error("message from rank {origin} carries unknown tag {tag}")]
    InvalidTag { origin: Rank, tag: i32 },

    #[error("message from rank {0} has no body")]
    MissingBody(Rank),

    #[error("bad handshake: magic {0:#x}")]
    Handshake(u64),

    #[error("could not reach rank {rank} after {attempts} attempts: {source}")]
    ConnectFailed {
        rank: Rank,
        attempts: usize,
        source: std::io::Error,
    },

    #[error("frame of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),

    #[error("connection closed")]
    ConnectionClosed,
}
