//! Error types for cannon operations.

use thiserror::Error;
use torus_comm::Rank;

#[derive(Debug, Error)]
pub enum Error {
    #[error("rank {0} has no position on the processor grid")]
    Topology(Rank),

    #[error("invalid launch: {0}")]
    Configuration(String),

    #[error("communication failure: {0}")]
    Communication(#[from] torus_comm::Error),

    #[error("expected {expected} from rank {origin}, got {got}")]
    UnexpectedMessage {
        origin: Rank,
        expected: &'static str,
        got: &'static str,
    },

    #[error("result claims origin {claimed} but was sent by rank {sender}")]
    OriginMismatch { claimed: Rank, sender: Rank },

    #[error("second result for the cell of rank {0}")]
    DuplicateResult(Rank),

    #[error("matrix is not {expected}x{expected}: found {rows} rows with a row of {cols} columns")]
    DimensionMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("cannot read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("participant task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
