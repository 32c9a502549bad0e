//! Point-to-point message passing for a fixed group of ranks.
//!
//! `torus-comm` provides the [`Transport`] trait used by every participant of
//! a distributed computation, and two implementations of it:
//!
//! - [`LocalTransport`]: all ranks are tasks in one process, wired together
//!   with tokio channels. Deterministic enough to drive tests.
//! - [`TcpTransport`]: each rank listens on its own socket address and
//!   connects to peers on demand.
//!
//! Both deliver messages reliably and in order per (sender, receiver, tag),
//! and both support selective receive by source and tag as well as
//! any-source receive by tag.
//!
//! # Example
//!
//! ```no_run
//! use torus_comm::{LocalTransport, Transport};
//! use torus_comm::torus::{Body, ShiftElements, Tag};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut group = LocalTransport::group(2);
//!     let body = Body::ShiftElements(ShiftElements { element_a: 1, element_b: 2 });
//!
//!     group[0].send(1, Tag::Shift, body).await?;
//!     let received = group[1].receive(0, Tag::Shift).await?;
//!     assert_eq!(received, body);
//!     Ok(())
//! }
//! ```

mod error;
mod local;
mod mailbox;
mod tcp;
mod transport;

pub use error::Error;
pub use local::LocalTransport;
pub use tcp::TcpTransport;
pub use torus_types::torus;
pub use transport::Transport;

/// Identifier of a participant within its group.
pub type Rank = u32;
