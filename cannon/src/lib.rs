//! Distributed matrix multiplication with Cannon's algorithm.
//!
//! `cannon` multiplies two N×N integer matrices on a torus of N² workers,
//! one matrix cell per worker, plus a coordinator. The coordinator scatters
//! pre-skewed operand elements, the workers multiply, accumulate and rotate
//! their elements N-1 times through their ring neighbours, and the
//! coordinator gathers the N² dot products into the result.
//!
//! # Ranks and positions
//!
//! - **Coordinator**: rank 0, never on the grid.
//! - **Workers**: ranks 1..=N², assigned row-major; the worker at column `x`,
//!   row `y` has rank `y * N + x + 1` and computes `C[y][x]`.
//! - **Rotation**: A moves left and B moves up each round, so workers read
//!   from their right and lower neighbours.
//!
//! All communication goes through a [`torus_comm::Transport`], so the same
//! coordinator and worker code runs in-process ([`simulate`]) or across
//! processes over TCP ([`run_participant`] with a `TcpTransport`).
//!
//! # Example
//!
//! ```no_run
//! use cannon::{RunConfig, demo_operands, MatrixSource, simulate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (a, b) = demo_operands().operands(3)?;
//!     let product = simulate(&RunConfig::new(3), &a, &b).await?;
//!
//!     let rows: Vec<&[i64]> = product.rows().collect();
//!     assert_eq!(rows[0], &[40, 60, 44]);
//!     Ok(())
//! }
//! ```

pub mod alignment;
pub mod config;
pub mod coordinator;
mod error;
pub mod grid;
pub mod launch;
pub mod source;
pub mod topology;
pub mod worker;

pub use config::{ClusterConfig, RunConfig};
pub use coordinator::Coordinator;
pub use error::Error;
pub use grid::{Grid, Matrix, Position};
pub use launch::{
    Outcome, Role, check_participants, expected_participants, run_participant, simulate,
};
pub use source::{FixedOperands, MatrixSource, RandomOperands, demo_operands, naive_multiply};
pub use topology::{COORDINATOR, Direction, NeighborSet, ProcessorGrid, neighbor_of};
pub use worker::Worker;
