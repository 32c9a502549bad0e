//! Role selection and whole-run drivers.

use std::sync::Arc;

use tokio::task::JoinSet;
use torus_comm::{LocalTransport, Rank, Transport};

use crate::Error;
use crate::config::RunConfig;
use crate::coordinator::Coordinator;
use crate::grid::Matrix;
use crate::source::{FixedOperands, MatrixSource};
use crate::topology::{COORDINATOR, ProcessorGrid};
use crate::worker::Worker;

/// What a participant does in this run, decided once from its rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Coordinator,
    Worker(Rank),
}

impl Role {
    pub fn for_rank(rank: Rank) -> Self {
        if rank == COORDINATOR {
            Role::Coordinator
        } else {
            Role::Worker(rank)
        }
    }
}

/// What a participant hands back when it is done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Product(Matrix),
    Partial(i64),
}

/// N² workers plus the coordinator, for grids whose ranks fit in a [`Rank`].
pub fn expected_participants(grid_size: usize) -> Result<usize, Error> {
    if grid_size == 0 {
        return Err(Error::Configuration("grid size must be at least 1".to_string()));
    }
    grid_size
        .checked_mul(grid_size)
        .filter(|&cells| cells < Rank::MAX as usize)
        .map(|cells| cells + 1)
        .ok_or_else(|| Error::Configuration(format!("grid size {grid_size} is too large")))
}

/// Rejects launches that cannot cover an N×N grid plus the coordinator.
pub fn check_participants(grid_size: usize, participants: usize) -> Result<(), Error> {
    let expected = expected_participants(grid_size)?;
    if participants != expected {
        return Err(Error::Configuration(format!(
            "a {grid_size}x{grid_size} grid needs {expected} participants, got {participants}"
        )));
    }
    Ok(())
}

/// Runs one participant to completion.
///
/// The participant count is checked before anything is sent or received.
/// `source` is only consulted by the coordinator.
pub async fn run_participant<T, S>(
    config: &RunConfig,
    transport: &mut T,
    source: &S,
) -> Result<Outcome, Error>
where
    T: Transport,
    S: MatrixSource + ?Sized,
{
    check_participants(config.grid_size, transport.size())?;

    match Role::for_rank(transport.rank()) {
        Role::Coordinator => {
            let (a, b) = source.operands(config.grid_size)?;
            let coordinator = Coordinator::new(config)?;
            let product = coordinator.multiply(transport, &a, &b).await?;
            Ok(Outcome::Product(product))
        }
        Role::Worker(rank) => {
            let grid = ProcessorGrid::build(config.grid_size)?;
            let worker = Worker::new(&grid, rank)?;
            tracing::debug!(rank, x = worker.position().x, y = worker.position().y, "worker placed");
            let total = worker.run(transport).await?;
            Ok(Outcome::Partial(total))
        }
    }
}

/// Runs every participant as a task of the current runtime over an
/// in-process transport and returns the product.
///
/// The first participant to fail aborts all the others.
pub async fn simulate(config: &RunConfig, a: &Matrix, b: &Matrix) -> Result<Matrix, Error> {
    let source = Arc::new(FixedOperands::new(a.clone(), b.clone()));
    let mut tasks = JoinSet::new();

    for mut transport in LocalTransport::group(config.participants()?) {
        let config = config.clone();
        let source = Arc::clone(&source);
        tasks.spawn(async move { run_participant(&config, &mut transport, &*source).await });
    }

    let mut product = None;
    while let Some(joined) = tasks.join_next().await {
        if let Outcome::Product(matrix) = joined?? {
            product = Some(matrix);
        }
    }
    product.ok_or_else(|| Error::Configuration("no coordinator took part".to_string()))
}
