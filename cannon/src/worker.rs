//! The per-cell participant of the systolic phase.

use torus_comm::torus::{Body, PartialResult, ShiftElements, Tag};
use torus_comm::{Rank, Transport};

use crate::Error;
use crate::grid::Position;
use crate::topology::{COORDINATOR, NeighborSet, ProcessorGrid};

/// A worker moves through
/// `AwaitInitial -> (Compute -> Shift)* -> Compute -> Report -> Done`.
#[derive(Clone, Debug)]
pub struct Worker {
    rank: Rank,
    rounds: usize,
    position: Position,
    neighbors: NeighborSet,
}

impl Worker {
    /// Locates `rank` on the grid and derives its ring neighbours.
    pub fn new(grid: &ProcessorGrid, rank: Rank) -> Result<Self, Error> {
        let position = grid.find_position(rank)?;
        Ok(Self {
            rank,
            rounds: grid.size(),
            position,
            neighbors: grid.neighbors(position),
        })
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn neighbors(&self) -> NeighborSet {
        self.neighbors
    }

    /// Runs all N rounds and reports the accumulated total to the coordinator.
    pub async fn run<T: Transport>(&self, transport: &mut T) -> Result<i64, Error> {
        let (mut element_a, mut element_b) = self.await_initial(transport).await?;
        let mut total = 0i64;

        for round in 0..self.rounds {
            total = total.wrapping_add(element_a.wrapping_mul(element_b));
            tracing::debug!(rank = self.rank, round, element_a, element_b, total, "compute");

            // rotating after the last round would leave messages nobody receives
            if round + 1 == self.rounds {
                break;
            }
            (element_a, element_b) = self.shift(transport, element_a, element_b).await?;
        }

        let report = Body::PartialResult(PartialResult {
            total,
            origin_id: self.rank,
        });
        transport.send(COORDINATOR, Tag::Result, report).await?;
        tracing::debug!(rank = self.rank, total, "reported");
        Ok(total)
    }

    async fn await_initial<T: Transport>(&self, transport: &mut T) -> Result<(i64, i64), Error> {
        match transport.receive(COORDINATOR, Tag::InitialElements).await? {
            Body::InitialElements(initial) => Ok((initial.element_a, initial.element_b)),
            other => Err(Error::UnexpectedMessage {
                origin: COORDINATOR,
                expected: "InitialElements",
                got: other.kind(),
            }),
        }
    }

    /// Passes the current pair left and up, then takes A from the right and
    /// B from below. The left neighbour keeps `element_a` of what it gets,
    /// the upper one `element_b`.
    async fn shift<T: Transport>(
        &self,
        transport: &mut T,
        element_a: i64,
        element_b: i64,
    ) -> Result<(i64, i64), Error> {
        let NeighborSet {
            left,
            right,
            above,
            below,
        } = self.neighbors;
        let outgoing = Body::ShiftElements(ShiftElements {
            element_a,
            element_b,
        });

        transport.send(left, Tag::Shift, outgoing).await?;
        transport.send(above, Tag::Shift, outgoing).await?;

        let from_right = receive_shift(transport, right).await?;
        let from_below = receive_shift(transport, below).await?;
        Ok((from_right.element_a, from_below.element_b))
    }
}

async fn receive_shift<T: Transport>(transport: &mut T, source: Rank) -> Result<ShiftElements, Error> {
    match transport.receive(source, Tag::Shift).await? {
        Body::ShiftElements(shift) => Ok(shift),
        other => Err(Error::UnexpectedMessage {
            origin: source,
            expected: "ShiftElements",
            got: other.kind(),
        }),
    }
}
