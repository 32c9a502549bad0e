//! The orchestrating participant: scatters the skewed operands and assembles
//! the product. It never takes part in the systolic rotation.

use torus_comm::Transport;
use torus_comm::torus::{Body, InitialElements, PartialResult, Tag};

use crate::Error;
use crate::alignment::{self, SkewAssignment};
use crate::config::RunConfig;
use crate::grid::{Grid, Matrix};
use crate::topology::ProcessorGrid;

pub struct Coordinator {
    grid: ProcessorGrid,
    skew: SkewAssignment,
}

impl Coordinator {
    pub fn new(config: &RunConfig) -> Result<Self, Error> {
        Ok(Self {
            grid: ProcessorGrid::build(config.grid_size)?,
            skew: alignment::plan(config.grid_size),
        })
    }

    /// Distributes the operands and collects the product.
    pub async fn multiply<T: Transport>(
        &self,
        transport: &mut T,
        a: &Matrix,
        b: &Matrix,
    ) -> Result<Matrix, Error> {
        self.distribute(transport, a, b).await?;
        self.gather(transport).await
    }

    /// Sends every worker the A and B elements it starts round zero with.
    ///
    /// One message per worker, no acknowledgement.
    pub async fn distribute<T: Transport>(
        &self,
        transport: &mut T,
        a: &Matrix,
        b: &Matrix,
    ) -> Result<(), Error> {
        let size = self.grid.size();
        for m in [a, b] {
            if m.size() != size {
                return Err(Error::DimensionMismatch {
                    expected: size,
                    rows: m.size(),
                    cols: m.size(),
                });
            }
        }

        for (dest, src) in self.skew.iter() {
            let rank = self.grid.rank_at(dest);
            let body = Body::InitialElements(InitialElements {
                element_a: a[src.a],
                element_b: b[src.b],
            });
            transport.send(rank, Tag::InitialElements, body).await?;
        }
        tracing::info!(workers = self.grid.workers(), "initial elements distributed");
        Ok(())
    }

    /// Receives exactly N² results, from whichever worker finishes first, and
    /// places each into the cell of the worker that sent it.
    pub async fn gather<T: Transport>(&self, transport: &mut T) -> Result<Matrix, Error> {
        let size = self.grid.size();
        let mut product: Matrix = Grid::from_fn(size, |_| 0);
        let mut written = Grid::from_fn(size, |_| false);

        for received in 1..=self.grid.workers() {
            let (body, sender) = transport.receive_any(Tag::Result).await?;
            let PartialResult { total, origin_id } = match body {
                Body::PartialResult(result) => result,
                other => {
                    return Err(Error::UnexpectedMessage {
                        origin: sender,
                        expected: "PartialResult",
                        got: other.kind(),
                    });
                }
            };
            if origin_id != sender {
                return Err(Error::OriginMismatch {
                    claimed: origin_id,
                    sender,
                });
            }

            let pos = self.grid.find_position(origin_id)?;
            if std::mem::replace(&mut written[pos], true) {
                return Err(Error::DuplicateResult(origin_id));
            }
            product[pos] = total;
            tracing::debug!(origin_id, x = pos.x, y = pos.y, total, received, "result");
        }

        tracing::info!("product assembled");
        Ok(product)
    }
}
