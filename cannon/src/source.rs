//! Where operands come from, and a sequential reference product.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Error;
use crate::grid::{Grid, Matrix};

/// Supplies the two N×N operands to the coordinator.
pub trait MatrixSource: Send + Sync {
    fn operands(&self, size: usize) -> Result<(Matrix, Matrix), Error>;
}

/// Operands handed in by the caller.
#[derive(Clone, Debug)]
pub struct FixedOperands {
    a: Matrix,
    b: Matrix,
}

impl FixedOperands {
    pub fn new(a: Matrix, b: Matrix) -> Self {
        Self { a, b }
    }
}

impl MatrixSource for FixedOperands {
    fn operands(&self, size: usize) -> Result<(Matrix, Matrix), Error> {
        for m in [&self.a, &self.b] {
            if m.size() != size {
                return Err(Error::DimensionMismatch {
                    expected: size,
                    rows: m.size(),
                    cols: m.size(),
                });
            }
        }
        Ok((self.a.clone(), self.b.clone()))
    }
}

/// Reproducible pseudo-random operands.
#[derive(Clone, Debug)]
pub struct RandomOperands {
    seed: u64,
    range: RangeInclusive<i64>,
}

impl RandomOperands {
    pub fn new(seed: u64) -> Self {
        Self { seed, range: -9..=9 }
    }

    pub fn with_range(mut self, range: RangeInclusive<i64>) -> Self {
        self.range = range;
        self
    }
}

impl MatrixSource for RandomOperands {
    fn operands(&self, size: usize) -> Result<(Matrix, Matrix), Error> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let a = Grid::from_fn(size, |_| rng.gen_range(self.range.clone()));
        let b = Grid::from_fn(size, |_| rng.gen_range(self.range.clone()));
        Ok((a, b))
    }
}

const DEMO_A: [[i64; 3]; 3] = [[3, 5, 2], [7, 3, 6], [1, 4, 5]];
const DEMO_B: [[i64; 3]; 3] = [[2, 3, 7], [4, 9, 3], [7, 3, 4]];

/// The 3x3 pair used for demonstrations and smoke tests.
pub fn demo_operands() -> FixedOperands {
    FixedOperands::new(
        Grid::from_fn(3, |p| DEMO_A[p.y][p.x]),
        Grid::from_fn(3, |p| DEMO_B[p.y][p.x]),
    )
}

/// Textbook triple loop. Overflow wraps, matching the workers' accumulation.
///
/// # Panics
///
/// Panics if the operands differ in size.
pub fn naive_multiply(a: &Matrix, b: &Matrix) -> Matrix {
    assert_eq!(a.size(), b.size(), "operands must have the same size");
    let size = a.size();
    let (a_rows, b_rows): (Vec<&[i64]>, Vec<&[i64]>) = (a.rows().collect(), b.rows().collect());

    Grid::from_fn(size, |p| {
        (0..size).fold(0i64, |acc, k| {
            acc.wrapping_add(a_rows[p.y][k].wrapping_mul(b_rows[k][p.x]))
        })
    })
}
