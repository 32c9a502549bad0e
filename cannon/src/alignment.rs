//! Initial skew of the operands.
//!
//! Workers consume from their right and lower neighbours and forward to their
//! left and upper ones. For the product cell at `(x, y)` to see matching
//! `A[y][k]` and `B[k][x]` in every round, round zero must start at
//! `k = x + y (mod N)`: row `y` of A is rotated by `y` and column `x` of B by
//! `x`, both towards the direction elements arrive from.

use crate::grid::{Grid, Position};
use crate::topology::{Direction, neighbor_of};

/// Where the two operand elements a destination starts with come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkewSource {
    pub a: Position,
    pub b: Position,
}

/// Per destination position, the source cells of its initial A and B elements.
pub type SkewAssignment = Grid<SkewSource>;

pub fn source_of(dest: Position, size: usize) -> SkewSource {
    SkewSource {
        a: neighbor_of(dest, size, Direction::Right, dest.y),
        b: neighbor_of(dest, size, Direction::Below, dest.x),
    }
}

pub fn plan(size: usize) -> SkewAssignment {
    Grid::from_fn(size, |dest| source_of(dest, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::positions;
    use std::collections::HashSet;

    #[test]
    fn rows_and_columns_are_rotated_by_their_index() {
        let skew = plan(3);

        assert_eq!(
            skew[Position::new(0, 0)],
            SkewSource {
                a: Position::new(0, 0),
                b: Position::new(0, 0),
            }
        );
        assert_eq!(
            skew[Position::new(1, 2)],
            SkewSource {
                a: Position::new(0, 2),
                b: Position::new(1, 0),
            }
        );
        assert_eq!(
            skew[Position::new(2, 1)],
            SkewSource {
                a: Position::new(0, 1),
                b: Position::new(2, 0),
            }
        );
    }

    #[test]
    fn every_element_is_placed_exactly_once() {
        for size in 1..=6 {
            let skew = plan(size);
            let a: HashSet<Position> = skew.iter().map(|(_, s)| s.a).collect();
            let b: HashSet<Position> = skew.iter().map(|(_, s)| s.b).collect();
            assert_eq!(a.len(), size * size);
            assert_eq!(b.len(), size * size);
        }
    }

    #[test]
    fn operands_stay_in_their_row_and_column() {
        let size = 5;
        for dest in positions(size) {
            let src = source_of(dest, size);
            assert_eq!(src.a.y, dest.y);
            assert_eq!(src.b.x, dest.x);
            // inner index of A and B agree from round zero on
            assert_eq!(src.a.x, src.b.y);
        }
    }
}
