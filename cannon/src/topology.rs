//! Virtual torus: the rank layout of the grid and wraparound movement on it.

use std::collections::HashMap;

use torus_comm::Rank;

use crate::Error;
use crate::grid::{Grid, Position};

/// Rank reserved for the coordinator. It never appears on the grid.
pub const COORDINATOR: Rank = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Above,
    Below,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Above,
        Direction::Below,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Above => Direction::Below,
            Direction::Below => Direction::Above,
        }
    }
}

/// Moves `pos` by `delta` cells in `direction`, wrapping around the torus.
///
/// Left and above move towards smaller coordinates. Any `delta` is accepted,
/// including ones larger than the grid.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn neighbor_of(pos: Position, size: usize, direction: Direction, delta: usize) -> Position {
    let step = delta % size;
    let back = |c: usize| (c % size + size - step) % size;
    let forward = |c: usize| (c % size + step) % size;

    match direction {
        Direction::Left => Position::new(back(pos.x), pos.y),
        Direction::Right => Position::new(forward(pos.x), pos.y),
        Direction::Above => Position::new(pos.x, back(pos.y)),
        Direction::Below => Position::new(pos.x, forward(pos.y)),
    }
}

/// The four ranks one step away from a worker, with wraparound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NeighborSet {
    pub left: Rank,
    pub right: Rank,
    pub above: Rank,
    pub below: Rank,
}

/// Bijective mapping between grid positions and worker ranks.
///
/// Ranks are assigned row-major starting at 1, so `COORDINATOR` is never
/// on the grid. Built once per run and immutable afterwards.
#[derive(Clone, Debug)]
pub struct ProcessorGrid {
    ranks: Grid<Rank>,
    positions: HashMap<Rank, Position>,
}

impl ProcessorGrid {
    /// Fails when the N² worker ranks do not fit in a [`Rank`] after the
    /// coordinator's.
    pub fn build(size: usize) -> Result<Self, Error> {
        size.checked_mul(size)
            .and_then(|cells| Rank::try_from(cells).ok())
            .filter(|&cells| cells < Rank::MAX)
            .ok_or_else(|| Error::Configuration(format!("grid size {size} is too large")))?;

        let ranks = Grid::from_fn(size, |pos| (pos.y * size + pos.x) as Rank + 1);
        let positions = ranks.iter().map(|(pos, &rank)| (rank, pos)).collect();
        Ok(Self { ranks, positions })
    }

    pub fn size(&self) -> usize {
        self.ranks.size()
    }

    /// Number of workers, N².
    pub fn workers(&self) -> usize {
        self.positions.len()
    }

    /// Rank of the worker at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is off the grid.
    pub fn rank_at(&self, pos: Position) -> Rank {
        self.ranks[pos]
    }

    /// Inverse lookup of [`rank_at`](Self::rank_at).
    pub fn find_position(&self, rank: Rank) -> Result<Position, Error> {
        self.positions
            .get(&rank)
            .copied()
            .ok_or(Error::Topology(rank))
    }

    /// Rank reached by moving `delta` cells from `pos` in `direction`.
    pub fn rank_towards(&self, pos: Position, direction: Direction, delta: usize) -> Rank {
        self.rank_at(neighbor_of(pos, self.size(), direction, delta))
    }

    pub fn neighbors(&self, pos: Position) -> NeighborSet {
        NeighborSet {
            left: self.rank_towards(pos, Direction::Left, 1),
            right: self.rank_towards(pos, Direction::Right, 1),
            above: self.rank_towards(pos, Direction::Above, 1),
            below: self.rank_towards(pos, Direction::Below, 1),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, Rank)> + '_ {
        self.ranks.iter().map(|(pos, &rank)| (pos, rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::positions;
    use std::collections::HashSet;

    #[test]
    fn ranks_are_row_major_from_one() {
        let grid = ProcessorGrid::build(3).unwrap();
        assert_eq!(grid.rank_at(Position::new(0, 0)), 1);
        assert_eq!(grid.rank_at(Position::new(2, 0)), 3);
        assert_eq!(grid.rank_at(Position::new(0, 1)), 4);
        assert_eq!(grid.rank_at(Position::new(2, 2)), 9);
    }

    #[test]
    fn grid_is_bijective() {
        for size in 1..=6 {
            let grid = ProcessorGrid::build(size).unwrap();
            let ranks: HashSet<Rank> = grid.iter().map(|(_, r)| r).collect();
            assert_eq!(ranks.len(), size * size);
            assert!(!ranks.contains(&COORDINATOR));

            for (pos, rank) in grid.iter() {
                assert_eq!(grid.find_position(rank).unwrap(), pos);
            }
        }
    }

    #[test]
    fn grid_too_large_for_ranks() {
        assert!(matches!(ProcessorGrid::build(65536), Err(Error::Configuration(_))));
        assert!(matches!(ProcessorGrid::build(usize::MAX), Err(Error::Configuration(_))));
    }

    #[test]
    fn unknown_rank_is_a_topology_error() {
        let grid = ProcessorGrid::build(3).unwrap();
        assert!(matches!(grid.find_position(COORDINATOR), Err(Error::Topology(0))));
        assert!(matches!(grid.find_position(10), Err(Error::Topology(10))));
    }

    #[test]
    fn single_steps_wrap() {
        let corner = Position::new(0, 0);
        assert_eq!(neighbor_of(corner, 3, Direction::Left, 1), Position::new(2, 0));
        assert_eq!(neighbor_of(corner, 3, Direction::Above, 1), Position::new(0, 2));
        assert_eq!(neighbor_of(corner, 3, Direction::Right, 1), Position::new(1, 0));
        assert_eq!(neighbor_of(corner, 3, Direction::Below, 1), Position::new(0, 1));

        let far = Position::new(2, 2);
        assert_eq!(neighbor_of(far, 3, Direction::Right, 1), Position::new(0, 2));
        assert_eq!(neighbor_of(far, 3, Direction::Below, 1), Position::new(2, 0));
    }

    #[test]
    fn large_deltas_wrap() {
        let pos = Position::new(1, 2);
        assert_eq!(neighbor_of(pos, 3, Direction::Right, 5), Position::new(0, 2));
        assert_eq!(neighbor_of(pos, 3, Direction::Left, 7), Position::new(0, 2));
        assert_eq!(neighbor_of(pos, 3, Direction::Above, 3), pos);
        assert_eq!(neighbor_of(pos, 4, Direction::Below, 2), Position::new(1, 0));
    }

    #[test]
    fn opposite_moves_cancel() {
        for size in 1..=5 {
            for pos in positions(size) {
                for direction in Direction::ALL {
                    for delta in 0..2 * size + 1 {
                        let moved = neighbor_of(pos, size, direction, delta);
                        let back = neighbor_of(moved, size, direction.opposite(), delta);
                        assert_eq!(back, pos, "{pos:?} {direction:?} {delta} on {size}");
                    }
                }
            }
        }
    }

    #[test]
    fn single_worker_is_its_own_neighbour() {
        let grid = ProcessorGrid::build(1).unwrap();
        let set = grid.neighbors(Position::new(0, 0));
        assert_eq!(
            set,
            NeighborSet {
                left: 1,
                right: 1,
                above: 1,
                below: 1,
            }
        );
    }

    #[test]
    fn neighbours_in_the_middle() {
        let grid = ProcessorGrid::build(3).unwrap();
        let set = grid.neighbors(Position::new(1, 1));
        assert_eq!(
            set,
            NeighborSet {
                left: 4,
                right: 6,
                above: 2,
                below: 8,
            }
        );
    }
}
