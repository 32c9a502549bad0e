//! Square, row-major, bounds-checked storage shared by matrices and the
//! processor grid.

use std::ops::{Index, IndexMut};

use crate::Error;

/// One cell of an N×N grid: `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

/// Dense N×N operand or product.
pub type Matrix = Grid<i64>;

impl<T> Grid<T> {
    /// Builds a grid by evaluating `f` at every position in row-major order.
    pub fn from_fn(size: usize, mut f: impl FnMut(Position) -> T) -> Self {
        let cells = positions(size).map(&mut f).collect();
        Self { size, cells }
    }

    /// Builds a grid from nested rows, rejecting anything that is not square.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, Error> {
        let size = rows.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != size) {
            return Err(Error::DimensionMismatch {
                expected: size,
                rows: size,
                cols: bad.len(),
            });
        }
        let cells = rows.into_iter().flatten().collect();
        Ok(Self { size, cells })
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Position) -> Option<&T> {
        let i = self.offset(pos)?;
        Some(&self.cells[i])
    }

    /// Cells paired with their positions, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        positions(self.size).zip(self.cells.iter())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.size.max(1))
    }

    fn offset(&self, pos: Position) -> Option<usize> {
        (pos.x < self.size && pos.y < self.size).then(|| pos.y * self.size + pos.x)
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        match self.offset(pos) {
            Some(i) => &self.cells[i],
            None => panic!("{pos:?} is outside a {0}x{0} grid", self.size),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        match self.offset(pos) {
            Some(i) => &mut self.cells[i],
            None => panic!("{pos:?} is outside a {0}x{0} grid", self.size),
        }
    }
}

/// Every position of an N×N grid in row-major order.
pub fn positions(size: usize) -> impl Iterator<Item = Position> {
    (0..size).flat_map(move |y| (0..size).map(move |x| Position::new(x, y)))
}
