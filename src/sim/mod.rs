use std::fmt;

use bytemuck::NoUninit;
use rayon::prelude::*;

use crate::error::EngineError;

/// A cell discriminant, stored one byte per cell in row-major order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, NoUninit)]
pub enum Cell {
    Dead = 0,
    Alive = 1,
}

impl Cell {
    /// Decode a raw cell byte. Anything other than the alive discriminant
    /// reads as dead.
    pub fn from_byte(byte: u8) -> Cell {
        match byte {
            1 => Cell::Alive,
            _ => Cell::Dead,
        }
    }

    pub fn toggled(self) -> Cell {
        match self {
            Cell::Alive => Cell::Dead,
            Cell::Dead => Cell::Alive,
        }
    }

    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }
}

/// The automaton engine the controller drives.
///
/// The engine owns the cell grid and its memory. Callers only read that
/// memory through short-lived borrows; `step` and `toggle_cell` take
/// `&mut self`, so no view can outlive a mutation.
pub trait Engine {
    /// Grid width in cells. Fixed for the engine's lifetime.
    fn width(&self) -> u32;
    /// Grid height in cells. Fixed for the engine's lifetime.
    fn height(&self) -> u32;
    /// Advance exactly one generation.
    fn step(&mut self);
    /// Flip one cell's discriminant.
    fn toggle_cell(&mut self, row: u32, col: u32) -> Result<(), EngineError>;
    /// Byte offset into [`Engine::memory`] where `row`'s `width` cells begin.
    fn row_offset(&self, row: u32) -> Result<usize, EngineError>;
    /// The engine's linear cell memory.
    fn memory(&self) -> &[u8];
}

/// Reference engine: Conway's rules (B3/S23) on a bounded grid.
///
/// Cells beyond the edges count as dead. Each step writes the next
/// generation into a second buffer and swaps, so the bytes behind
/// [`Engine::memory`] move on every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    next: Vec<Cell>,
    generation: u64,
}

impl Universe {
    /// An all-dead universe.
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::EmptyGrid { width, height });
        }
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Dead; len],
            next: vec![Cell::Dead; len],
            generation: 0,
        })
    }

    /// Build a universe from raw row-major cell bytes.
    pub fn from_vec(bytes: Vec<u8>, width: u32, height: u32) -> Result<Self, EngineError> {
        let mut universe = Self::new(width, height)?;
        if bytes.len() != universe.cells.len() {
            return Err(EngineError::SizeMismatch {
                expected: universe.cells.len(),
                actual: bytes.len(),
            });
        }
        for (cell, byte) in universe.cells.iter_mut().zip(bytes) {
            *cell = Cell::from_byte(byte);
        }
        Ok(universe)
    }

    /// A universe with each cell alive with probability one half.
    pub fn random(width: u32, height: u32) -> Result<Self, EngineError> {
        Self::random_with(&mut fastrand::Rng::new(), width, height)
    }

    /// Like [`Universe::random`], drawing from the given generator.
    pub fn random_with(
        rng: &mut fastrand::Rng,
        width: u32,
        height: u32,
    ) -> Result<Self, EngineError> {
        let mut universe = Self::new(width, height)?;
        for cell in universe.cells.iter_mut() {
            if rng.bool() {
                *cell = Cell::Alive;
            }
        }
        Ok(universe)
    }

    /// A universe from a row-major pattern, or a random one when no pattern
    /// is given.
    pub fn pattern_or_random(
        pattern: Option<Vec<u8>>,
        width: u32,
        height: u32,
    ) -> Result<Self, EngineError> {
        match pattern {
            Some(bytes) => Self::from_vec(bytes, width, height),
            None => Self::random(width, height),
        }
    }

    /// Mark the given `(row, col)` cells alive.
    pub fn set_cells(&mut self, cells: &[(u32, u32)]) -> Result<(), EngineError> {
        for &(row, col) in cells {
            let idx = self.index(row, col)?;
            self.cells[idx] = Cell::Alive;
        }
        Ok(())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of steps taken since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn index(&self, row: u32, col: u32) -> Result<usize, EngineError> {
        if row >= self.height || col >= self.width {
            return Err(EngineError::cell_out_of_bounds(
                row as i64,
                col as i64,
                self.width,
                self.height,
            ));
        }
        Ok(row as usize * self.width as usize + col as usize)
    }
}

impl Engine for Universe {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn step(&mut self) {
        let width = self.width as usize;
        let height = self.height as usize;
        let current = &self.cells;
        self.next
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, out)| {
                for (col, cell) in out.iter_mut().enumerate() {
                    let live = live_neighbors(current, row, col, width, height);
                    *cell = match (current[row * width + col], live) {
                        (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive,
                        (Cell::Dead, 3) => Cell::Alive,
                        _ => Cell::Dead,
                    };
                }
            });
        std::mem::swap(&mut self.cells, &mut self.next);
        self.generation += 1;
    }

    fn toggle_cell(&mut self, row: u32, col: u32) -> Result<(), EngineError> {
        let idx = self.index(row, col)?;
        self.cells[idx] = self.cells[idx].toggled();
        Ok(())
    }

    fn row_offset(&self, row: u32) -> Result<usize, EngineError> {
        if row >= self.height {
            return Err(EngineError::RowOutOfBounds {
                row,
                height: self.height,
            });
        }
        Ok(row as usize * self.width as usize)
    }

    fn memory(&self) -> &[u8] {
        bytemuck::cast_slice(self.cells.as_slice())
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for &cell in row {
                let symbol = if cell == Cell::Dead { '◻' } else { '◼' };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[inline(always)]
fn live_neighbors(grid: &[Cell], row: usize, col: usize, width: usize, height: usize) -> u8 {
    const N: [(isize, isize); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];

    let mut live = 0;
    for (dr, dc) in N {
        let nr = row as isize + dr;
        let nc = col as isize + dc;
        if nr >= 0
            && nr < height as isize
            && nc >= 0
            && nc < width as isize
            && grid[nr as usize * width + nc as usize].is_alive()
        {
            live += 1;
        }
    }
    live
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alive(universe: &Universe) -> Vec<(u32, u32)> {
        let width = universe.width();
        universe
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| (i as u32 / width, i as u32 % width))
            .collect()
    }

    #[test]
    fn rejects_empty_grid() {
        assert_eq!(
            Universe::new(0, 4),
            Err(EngineError::EmptyGrid {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn from_vec_checks_length() {
        let err = Universe::from_vec(vec![0; 5], 2, 2).unwrap_err();
        assert_eq!(
            err,
            EngineError::SizeMismatch {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn pattern_takes_precedence_over_random_fill() {
        let block = vec![0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0, 0];
        let universe = Universe::pattern_or_random(Some(block), 4, 4).unwrap();
        assert_eq!(alive(&universe), [(1, 1), (1, 2), (2, 1), (2, 2)]);

        assert_eq!(
            Universe::pattern_or_random(Some(vec![1; 3]), 2, 2),
            Err(EngineError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );

        let random = Universe::pattern_or_random(None, 5, 3).unwrap();
        assert_eq!((random.width(), random.height()), (5, 3));
    }

    #[test]
    fn unknown_bytes_decode_as_dead() {
        assert_eq!(Cell::from_byte(0), Cell::Dead);
        assert_eq!(Cell::from_byte(1), Cell::Alive);
        assert_eq!(Cell::from_byte(2), Cell::Dead);
        assert_eq!(Cell::from_byte(255), Cell::Dead);
    }

    #[test]
    fn memory_is_row_major_bytes() {
        let universe = Universe::from_vec(vec![0, 1, 1, 0, 0, 1], 3, 2).unwrap();
        assert_eq!(universe.memory(), &[0, 1, 1, 0, 0, 1]);
        assert_eq!(universe.row_offset(1), Ok(3));
        assert!(universe.row_offset(2).is_err());
    }

    #[test]
    fn glider_advances() {
        let mut universe = Universe::new(6, 6).unwrap();
        universe
            .set_cells(&[(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)])
            .unwrap();

        universe.step();

        assert_eq!(alive(&universe), [(2, 1), (2, 3), (3, 2), (3, 3), (4, 2)]);
        assert_eq!(universe.generation(), 1);
    }

    #[test]
    fn blinker_oscillates() {
        let mut universe = Universe::new(5, 5).unwrap();
        universe.set_cells(&[(2, 1), (2, 2), (2, 3)]).unwrap();

        universe.step();
        assert_eq!(alive(&universe), [(1, 2), (2, 2), (3, 2)]);

        universe.step();
        assert_eq!(alive(&universe), [(2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn edges_are_bounded() {
        // A blinker against the top edge loses the cell that would wrap.
        let mut universe = Universe::new(3, 3).unwrap();
        universe.set_cells(&[(0, 0), (0, 1), (0, 2)]).unwrap();

        universe.step();

        assert_eq!(alive(&universe), [(0, 1), (1, 1)]);
    }

    #[test]
    fn toggle_flips_and_rejects_out_of_range() {
        let mut universe = Universe::new(3, 3).unwrap();
        universe.toggle_cell(1, 2).unwrap();
        assert_eq!(universe.cells()[5], Cell::Alive);
        universe.toggle_cell(1, 2).unwrap();
        assert_eq!(universe.cells()[5], Cell::Dead);

        assert_eq!(
            universe.toggle_cell(3, 0),
            Err(EngineError::cell_out_of_bounds(3, 0, 3, 3))
        );
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let a = Universe::random_with(&mut fastrand::Rng::with_seed(7), 8, 8).unwrap();
        let b = Universe::random_with(&mut fastrand::Rng::with_seed(7), 8, 8).unwrap();
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn displays_rows_as_symbols() {
        let universe = Universe::from_vec(vec![1, 0, 0, 1], 2, 2).unwrap();
        assert_eq!(universe.to_string(), "◼◻\n◻◼\n");
    }
}
