//! Error types for the engine contract.

use std::error::Error as StdError;
use std::fmt;

/// Precondition violations signaled by an [`Engine`](crate::sim::Engine).
///
/// None of these are fatal to a session: a rejected toggle leaves the grid
/// untouched, and a bad row view costs at most one incorrect frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A grid was requested with a zero width or height.
    EmptyGrid { width: u32, height: u32 },

    /// Initial cell data does not cover exactly `width * height` cells.
    SizeMismatch { expected: usize, actual: usize },

    /// A row index past the grid, or an engine whose memory does not hold
    /// a full row at the reported offset.
    RowOutOfBounds { row: u32, height: u32 },

    /// A cell coordinate outside the grid. Coordinates are signed because
    /// pointer mapping can land left of or above the surface.
    CellOutOfBounds {
        row: i64,
        col: i64,
        width: u32,
        height: u32,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EmptyGrid { width, height } => {
                write!(f, "empty grid: {width}x{height} has no cells")
            }
            EngineError::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected} cells, got {actual}")
            }
            EngineError::RowOutOfBounds { row, height } => {
                write!(f, "row {row} out of bounds for grid of height {height}")
            }
            EngineError::CellOutOfBounds {
                row,
                col,
                width,
                height,
            } => write!(
                f,
                "cell ({row}, {col}) out of bounds for {width}x{height} grid"
            ),
        }
    }
}

impl StdError for EngineError {}

impl EngineError {
    /// Out-of-range cell error for a grid of the given size.
    pub fn cell_out_of_bounds(row: i64, col: i64, width: u32, height: u32) -> Self {
        EngineError::CellOutOfBounds {
            row,
            col,
            width,
            height,
        }
    }
}
