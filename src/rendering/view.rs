use crate::{
    error::EngineError,
    sim::{Cell, Engine},
};

/// A read-only window onto one row of engine-owned cell bytes.
///
/// The view borrows the engine, so it cannot be held across `step` or
/// `toggle_cell`. Acquire a fresh one for every paint.
#[derive(Clone, Copy, Debug)]
pub struct RowView<'a> {
    row: u32,
    bytes: &'a [u8],
}

impl<'a> RowView<'a> {
    pub fn new<E: Engine + ?Sized>(engine: &'a E, row: u32) -> Result<Self, EngineError> {
        let height = engine.height();
        let out_of_bounds = EngineError::RowOutOfBounds { row, height };
        if row >= height {
            return Err(out_of_bounds);
        }
        let start = engine.row_offset(row)?;
        let end = start
            .checked_add(engine.width() as usize)
            .ok_or_else(|| out_of_bounds.clone())?;
        let bytes = engine.memory().get(start..end).ok_or(out_of_bounds)?;
        Ok(Self { row, bytes })
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The decoded cell at `col`, or `None` past the end of the row.
    pub fn cell(&self, col: u32) -> Option<Cell> {
        self.bytes.get(col as usize).copied().map(Cell::from_byte)
    }

    pub fn cells(self) -> impl Iterator<Item = Cell> + 'a {
        self.bytes.iter().copied().map(Cell::from_byte)
    }

    /// The raw bytes, still backed by engine memory.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Universe;

    /// Engine whose memory is shorter than its geometry claims.
    struct Truncated;

    impl Engine for Truncated {
        fn width(&self) -> u32 {
            4
        }
        fn height(&self) -> u32 {
            2
        }
        fn step(&mut self) {}
        fn toggle_cell(&mut self, _row: u32, _col: u32) -> Result<(), EngineError> {
            Ok(())
        }
        fn row_offset(&self, row: u32) -> Result<usize, EngineError> {
            Ok(row as usize * 4)
        }
        fn memory(&self) -> &[u8] {
            &[0, 1, 0, 1, 1, 1]
        }
    }

    #[test]
    fn borrows_engine_memory_without_copying() {
        let universe = Universe::from_vec(vec![0, 0, 0, 1, 1, 0], 3, 2).unwrap();
        let view = RowView::new(&universe, 1).unwrap();

        assert_eq!(view.as_bytes().as_ptr(), universe.memory()[3..].as_ptr());
        assert_eq!(view.len(), 3);
        assert_eq!(
            view.cells().collect::<Vec<_>>(),
            [Cell::Alive, Cell::Alive, Cell::Dead]
        );
        assert_eq!(view.cell(3), None);
    }

    #[test]
    fn rejects_row_past_height() {
        let universe = Universe::new(3, 2).unwrap();
        assert_eq!(
            RowView::new(&universe, 2).unwrap_err(),
            EngineError::RowOutOfBounds { row: 2, height: 2 }
        );
    }

    #[test]
    fn rejects_short_engine_memory() {
        assert!(RowView::new(&Truncated, 0).is_ok());
        assert_eq!(
            RowView::new(&Truncated, 1).unwrap_err(),
            EngineError::RowOutOfBounds { row: 1, height: 2 }
        );
    }

    #[test]
    fn fresh_view_sees_toggle() {
        let mut universe = Universe::new(4, 4).unwrap();
        let before = RowView::new(&universe, 2).unwrap().cell(3);
        universe.toggle_cell(2, 3).unwrap();
        let after = RowView::new(&universe, 2).unwrap().cell(3);

        assert_eq!(before, Some(Cell::Dead));
        assert_eq!(after, Some(Cell::Alive));
    }
}
