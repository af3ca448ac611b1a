//! Pointer input: client-space clicks to grid coordinates.

/// The surface's bounding rectangle in client (CSS pixel) space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Surface pixels per client pixel on each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };

    /// Ratio of a surface's pixel size to its displayed size. An axis with a
    /// degenerate displayed size falls back to 1.
    pub fn between(surface_width: u32, surface_height: u32, rect: &SurfaceRect) -> Self {
        let ratio = |px: u32, shown: f64| {
            if shown.is_finite() && shown > 0.0 {
                px as f64 / shown
            } else {
                1.0
            }
        };
        Self {
            x: ratio(surface_width, rect.width),
            y: ratio(surface_height, rect.height),
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A grid coordinate as mapped from a pointer. Not clamped: it may be
/// negative or beyond the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub row: i64,
    pub col: i64,
}

#[derive(Clone, Copy, Debug)]
pub struct PointerMapper {
    cell_size: u32,
}

impl PointerMapper {
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1),
        }
    }

    pub fn map(
        &self,
        client_x: f64,
        client_y: f64,
        rect: &SurfaceRect,
        scale: Scale,
    ) -> GridPosition {
        let canvas_x = (client_x - rect.left) * scale.x;
        let canvas_y = (client_y - rect.top) * scale.y;
        let size = self.cell_size as f64;
        GridPosition {
            row: (canvas_y / size).floor() as i64,
            col: (canvas_x / size).floor() as i64,
        }
    }
}
