use web_sys::CanvasRenderingContext2d;

use crate::{config::Palette, error::EngineError, sim::Engine, util::Color};

pub mod raster;
pub mod view;

pub use raster::Raster;
pub use view::RowView;

/// The 2D drawing primitives the renderer needs from a surface.
pub trait DrawingContext {
    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    /// Set the surface's pixel dimensions. Called once before the first paint.
    fn resize(&mut self, width: u32, height: u32);
}

impl DrawingContext for CanvasRenderingContext2d {
    fn set_stroke_color(&mut self, color: Color) {
        self.set_stroke_style_str(&color.css());
    }
    fn set_fill_color(&mut self, color: Color) {
        self.set_fill_style_str(&color.css());
    }
    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }
    fn move_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }
    fn line_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }
    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }
    fn resize(&mut self, width: u32, height: u32) {
        match self.canvas() {
            Some(canvas) => {
                canvas.set_width(width);
                canvas.set_height(height);
            }
            None => log::warn!("2d context is not attached to a canvas; cannot resize"),
        }
    }
}

/// Paints an engine's grid: cell fills plus the lines between them.
#[derive(Clone, Debug)]
pub struct GridRenderer {
    cell_size: u32,
    palette: Palette,
}

impl GridRenderer {
    pub fn new(cell_size: u32, palette: Palette) -> Self {
        Self {
            cell_size: cell_size.max(1),
            palette,
        }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Surface pixel size for a grid, leaving room for the closing lines.
    pub fn surface_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width * self.cell_size + 1, height * self.cell_size + 1)
    }

    /// Stroke `width + 1` vertical and `height + 1` horizontal lines.
    pub fn draw_grid<E, D>(&self, engine: &E, ctx: &mut D)
    where
        E: Engine + ?Sized,
        D: DrawingContext + ?Sized,
    {
        let size = self.cell_size as f64;
        let width = engine.width();
        let height = engine.height();
        let right = width as f64 * size;
        let bottom = height as f64 * size;

        ctx.begin_path();
        ctx.set_stroke_color(self.palette.grid);
        for col in 0..=width {
            let x = col as f64 * size;
            ctx.move_to(x, 0.0);
            ctx.line_to(x, bottom);
        }
        for row in 0..=height {
            let y = row as f64 * size;
            ctx.move_to(0.0, y);
            ctx.line_to(right, y);
        }
        ctx.stroke();
    }

    /// Fill every cell, row by row, in its alive or dead colour.
    pub fn draw_cells<E, D>(&self, engine: &E, ctx: &mut D) -> Result<(), EngineError>
    where
        E: Engine + ?Sized,
        D: DrawingContext + ?Sized,
    {
        let size = self.cell_size as f64;
        let mut current_fill = None;
        for row in 0..engine.height() {
            let view = RowView::new(engine, row)?;
            for (col, cell) in view.cells().enumerate() {
                let color = if cell.is_alive() {
                    self.palette.alive
                } else {
                    self.palette.dead
                };
                if current_fill != Some(color) {
                    ctx.set_fill_color(color);
                    current_fill = Some(color);
                }
                ctx.fill_rect(col as f64 * size, row as f64 * size, size, size);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::Universe;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Stroke(Color),
        Fill(Color),
        Begin,
        Move(f64, f64),
        Line(f64, f64),
        Stroked,
        Rect(f64, f64, f64, f64),
        Resize(u32, u32),
    }

    /// Records every call for inspection.
    #[derive(Default)]
    pub struct Recorder {
        pub ops: Vec<Op>,
    }

    impl Recorder {
        /// Segments as (from, to) pairs, pairing each line with its move.
        pub fn segments(&self) -> Vec<((f64, f64), (f64, f64))> {
            let mut out = Vec::new();
            let mut cursor = None;
            for op in &self.ops {
                match *op {
                    Op::Move(x, y) => cursor = Some((x, y)),
                    Op::Line(x, y) => {
                        if let Some(from) = cursor {
                            out.push((from, (x, y)));
                        }
                        cursor = Some((x, y));
                    }
                    _ => {}
                }
            }
            out
        }

        pub fn rects(&self) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::Rect(..)))
                .count()
        }
    }

    impl DrawingContext for Recorder {
        fn set_stroke_color(&mut self, color: Color) {
            self.ops.push(Op::Stroke(color));
        }
        fn set_fill_color(&mut self, color: Color) {
            self.ops.push(Op::Fill(color));
        }
        fn begin_path(&mut self) {
            self.ops.push(Op::Begin);
        }
        fn move_to(&mut self, x: f64, y: f64) {
            self.ops.push(Op::Move(x, y));
        }
        fn line_to(&mut self, x: f64, y: f64) {
            self.ops.push(Op::Line(x, y));
        }
        fn stroke(&mut self) {
            self.ops.push(Op::Stroked);
        }
        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
            self.ops.push(Op::Rect(x, y, w, h));
        }
        fn resize(&mut self, width: u32, height: u32) {
            self.ops.push(Op::Resize(width, height));
        }
    }

    fn renderer() -> GridRenderer {
        GridRenderer::new(5, Palette::default())
    }

    #[test]
    fn grid_line_count_ignores_cell_contents() {
        let empty = Universe::new(7, 3).unwrap();
        let full = Universe::from_vec(vec![1; 21], 7, 3).unwrap();

        for universe in [empty, full] {
            let mut ctx = Recorder::default();
            renderer().draw_grid(&universe, &mut ctx);

            let segments = ctx.segments();
            let vertical = segments.iter().filter(|(a, b)| a.0 == b.0).count();
            let horizontal = segments.iter().filter(|(a, b)| a.1 == b.1).count();
            assert_eq!(vertical, 8);
            assert_eq!(horizontal, 4);
            assert_eq!(segments.len(), 12);
            assert_eq!(ctx.ops.last(), Some(&Op::Stroked));
        }
    }

    #[test]
    fn grid_spans_whole_surface() {
        let universe = Universe::new(4, 2).unwrap();
        let mut ctx = Recorder::default();
        renderer().draw_grid(&universe, &mut ctx);

        let segments = ctx.segments();
        assert_eq!(segments.first(), Some(&((0.0, 0.0), (0.0, 10.0))));
        assert_eq!(segments.last(), Some(&((0.0, 10.0), (20.0, 10.0))));
        assert_eq!(renderer().surface_size(4, 2), (21, 11));
    }

    #[test]
    fn cells_fill_in_row_major_order() {
        let universe = Universe::from_vec(vec![0, 1, 1, 0], 2, 2).unwrap();
        let palette = Palette::default();
        let mut ctx = Recorder::default();
        renderer().draw_cells(&universe, &mut ctx).unwrap();

        assert_eq!(
            ctx.ops,
            [
                Op::Fill(palette.dead),
                Op::Rect(0.0, 0.0, 5.0, 5.0),
                Op::Fill(palette.alive),
                Op::Rect(5.0, 0.0, 5.0, 5.0),
                Op::Rect(0.0, 5.0, 5.0, 5.0),
                Op::Fill(palette.dead),
                Op::Rect(5.0, 5.0, 5.0, 5.0),
            ]
        );
    }

    /// One row of raw bytes, one of them outside the known discriminants.
    struct RawRow;

    impl Engine for RawRow {
        fn width(&self) -> u32 {
            2
        }
        fn height(&self) -> u32 {
            1
        }
        fn step(&mut self) {}
        fn toggle_cell(&mut self, _row: u32, _col: u32) -> Result<(), EngineError> {
            Ok(())
        }
        fn row_offset(&self, _row: u32) -> Result<usize, EngineError> {
            Ok(0)
        }
        fn memory(&self) -> &[u8] {
            &[2, 1]
        }
    }

    #[test]
    fn unknown_cell_bytes_paint_as_dead() {
        let palette = Palette::default();
        let mut ctx = Recorder::default();
        renderer().draw_cells(&RawRow, &mut ctx).unwrap();

        assert_eq!(
            ctx.ops,
            [
                Op::Fill(palette.dead),
                Op::Rect(0.0, 0.0, 5.0, 5.0),
                Op::Fill(palette.alive),
                Op::Rect(5.0, 0.0, 5.0, 5.0),
            ]
        );

        let mut raster = Raster::new(11, 6);
        renderer().draw_cells(&RawRow, &mut raster).unwrap();
        assert_eq!(raster.pixel(2, 2), Some(palette.dead));
        assert_eq!(raster.pixel(7, 2), Some(palette.alive));
    }

    #[test]
    fn zero_cell_size_is_clamped() {
        assert_eq!(GridRenderer::new(0, Palette::default()).cell_size(), 1);
    }
}
