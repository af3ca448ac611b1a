//! An in-memory RGB pixel surface.
//!
//! Native hosts and tests paint into a `Raster` instead of a browser canvas.
//! Pixels are packed `0x00RRGGBB`.

use super::DrawingContext;
use crate::util::Color;

const BACKGROUND_COLOR: Color = Color::rgb(0, 0, 0);

pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    fill: Color,
    stroke: Color,
    path: Vec<((f64, f64), (f64, f64))>,
    cursor: Option<(f64, f64)>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND_COLOR.as_u32(); width as usize * height as usize],
            fill: BACKGROUND_COLOR,
            stroke: BACKGROUND_COLOR,
            path: Vec::new(),
            cursor: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Color::from_u32(
            self.pixels[y as usize * self.width as usize + x as usize],
        ))
    }

    fn put(&mut self, x: i64, y: i64, color: u32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        self.pixels[y as usize * self.width as usize + x as usize] = color;
    }

    fn draw_segment(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64), color: u32) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).round() as usize;
        if steps == 0 {
            self.put(x0.round() as i64, y0.round() as i64, color);
            return;
        }
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (x0 + dx * t).round() as i64;
            let y = (y0 + dy * t).round() as i64;
            self.put(x, y, color);
        }
    }
}

impl DrawingContext for Raster {
    fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.cursor = None;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if let Some(from) = self.cursor {
            self.path.push((from, (x, y)));
        }
        self.cursor = Some((x, y));
    }

    fn stroke(&mut self) {
        let color = self.stroke.as_u32();
        let path = std::mem::take(&mut self.path);
        for &(from, to) in &path {
            self.draw_segment(from, to, color);
        }
        // Stroking does not consume the path.
        self.path = path;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let x0 = x.floor().max(0.0) as u32;
        let y0 = y.floor().max(0.0) as u32;
        let x1 = ((x + w).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((y + h).ceil().max(0.0) as u32).min(self.height);
        let color = self.fill.as_u32();
        for py in y0..y1 {
            let start = py as usize * self.width as usize;
            for px in x0..x1 {
                self.pixels[start + px as usize] = color;
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }
}
