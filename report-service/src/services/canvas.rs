//! Minimal raster painter over an [`image::RgbImage`].
//!
//! Coordinates are in pixels with the origin at the top-left corner. Shapes
//! are sampled at pixel centers; strokes get a one-pixel soft edge.

use crate::models::Rgb;
use image::RgbImage;

pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            image: RgbImage::from_pixel(
                width,
                height,
                image::Rgb([background.r, background.g, background.b]),
            ),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let [r, g, b] = self.image.get_pixel(x, y).0;
        Rgb::new(r, g, b)
    }

    /// Raw RGB8 samples, row-major.
    pub fn into_raw(self) -> Vec<u8> {
        self.image.into_raw()
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 || alpha <= 0.0 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        let [r, g, b] = pixel.0;
        let out = color.over(Rgb::new(r, g, b), alpha);
        pixel.0 = [out.r, out.g, out.b];
    }

    /// Clamped pixel index range covering `[lo, hi]`.
    fn span(lo: f32, hi: f32, limit: u32) -> (i64, i64) {
        let start = lo.floor().max(0.0) as i64;
        let end = (hi.ceil() as i64).min(limit as i64 - 1);
        (start, end)
    }

    pub fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        let (xs, xe) = Self::span(left, right, self.width());
        let (ys, ye) = Self::span(top, bottom, self.height());

        for y in ys..=ye {
            let cy = y as f32 + 0.5;
            if cy < top || cy > bottom {
                continue;
            }
            for x in xs..=xe {
                let cx = x as f32 + 0.5;
                if cx >= left && cx <= right {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb) {
        let (xs, xe) = Self::span(cx - radius - 1.0, cx + radius + 1.0, self.width());
        let (ys, ye) = Self::span(cy - radius - 1.0, cy + radius + 1.0, self.height());

        for y in ys..=ye {
            for x in xs..=xe {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let distance = (dx * dx + dy * dy).sqrt();
                self.blend(x, y, color, radius + 0.5 - distance);
            }
        }
    }

    /// Straight segment of the given thickness.
    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb) {
        let half = thickness.max(1.0) / 2.0;
        let (xs, xe) = Self::span(from.0.min(to.0) - half - 1.0, from.0.max(to.0) + half + 1.0, self.width());
        let (ys, ye) = Self::span(from.1.min(to.1) - half - 1.0, from.1.max(to.1) + half + 1.0, self.height());

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length_sq = dx * dx + dy * dy;

        for y in ys..=ye {
            for x in xs..=xe {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let t = if length_sq > f32::EPSILON {
                    (((px - from.0) * dx + (py - from.1) * dy) / length_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (nx, ny) = (from.0 + t * dx, from.1 + t * dy);
                let distance = ((px - nx).powi(2) + (py - ny).powi(2)).sqrt();
                self.blend(x, y, color, half + 0.5 - distance);
            }
        }
    }

    /// Closed outline through `points`.
    pub fn stroke_polygon(&mut self, points: &[(f32, f32)], thickness: f32, color: Rgb) {
        if points.len() < 2 {
            return;
        }
        for (i, &start) in points.iter().enumerate() {
            let end = points[(i + 1) % points.len()];
            self.draw_line(start, end, thickness, color);
        }
    }

    /// Even-odd scanline fill, blended with `alpha`.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgb, alpha: f32) {
        if points.len() < 3 {
            return;
        }
        let top = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let bottom = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        let (ys, ye) = Self::span(top, bottom, self.height());

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for y in ys..=ye {
            let cy = y as f32 + 0.5;
            crossings.clear();
            for (i, &(x0, y0)) in points.iter().enumerate() {
                let (x1, y1) = points[(i + 1) % points.len()];
                // Half-open edge test so shared vertices count once
                if (y0 <= cy && y1 > cy) || (y1 <= cy && y0 > cy) {
                    crossings.push(x0 + (cy - y0) / (y1 - y0) * (x1 - x0));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for pair in crossings.chunks_exact(2) {
                let (xs, xe) = Self::span(pair[0], pair[1], self.width());
                for x in xs..=xe {
                    let cx = x as f32 + 0.5;
                    if cx >= pair[0] && cx <= pair[1] {
                        self.blend(x, y, color, alpha);
                    }
                }
            }
        }
    }
}
