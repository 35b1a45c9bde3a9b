//! Scanline-based triangle rasterization.
//!
//! # Algorithm Overview
//!
//! 1. **Sort vertices** by Y coordinate (top to bottom in screen space)
//! 2. **Split** the triangle at the middle vertex into an upper and a lower half
//! 3. **Rasterize** each scanline by interpolating X and depth along the long
//!    edge and the active short edge, then across the span
//!
//! ```text
//!        v0
//!        /\
//!       /  \        upper half: rows ceil(v0.y) .. ceil(v1.y)
//!     v1----\
//!        \   \      lower half: rows ceil(v1.y) ..= floor(v2.y)
//!          \  \
//!            \ \
//!              v2
//! ```
//!
//! Depth is interpolated linearly in screen space, first along the edges by
//! the fractional row position and then across the span. Colors come from
//! the shader, which receives the pixel's barycentric weights with respect
//! to the triangle's original vertex order.

use super::{barycentric, PixelShader, ScreenVertex, Triangle};
use crate::render::framebuffer::FrameBuffer;

/// Edges shorter than this in Y (or spans shorter in X) are not divided by.
const SPAN_EPSILON: f32 = 1e-4;

const CENTROID: [f32; 3] = [1.0 / 3.0; 3];

#[derive(Clone, Copy, Debug, Default)]
pub struct ScanlineRasterizer;

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Sorts three vertices by Y coordinate (ascending: top to bottom).
    fn sort_vertices(points: [ScreenVertex; 3]) -> [ScreenVertex; 3] {
        let [mut v0, mut v1, mut v2] = points;
        if v1.y < v0.y {
            std::mem::swap(&mut v0, &mut v1);
        }
        if v2.y < v1.y {
            std::mem::swap(&mut v1, &mut v2);
        }
        if v1.y < v0.y {
            std::mem::swap(&mut v0, &mut v1);
        }
        [v0, v1, v2]
    }

    /// X and depth where the edge `a -> b` crosses row `y`.
    #[inline]
    fn edge_at(a: ScreenVertex, b: ScreenVertex, y: f32) -> (f32, f32) {
        let dy = b.y - a.y;
        let t = if dy.abs() < SPAN_EPSILON {
            0.0
        } else {
            (y - a.y) / dy
        };
        (a.x + (b.x - a.x) * t, a.z + (b.z - a.z) * t)
    }

    /// Fills a triangle, calling `shader` for every pixel that passes the
    /// depth test. Pixels outside the buffer are never visited.
    pub fn fill_triangle<S: PixelShader>(
        &self,
        triangle: &Triangle,
        buffer: &mut FrameBuffer,
        shader: &S,
    ) {
        let points = triangle.points;
        if points
            .iter()
            .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return;
        }

        let [v0, v1, v2] = Self::sort_vertices(points);
        let max_row = buffer.height() as i32 - 1;

        let upper = (v0.y.ceil() as i32).max(0)..(v1.y.ceil() as i32).min(max_row + 1);
        for y in upper {
            let (xa, za) = Self::edge_at(v0, v2, y as f32);
            let (xb, zb) = Self::edge_at(v0, v1, y as f32);
            Self::fill_span(triangle, buffer, shader, y, (xa, za), (xb, zb));
        }

        let lower = (v1.y.ceil() as i32).max(0)..=(v2.y.floor() as i32).min(max_row);
        for y in lower {
            let (xa, za) = Self::edge_at(v0, v2, y as f32);
            let (xb, zb) = Self::edge_at(v1, v2, y as f32);
            Self::fill_span(triangle, buffer, shader, y, (xa, za), (xb, zb));
        }
    }

    #[inline]
    fn fill_span<S: PixelShader>(
        triangle: &Triangle,
        buffer: &mut FrameBuffer,
        shader: &S,
        y: i32,
        a: (f32, f32),
        b: (f32, f32),
    ) {
        let ((x_left, z_left), (x_right, z_right)) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        let span = x_right - x_left;
        let [p0, p1, p2] = triangle.points;

        let x_start = (x_left.ceil() as i32).max(0);
        let x_end = (x_right.floor() as i32).min(buffer.width() as i32 - 1);

        for x in x_start..=x_end {
            let s = if span < SPAN_EPSILON {
                0.0
            } else {
                (x as f32 - x_left) / span
            };
            let depth = z_left + (z_right - z_left) * s;
            buffer.set_pixel_with_depth(x, y, depth, || {
                let lambda = barycentric(x as f32, y as f32, p0, p1, p2).unwrap_or(CENTROID);
                shader.shade(lambda)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{Color, Rgba};
    use crate::render::rasterizer::FlatShader;

    const W: u32 = 32;
    const H: u32 = 32;

    struct Target {
        color: Vec<u8>,
        depth: Vec<f32>,
    }

    impl Target {
        fn new() -> Self {
            Self {
                color: vec![0; (W * H * 4) as usize],
                depth: vec![f32::INFINITY; (W * H) as usize],
            }
        }

        fn view(&mut self, depth_test: bool) -> FrameBuffer<'_> {
            FrameBuffer::new(&mut self.color, &mut self.depth, W, H, depth_test)
        }

        fn pixel(&self, x: usize, y: usize) -> Rgba {
            let i = (y * W as usize + x) * 4;
            [self.color[i], self.color[i + 1], self.color[i + 2], self.color[i + 3]]
        }

        fn covered(&self) -> usize {
            self.color.chunks(4).filter(|px| px[3] != 0).count()
        }
    }

    fn tri(z: f32) -> Triangle {
        Triangle::new([
            ScreenVertex::new(2.0, 2.0, z),
            ScreenVertex::new(28.0, 4.0, z),
            ScreenVertex::new(10.0, 26.0, z),
        ])
    }

    const RED: Color = Color::new(1.0, 0.0, 0.0);
    const BLUE: Color = Color::new(0.0, 0.0, 1.0);

    #[test]
    fn fills_interior_and_leaves_outside_untouched() {
        let mut target = Target::new();
        ScanlineRasterizer::new().fill_triangle(&tri(0.0), &mut target.view(true), &FlatShader::new(RED));
        assert_eq!(target.pixel(10, 10), [255, 0, 0, 255]);
        assert_eq!(target.pixel(30, 30), [0, 0, 0, 0]);
        assert_eq!(target.pixel(1, 1), [0, 0, 0, 0]);
        // Roughly half of the 26x24 bounding box.
        let n = target.covered();
        assert!((200..=360).contains(&n), "covered {n}");
    }

    #[test]
    fn nearer_triangle_wins_in_either_order() {
        let raster = ScanlineRasterizer::new();
        for near_first in [true, false] {
            let mut target = Target::new();
            let near = (tri(0.2), FlatShader::new(RED));
            let far = (tri(0.8), FlatShader::new(BLUE));
            let order = if near_first { [&near, &far] } else { [&far, &near] };
            for (t, shader) in order {
                raster.fill_triangle(t, &mut target.view(true), shader);
            }
            assert_eq!(target.pixel(10, 10), [255, 0, 0, 255]);
        }
    }

    #[test]
    fn depth_test_off_keeps_last_drawn() {
        let raster = ScanlineRasterizer::new();
        let mut target = Target::new();
        raster.fill_triangle(&tri(0.2), &mut target.view(false), &FlatShader::new(RED));
        raster.fill_triangle(&tri(0.8), &mut target.view(false), &FlatShader::new(BLUE));
        assert_eq!(target.pixel(10, 10), [0, 0, 255, 255]);
    }

    #[test]
    fn depth_is_interpolated_across_the_triangle() {
        let mut target = Target::new();
        let sloped = Triangle::new([
            ScreenVertex::new(0.0, 0.0, 0.0),
            ScreenVertex::new(31.0, 0.0, 1.0),
            ScreenVertex::new(0.0, 31.0, 0.0),
        ]);
        ScanlineRasterizer::new().fill_triangle(&sloped, &mut target.view(true), &FlatShader::new(RED));
        let left = target.depth[(5 * W + 1) as usize];
        let right = target.depth[(5 * W + 20) as usize];
        assert!(left < right);
        assert!((0.0..=1.0).contains(&right));
    }

    #[test]
    fn off_screen_vertices_are_clipped_to_the_buffer() {
        let mut target = Target::new();
        let huge = Triangle::new([
            ScreenVertex::new(-1.0e6, -1.0e6, 0.0),
            ScreenVertex::new(1.0e6, -1.0e6, 0.0),
            ScreenVertex::new(0.0, 1.0e6, 0.0),
        ]);
        ScanlineRasterizer::new().fill_triangle(&huge, &mut target.view(true), &FlatShader::new(RED));
        assert_eq!(target.covered(), (W * H) as usize);
    }

    #[test]
    fn non_finite_triangle_is_skipped() {
        let mut target = Target::new();
        let bad = Triangle::new([
            ScreenVertex::new(f32::NAN, 0.0, 0.0),
            ScreenVertex::new(10.0, 0.0, 0.0),
            ScreenVertex::new(0.0, 10.0, 0.0),
        ]);
        ScanlineRasterizer::new().fill_triangle(&bad, &mut target.view(true), &FlatShader::new(RED));
        assert_eq!(target.covered(), 0);
    }
}
