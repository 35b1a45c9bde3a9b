//! Low-level rendering primitives.
//!
//! Provides the [`Renderer`] struct which owns the frame's buffers and
//! implements the drawing operations that are not triangle fills: clearing,
//! depth-aware lines, the overlay glyph and final composition.
//!
//! Four surfaces are kept, all sized `width * height`:
//! - the RGBA8 color buffer the scene is drawn into,
//! - the depth buffer (clip-space Z, smaller is nearer),
//! - the overlay, RGBA8 with straight alpha, cleared to transparent,
//! - the composed frame handed to the display.

use super::framebuffer::FrameBuffer;
use super::rasterizer::ScreenVertex;
use crate::backend::RenderError;
use crate::colors::{self, Rgba};

/// How a line interacts with the depth buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineDepth {
    /// Drawn over everything.
    Ignore,
    /// Drawn only where the line is not behind the stored depth by more than
    /// `bias`. The depth buffer itself is left untouched.
    HiddenLine { bias: f32 },
}

pub struct Renderer {
    color_buffer: Vec<u8>,
    depth_buffer: Vec<f32>,
    overlay: Vec<u8>,
    frame: Vec<u8>,
    width: u32,
    height: u32,
}

fn allocate<T: Clone>(len: usize, fill: T, width: u32, height: u32) -> Result<Vec<T>, RenderError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| RenderError::Allocation { width, height })?;
    buffer.resize(len, fill);
    Ok(buffer)
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let mut renderer = Self {
            color_buffer: Vec::new(),
            depth_buffer: Vec::new(),
            overlay: Vec::new(),
            frame: Vec::new(),
            width: 0,
            height: 0,
        };
        renderer.resize(width, height)?;
        Ok(renderer)
    }

    /// Reallocates every buffer for the new size. On failure the previous
    /// buffers are kept.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or(RenderError::Allocation { width, height })?;
        let bytes = pixels
            .checked_mul(4)
            .ok_or(RenderError::Allocation { width, height })?;

        let background = colors::BACKGROUND.to_rgba8();
        let color_buffer = allocate(bytes, 0, width, height)?;
        let depth_buffer = allocate(pixels, f32::INFINITY, width, height)?;
        let overlay = allocate(bytes, 0, width, height)?;
        let frame = allocate(bytes, 0, width, height)?;

        self.color_buffer = color_buffer;
        self.depth_buffer = depth_buffer;
        self.overlay = overlay;
        self.frame = frame;
        self.width = width;
        self.height = height;
        self.clear(background);
        self.clear_overlay();
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the color buffer with an opaque color and reset depth to `+inf`.
    pub fn clear(&mut self, color: Rgba) {
        for px in self.color_buffer.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
        self.depth_buffer.fill(f32::INFINITY);
    }

    pub fn clear_overlay(&mut self) {
        self.overlay.fill(0);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.color_buffer[idx * 4..idx * 4 + 4].copy_from_slice(&color);
        }
    }

    #[inline]
    fn set_overlay_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.overlay[idx * 4..idx * 4 + 4].copy_from_slice(&color);
        }
    }

    #[inline]
    fn set_line_pixel(&mut self, x: i32, y: i32, z: f32, color: Rgba, depth: LineDepth) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if let LineDepth::HiddenLine { bias } = depth {
            if z > self.depth_buffer[idx] + bias {
                return;
            }
        }
        self.color_buffer[idx * 4..idx * 4 + 4].copy_from_slice(&color);
    }

    /// Draws a line between two screen points using Bresenham's algorithm.
    ///
    /// For each step along the major axis, an integer error term decides
    /// whether to also step along the minor axis. Depth is linearly
    /// interpolated along the line for the hidden-line test.
    ///
    /// The segment is clipped to the canvas first so far off-screen endpoints
    /// cost nothing.
    pub fn draw_line(&mut self, from: ScreenVertex, to: ScreenVertex, color: Rgba, depth: LineDepth) {
        let Some((from, to)) = clip_segment(from, to, self.width as f32, self.height as f32) else {
            return;
        };

        let (x0, y0) = (from.x.round() as i32, from.y.round() as i32);
        let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let steps = dx.max(dy);
        if steps == 0 {
            self.set_line_pixel(x0, y0, from.z.min(to.z), color, depth);
            return;
        }

        let x_incr_direction = if x0 < x1 { 1 } else { -1 };
        let y_incr_direction = if y0 < y1 { 1 } else { -1 };

        let mut err = dx - dy;
        let mut x = x0;
        let mut y = y0;
        let mut step = 0;

        loop {
            let t = step as f32 / steps as f32;
            let z = from.z + t * (to.z - from.z);
            self.set_line_pixel(x, y, z, color, depth);

            if x == x1 && y == y1 {
                break;
            }
            step += 1;

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += x_incr_direction;
            }
            if e2 < dx {
                err += dx;
                y += y_incr_direction;
            }
        }
    }

    /// Draws the light indicator centred on `(cx, cy)` into the overlay: a
    /// filled disc with a dark outline and four short rays.
    pub fn draw_light_glyph(&mut self, cx: f32, cy: f32) {
        const RADIUS: i32 = 6;
        const RAY: i32 = 4;

        if !(cx.is_finite() && cy.is_finite()) {
            return;
        }
        let (cx, cy) = (cx.round() as i32, cy.round() as i32);
        let inner = (RADIUS - 1) * (RADIUS - 1);
        let outer = RADIUS * RADIUS;

        for dy in -RADIUS..=RADIUS {
            for dx in -RADIUS..=RADIUS {
                let d2 = dx * dx + dy * dy;
                if d2 <= inner {
                    self.set_overlay_pixel(cx + dx, cy + dy, colors::LIGHT_INDICATOR);
                } else if d2 <= outer {
                    self.set_overlay_pixel(cx + dx, cy + dy, colors::LIGHT_OUTLINE);
                }
            }
        }
        for i in 1..=RAY {
            let r = RADIUS + i;
            self.set_overlay_pixel(cx + r, cy, colors::LIGHT_OUTLINE);
            self.set_overlay_pixel(cx - r, cy, colors::LIGHT_OUTLINE);
            self.set_overlay_pixel(cx, cy + r, colors::LIGHT_OUTLINE);
            self.set_overlay_pixel(cx, cy - r, colors::LIGHT_OUTLINE);
        }
    }

    /// Builds the presented frame: the color buffer with the overlay
    /// alpha-blended on top.
    pub fn compose(&mut self) {
        self.frame.copy_from_slice(&self.color_buffer);
        for (dst, src) in self
            .frame
            .chunks_exact_mut(4)
            .zip(self.overlay.chunks_exact(4))
        {
            colors::blend_over(dst, [src[0], src[1], src[2], src[3]]);
        }
    }

    /// The composed frame, valid after [`Renderer::compose`].
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn color_buffer(&self) -> &[u8] {
        &self.color_buffer
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth_buffer
    }

    pub fn overlay(&self) -> &[u8] {
        &self.overlay
    }

    /// Composed pixel at `(x, y)`.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|idx| {
            let mut px = [0; 4];
            px.copy_from_slice(&self.frame[idx * 4..idx * 4 + 4]);
            px
        })
    }

    /// Get a mutable FrameBuffer view into the color and depth buffers.
    pub fn as_framebuffer(&mut self, depth_test: bool) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
            depth_test,
        )
    }
}

/// Liang-Barsky clip of a segment against `[-1, width] x [-1, height]`,
/// carrying depth along.
fn clip_segment(
    a: ScreenVertex,
    b: ScreenVertex,
    width: f32,
    height: f32,
) -> Option<(ScreenVertex, ScreenVertex)> {
    if ![a.x, a.y, a.z, b.x, b.y, b.z].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    let checks = [
        (-dx, a.x + 1.0),
        (dx, width - a.x),
        (-dy, a.y + 1.0),
        (dy, height - a.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f32| {
        ScreenVertex::new(a.x + dx * t, a.y + dy * t, a.z + (b.z - a.z) * t)
    };
    Some((at(t0), at(t1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba = [10, 20, 30, 255];

    fn renderer() -> Renderer {
        Renderer::new(16, 16).unwrap()
    }

    fn color_at(r: &Renderer, x: usize, y: usize) -> Rgba {
        let i = (y * r.width() as usize + x) * 4;
        let c = r.color_buffer();
        [c[i], c[i + 1], c[i + 2], c[i + 3]]
    }

    #[test]
    fn clear_resets_color_and_depth() {
        let mut r = renderer();
        r.set_pixel(3, 3, INK);
        r.clear([1, 2, 3, 255]);
        assert_eq!(color_at(&r, 3, 3), [1, 2, 3, 255]);
        assert!(r.depth_buffer().iter().all(|d| *d == f32::INFINITY));
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut r = renderer();
        r.draw_line(
            ScreenVertex::new(1.0, 1.0, 0.0),
            ScreenVertex::new(12.0, 7.0, 0.0),
            INK,
            LineDepth::Ignore,
        );
        assert_eq!(color_at(&r, 1, 1), INK);
        assert_eq!(color_at(&r, 12, 7), INK);
    }

    #[test]
    fn hidden_line_respects_filled_depth() {
        let mut r = renderer();
        {
            let mut fb = r.as_framebuffer(true);
            for x in 0..16 {
                fb.set_pixel_with_depth(x, 5, 0.5, || [0, 0, 0, 255]);
            }
        }
        let bias = LineDepth::HiddenLine { bias: 1e-3 };
        // Behind the surface: hidden.
        r.draw_line(ScreenVertex::new(0.0, 5.0, 0.9), ScreenVertex::new(7.0, 5.0, 0.9), INK, bias);
        assert_eq!(color_at(&r, 3, 5), [0, 0, 0, 255]);
        // On the surface within the bias: visible.
        r.draw_line(ScreenVertex::new(8.0, 5.0, 0.5005), ScreenVertex::new(15.0, 5.0, 0.5005), INK, bias);
        assert_eq!(color_at(&r, 10, 5), INK);
    }

    #[test]
    fn far_off_screen_lines_are_clipped() {
        let mut r = renderer();
        r.draw_line(
            ScreenVertex::new(-1.0e9, 8.0, 0.0),
            ScreenVertex::new(1.0e9, 8.0, 0.0),
            INK,
            LineDepth::Ignore,
        );
        assert_eq!(color_at(&r, 0, 8), INK);
        assert_eq!(color_at(&r, 15, 8), INK);
        assert!(clip_segment(
            ScreenVertex::new(-50.0, -50.0, 0.0),
            ScreenVertex::new(-40.0, -60.0, 0.0),
            16.0,
            16.0
        )
        .is_none());
    }

    #[test]
    fn overlay_is_blended_on_compose() {
        let mut r = renderer();
        r.clear([0, 0, 0, 255]);
        r.draw_light_glyph(8.0, 8.0);
        r.compose();
        assert_ne!(r.pixel(8, 8), Some([0, 0, 0, 255]));
        assert_eq!(r.pixel(0, 15), Some([0, 0, 0, 255]));

        r.clear_overlay();
        r.compose();
        assert_eq!(r.pixel(8, 8), Some([0, 0, 0, 255]));
    }

    #[test]
    fn impossible_size_is_an_allocation_error() {
        let err = Renderer::new(u32::MAX, u32::MAX).err();
        assert!(matches!(
            err,
            Some(RenderError::Allocation { width: u32::MAX, .. })
        ));
    }
}
