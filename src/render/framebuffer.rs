//! Frame buffer abstraction for 2D pixel access.
//!
//! Provides a view into the RGBA8 color buffer and the depth buffer with
//! bounds-checked access. Writes outside the canvas are silently dropped.

use crate::colors::Rgba;

/// A view into color and depth buffers.
///
/// This is a borrowed view, not an owning type. It is created for the
/// duration of the fill pass and carries whether depth testing is enabled.
///
/// # Depth Buffer
///
/// The depth buffer stores the clip-space Z of the nearest fragment drawn so
/// far. Smaller values are nearer; a cleared buffer holds `+inf`.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u8],
    depth_buffer: &'a mut [f32],
    width: u32,
    height: u32,
    depth_test: bool,
}

impl<'a> FrameBuffer<'a> {
    /// Create a new FrameBuffer view from buffer slices and dimensions.
    pub fn new(
        color_buffer: &'a mut [u8],
        depth_buffer: &'a mut [f32],
        width: u32,
        height: u32,
        depth_test: bool,
    ) -> Self {
        debug_assert_eq!(
            color_buffer.len(),
            width as usize * height as usize * 4,
            "Color buffer size doesn't match dimensions"
        );
        debug_assert_eq!(
            depth_buffer.len(),
            width as usize * height as usize,
            "Depth buffer size doesn't match dimensions"
        );
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
            depth_test,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Depth-tested write.
    ///
    /// `shade` runs only when the fragment survives the depth test (or depth
    /// testing is off); both color and depth are then written.
    #[inline]
    pub fn set_pixel_with_depth<F>(&mut self, x: i32, y: i32, depth: f32, shade: F)
    where
        F: FnOnce() -> Rgba,
    {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if self.depth_test && !(depth < self.depth_buffer[idx]) {
            return;
        }
        self.depth_buffer[idx] = depth;
        self.color_buffer[idx * 4..idx * 4 + 4].copy_from_slice(&shade());
    }

    /// Set a pixel without depth testing.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.color_buffer[idx * 4..idx * 4 + 4].copy_from_slice(&color);
        }
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|idx| {
            let mut px = [0; 4];
            px.copy_from_slice(&self.color_buffer[idx * 4..idx * 4 + 4]);
            px
        })
    }

    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|idx| self.depth_buffer[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffers(w: usize, h: usize) -> (Vec<u8>, Vec<f32>) {
        (vec![0; w * h * 4], vec![f32::INFINITY; w * h])
    }

    #[test]
    fn nearer_fragment_wins() {
        let (mut color, mut depth) = buffers(2, 2);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 2, 2, true);
        fb.set_pixel_with_depth(1, 1, 0.5, || [1, 1, 1, 255]);
        fb.set_pixel_with_depth(1, 1, 0.9, || [2, 2, 2, 255]);
        assert_eq!(fb.get_pixel(1, 1), Some([1, 1, 1, 255]));
        fb.set_pixel_with_depth(1, 1, 0.1, || [3, 3, 3, 255]);
        assert_eq!(fb.get_pixel(1, 1), Some([3, 3, 3, 255]));
        assert_eq!(fb.depth_at(1, 1), Some(0.1));
    }

    #[test]
    fn disabled_depth_test_overwrites() {
        let (mut color, mut depth) = buffers(1, 1);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 1, 1, false);
        fb.set_pixel_with_depth(0, 0, 0.1, || [1, 0, 0, 255]);
        fb.set_pixel_with_depth(0, 0, 0.9, || [0, 1, 0, 255]);
        assert_eq!(fb.get_pixel(0, 0), Some([0, 1, 0, 255]));
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let (mut color, mut depth) = buffers(2, 2);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 2, 2, true);
        fb.set_pixel(-1, 0, [9, 9, 9, 9]);
        fb.set_pixel(0, 2, [9, 9, 9, 9]);
        fb.set_pixel_with_depth(5, 5, 0.0, || [9, 9, 9, 9]);
        assert!(color.iter().all(|&b| b == 0));
    }
}
