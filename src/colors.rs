//! Linear RGB colors and the viewer's palette.
//!
//! Shading math works on [`Color`] (three `f32` channels in `[0, 1]`); the
//! frame buffers store packed RGBA8 via [`Color::to_rgba8`].

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Each channel clamped to `[0, 1]`. NaN channels become 0.
    pub fn clamped(self) -> Self {
        let c = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self::new(c(self.r), c(self.g), c(self.b))
    }

    /// Perceived brightness, used by tests and the status log.
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Opaque RGBA8 bytes.
    pub fn to_rgba8(self) -> [u8; 4] {
        let c = self.clamped();
        let q = |v: f32| (v * 255.0).round() as u8;
        [q(c.r), q(c.g), q(c.b), 255]
    }

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::new(
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
        )
    }

    /// Barycentric blend of three colors.
    #[inline]
    pub fn weighted(colors: [Color; 3], weights: [f32; 3]) -> Self {
        colors[0] * weights[0] + colors[1] * weights[1] + colors[2] * weights[2]
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

/// RGBA8 value with straight alpha, used on the overlay surface.
pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

pub const BACKGROUND: Color = Color::new(0.95, 0.95, 0.95);
pub const FACE: Color = Color::new(0.7, 0.7, 0.75);
pub const WIREFRAME: Color = Color::new(0.05, 0.05, 0.05);
pub const AXIS_X: Color = Color::new(0.9, 0.1, 0.1);
pub const AXIS_Y: Color = Color::new(0.1, 0.7, 0.1);
pub const AXIS_Z: Color = Color::new(0.1, 0.2, 0.9);
pub const LIGHT_INDICATOR: Rgba = [255, 200, 0, 230];
pub const LIGHT_OUTLINE: Rgba = [40, 40, 40, 255];

/// Alpha-blends `src` over an opaque `dst` pixel.
#[inline]
pub fn blend_over(dst: &mut [u8], src: Rgba) {
    let alpha = src[3] as u32;
    if alpha == 0 {
        return;
    }
    for i in 0..3 {
        let d = dst[i] as u32;
        let s = src[i] as u32;
        dst[i] = ((s * alpha + d * (255 - alpha) + 127) / 255) as u8;
    }
    dst[3] = 255;
}
