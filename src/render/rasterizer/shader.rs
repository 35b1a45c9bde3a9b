//! Pixel shaders for triangle rasterization.
//!
//! The scanline rasterizer decides which pixels a triangle covers and
//! whether they survive the depth test; a [`PixelShader`] decides what color
//! they get. Each shading mode of the viewer maps to one shader here.
//!
//! # Barycentric Coordinates
//!
//! The `lambda` parameter contains three weights `[λ₀, λ₁, λ₂]` summing to
//! one, used to interpolate any per-vertex attribute:
//! `attr_at_pixel = λ₀*attr₀ + λ₁*attr₁ + λ₂*attr₂`

use crate::colors::{Color, Rgba};
use crate::light::Lighting;
use crate::math::vec3::Vec3;

/// Trait for per-pixel shading computations.
pub trait PixelShader {
    /// Compute the color for a pixel given its barycentric coordinates.
    fn shade(&self, lambda: [f32; 3]) -> Rgba;
}

/// Returns a constant color for all pixels.
///
/// Used for flat shading, unlit rendering, and triangles too thin to
/// interpolate across.
pub struct FlatShader {
    color: Rgba,
}

impl FlatShader {
    pub fn new(color: Color) -> Self {
        Self {
            color: color.to_rgba8(),
        }
    }
}

impl PixelShader for FlatShader {
    #[inline]
    fn shade(&self, _lambda: [f32; 3]) -> Rgba {
        self.color
    }
}

/// Interpolates lit vertex colors.
pub struct GouraudShader {
    colors: [Color; 3],
}

impl GouraudShader {
    pub fn new(colors: [Color; 3]) -> Self {
        Self { colors }
    }
}

impl PixelShader for GouraudShader {
    #[inline]
    fn shade(&self, lambda: [f32; 3]) -> Rgba {
        Color::weighted(self.colors, lambda).to_rgba8()
    }
}

/// Interpolates normals and world positions and evaluates the lighting
/// model at every pixel.
pub struct PhongShader<'a> {
    lighting: &'a Lighting,
    positions: [Vec3; 3],
    normals: [Vec3; 3],
    base: Color,
}

impl<'a> PhongShader<'a> {
    pub fn new(lighting: &'a Lighting, positions: [Vec3; 3], normals: [Vec3; 3], base: Color) -> Self {
        Self {
            lighting,
            positions,
            normals,
            base,
        }
    }
}

impl PixelShader for PhongShader<'_> {
    #[inline]
    fn shade(&self, lambda: [f32; 3]) -> Rgba {
        let position = Vec3::weighted(self.positions, lambda);
        // `shade` re-normalizes the interpolated normal.
        let normal = Vec3::weighted(self.normals, lambda);
        self.lighting.shade(position, normal, self.base).to_rgba8()
    }
}
