//! Phong reflection model shared by all three shading modes.
//!
//! ```text
//! color = base*ambient + base*diffuse*max(0, N·L) + white*specular*max(0, R·V)^shininess
//! ```
//!
//! `L` points from the shaded point to the light, `V` from the shaded point
//! to the fixed view position and `R = 2(N·L)N - L`. The result is clamped
//! per channel.

use serde::{Deserialize, Serialize};

use crate::colors::Color;
use crate::math::vec3::Vec3;
use crate::projection::CAMERA_DISTANCE;

pub const AMBIENT: f32 = 0.3;
pub const DIFFUSE: f32 = 0.6;
pub const SPECULAR: f32 = 0.3;
pub const SHININESS: f32 = 32.0;

/// Where the viewer sits for specular highlights, in world space.
pub const VIEW_POSITION: Vec3 = Vec3::new(0.0, 0.0, CAMERA_DISTANCE);

pub const DEFAULT_LIGHT_POSITION: Vec3 = Vec3::new(2.0, 2.0, 3.0);

/// How lighting is evaluated across a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    /// One evaluation per triangle with the face normal.
    Flat,
    /// One evaluation per vertex, colors interpolated.
    #[default]
    Gouraud,
    /// Normals interpolated, one evaluation per pixel.
    Phong,
}

impl std::fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShadingMode::Flat => write!(f, "flat"),
            ShadingMode::Gouraud => write!(f, "gouraud"),
            ShadingMode::Phong => write!(f, "phong"),
        }
    }
}

/// A point light plus the coefficients of the reflection formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub light_position: Vec3,
    pub view_position: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new(DEFAULT_LIGHT_POSITION)
    }
}

impl Lighting {
    pub fn new(light_position: Vec3) -> Self {
        Self {
            light_position,
            view_position: VIEW_POSITION,
            ambient: AMBIENT,
            diffuse: DIFFUSE,
            specular: SPECULAR,
            shininess: SHININESS,
        }
    }

    /// Evaluates the reflection formula at `position` with surface `normal`.
    ///
    /// `normal` does not need to be unit length; a zero normal falls back to
    /// [`Vec3::UP`].
    pub fn shade(&self, position: Vec3, normal: Vec3, base: Color) -> Color {
        let n = normal.normalize();
        let l = (self.light_position - position).normalize_or(n);
        let v = (self.view_position - position).normalize_or(n);

        let n_dot_l = n.dot(l);
        let diffuse = n_dot_l.max(0.0);
        let specular = if n_dot_l > 0.0 {
            let r = l.reflect(n);
            r.dot(v).max(0.0).powf(self.shininess)
        } else {
            0.0
        };

        (base * self.ambient + base * (self.diffuse * diffuse) + Color::WHITE * (self.specular * specular))
            .clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const GREY: Color = Color::new(0.5, 0.5, 0.5);

    #[test]
    fn facing_the_light_is_brighter_than_facing_away() {
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, 5.0));
        let toward = lighting.shade(Vec3::ZERO, Vec3::Z, GREY);
        let away = lighting.shade(Vec3::ZERO, -Vec3::Z, GREY);
        assert!(toward.luminance() > away.luminance());
    }

    #[test]
    fn back_lit_surface_gets_ambient_only() {
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, 5.0));
        let c = lighting.shade(Vec3::ZERO, -Vec3::Z, GREY);
        assert_relative_eq!(c.r, 0.5 * AMBIENT, epsilon = 1e-6);
    }

    #[test]
    fn head_on_light_and_view_hits_full_highlight() {
        // Light and viewer both straight along the normal: N·L = 1, R·V = 1.
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, 10.0));
        let c = lighting.shade(Vec3::ZERO, Vec3::Z, GREY);
        let expected = 0.5 * AMBIENT + 0.5 * DIFFUSE + SPECULAR;
        assert_relative_eq!(c.g, expected, epsilon = 1e-5);
    }

    #[test]
    fn result_is_clamped() {
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, 10.0));
        let c = lighting.shade(Vec3::ZERO, Vec3::Z, Color::new(2.0, 2.0, 2.0));
        assert_eq!(c, Color::WHITE);
    }

    #[test]
    fn degenerate_normal_does_not_produce_nan() {
        let lighting = Lighting::default();
        let c = lighting.shade(Vec3::ZERO, Vec3::ZERO, GREY);
        assert!(c.r.is_finite() && c.g.is_finite() && c.b.is_finite());
    }
}
