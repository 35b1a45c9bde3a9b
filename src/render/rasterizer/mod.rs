//! Triangle rasterization.
//!
//! Screen-space triangles are filled by [`ScanlineRasterizer`]; the colour of
//! each covered pixel comes from a [`PixelShader`] fed with barycentric
//! weights computed by [`barycentric`].
//!
//! # Edge Function
//!
//! For an edge from point A to point B, the edge function at point P is the
//! 2D cross product `(B - A) × (P - A)`:
//!
//! ```text
//! E(P) = (B.x - A.x) * (P.y - A.y) - (B.y - A.y) * (P.x - A.x)
//! ```
//!
//! The edge function values of the three edges, divided by the value for
//! the whole triangle, are the barycentric weights of P.

mod scanline;
pub mod shader;

pub use scanline::ScanlineRasterizer;
pub use shader::{FlatShader, GouraudShader, PhongShader, PixelShader};

/// Triangles whose screen area is below this are not shaded per pixel.
pub const DEGENERATE_AREA: f32 = 1e-4;

/// A vertex after projection: pixel position plus its depth key.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    /// Clip-space Z before the perspective divide. Smaller is nearer.
    pub z: f32,
}

impl ScreenVertex {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A triangle ready for rasterization in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub points: [ScreenVertex; 3],
}

impl Triangle {
    pub fn new(points: [ScreenVertex; 3]) -> Self {
        Self { points }
    }

    /// Signed area in a y-up frame. Positive when the vertices appear
    /// counter-clockwise on screen (front-facing).
    pub fn signed_area(&self) -> f32 {
        let [a, b, c] = self.points;
        signed_area(a, b, c)
    }

    pub fn barycentric(&self, x: f32, y: f32) -> Option<[f32; 3]> {
        let [a, b, c] = self.points;
        barycentric(x, y, a, b, c)
    }
}

#[inline]
pub fn edge_function(a: ScreenVertex, b: ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Signed screen-space area of `abc`, positive for counter-clockwise winding
/// as seen on screen. Screen Y grows downward, so the raw edge function is
/// negated.
#[inline]
pub fn signed_area(a: ScreenVertex, b: ScreenVertex, c: ScreenVertex) -> f32 {
    -0.5 * edge_function(a, b, c.x, c.y)
}

/// Barycentric weights of `(px, py)` with respect to `abc`.
///
/// Returns `None` when the triangle's area is below [`DEGENERATE_AREA`].
/// Weights always sum to one; they are all in `[0, 1]` only for points inside
/// the triangle.
#[inline]
pub fn barycentric(
    px: f32,
    py: f32,
    a: ScreenVertex,
    b: ScreenVertex,
    c: ScreenVertex,
) -> Option<[f32; 3]> {
    let area = edge_function(a, b, c.x, c.y);
    if (0.5 * area).abs() < DEGENERATE_AREA {
        return None;
    }
    let w0 = edge_function(b, c, px, py) / area;
    let w1 = edge_function(c, a, px, py) / area;
    Some([w0, w1, 1.0 - w0 - w1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(x: f32, y: f32) -> ScreenVertex {
        ScreenVertex::new(x, y, 0.0)
    }

    #[test]
    fn weights_partition_unity_inside() {
        let (a, b, c) = (v(10.0, 10.0), v(90.0, 20.0), v(40.0, 80.0));
        for &(px, py) in &[(40.0, 30.0), (45.5, 40.25), (30.0, 25.0), (60.0, 30.0)] {
            let w = barycentric(px, py, a, b, c).unwrap();
            assert_relative_eq!(w[0] + w[1] + w[2], 1.0, epsilon = 1e-5);
            for wi in w {
                assert!((0.0..=1.0).contains(&wi), "weight {wi} out of range");
            }
        }
    }

    #[test]
    fn weights_at_vertices_are_one_hot() {
        let (a, b, c) = (v(0.0, 0.0), v(10.0, 0.0), v(0.0, 10.0));
        let w = barycentric(10.0, 0.0, a, b, c).unwrap();
        assert_relative_eq!(w[1], 1.0, epsilon = 1e-6);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn collinear_triangle_is_degenerate() {
        assert!(barycentric(1.0, 1.0, v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0)).is_none());
    }

    #[test]
    fn screen_winding_sign() {
        // Counter-clockwise on screen (y down): right, then up.
        let ccw = Triangle::new([v(0.0, 10.0), v(10.0, 10.0), v(0.0, 0.0)]);
        assert!(ccw.signed_area() > 0.0);
        let cw = Triangle::new([v(0.0, 10.0), v(0.0, 0.0), v(10.0, 10.0)]);
        assert!(cw.signed_area() < 0.0);
        assert_relative_eq!(ccw.signed_area(), 50.0);
    }
}
