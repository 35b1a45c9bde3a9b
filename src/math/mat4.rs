//! 4x4 transformation matrix using column-vector convention.
//!
//! # Convention
//! - Stored row-major as `data[row][col]`
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//!
//! # Depth convention
//! Every projection here looks from the positive side of its view axis toward
//! the negative side and produces a clip-space Z that *grows with distance*
//! from the viewer. The rasterizer keeps that pre-divide Z as its depth key,
//! so "smaller is nearer" holds for every projection mode.

use std::f32::consts::FRAC_PI_4;
use std::ops::Mul;

use approx::{AbsDiffEq, RelativeEq};

use super::vec3::Vec3;
use super::vec4::Vec4;

/// Determinants smaller than this make a 3x3 block non-invertible.
const SINGULAR_EPSILON: f32 = 1e-8;

/// 4x4 matrix stored as `data[row][col]` with column-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub const fn new(data: [[f32; 4]; 4]) -> Self {
        Mat4 { data }
    }

    pub const fn identity() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Standard matrix product `a * b`. Returns a new matrix; neither input
    /// is modified.
    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        let mut result = [[0.0f32; 4]; 4];

        for (row, out) in result.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = (0..4).map(|k| a.data[row][k] * b.data[k][col]).sum();
            }
        }

        Mat4::new(result)
    }

    /// Creates a translation matrix.
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a scale matrix.
    pub fn scaling(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation around the X axis (Y turns toward Z).
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation around the Y axis (Z turns toward X).
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation around the Z axis (X turns toward Y).
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Front view (XY plane), looking from +Z.
    pub fn orthographic_front() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Top view (XZ plane), looking down from +Y. World -Z points up the
    /// screen and world Y becomes depth.
    pub fn orthographic_top() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0],
            [0.0, -1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Side view (ZY plane), looking from +X. World -Z points right on the
    /// screen and world X becomes depth.
    pub fn orthographic_side() -> Self {
        Mat4::new([
            [0.0, 0.0, -1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Symmetric-frustum perspective projection (eye at the origin looking
    /// down -Z).
    ///
    /// Produces `W = -z_eye`, so points in front of the eye have positive W.
    /// Clip Z before the divide runs from `-near` at the near plane to `far`
    /// at the far plane.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let range_inv = 1.0 / (near - far);
        Mat4::new([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (near + far) * range_inv, 2.0 * near * far * range_inv],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Cavalier oblique projection: receding axis at 45 degrees, full depth.
    pub fn oblique_cavalier() -> Self {
        Self::oblique(FRAC_PI_4, 1.0)
    }

    /// Cabinet oblique projection: receding axis at 45 degrees, half depth.
    pub fn oblique_cabinet() -> Self {
        Self::oblique(FRAC_PI_4, 0.5)
    }

    /// Shears X and Y by Z (`x + z·L·cos α`, `y + z·L·sin α`) and keeps Z as
    /// the depth axis.
    fn oblique(alpha: f32, depth_scale: f32) -> Self {
        let (s, c) = alpha.sin_cos();
        Mat4::new([
            [1.0, 0.0, depth_scale * c, 0.0],
            [0.0, 1.0, depth_scale * s, 0.0],
            [0.0, 0.0, -1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Returns the transposed matrix.
    pub fn transpose(&self) -> Self {
        let mut data = [[0.0f32; 4]; 4];
        for (row, out) in data.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = self.data[col][row];
            }
        }
        Mat4::new(data)
    }

    /// Column `index` of the upper-left 3x3 block.
    fn basis(&self, index: usize) -> Vec3 {
        Vec3::new(self.data[0][index], self.data[1][index], self.data[2][index])
    }

    /// Inverse-transpose of the upper-left 3x3 block, or `None` when that
    /// block is singular.
    ///
    /// With columns `a0, a1, a2`, the inverse-transpose has columns
    /// `(a1×a2, a2×a0, a0×a1) / det`.
    pub fn try_normal_matrix(&self) -> Option<Mat4> {
        let (a0, a1, a2) = (self.basis(0), self.basis(1), self.basis(2));
        let c0 = a1.cross(a2);
        let det = a0.dot(c0);
        if det.abs() < SINGULAR_EPSILON || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let c0 = c0 * inv_det;
        let c1 = a2.cross(a0) * inv_det;
        let c2 = a0.cross(a1) * inv_det;
        Some(Mat4::new([
            [c0.x, c1.x, c2.x, 0.0],
            [c0.y, c1.y, c2.y, 0.0],
            [c0.z, c1.z, c2.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Matrix for transforming normals; identity when the 3x3 block cannot
    /// be inverted.
    pub fn normal_matrix(&self) -> Mat4 {
        self.try_normal_matrix().unwrap_or_else(|| {
            log::warn!("transform is singular, normals left untransformed");
            Mat4::identity()
        })
    }

    /// Homogeneous transform of a point with W = 1.
    #[inline]
    pub fn transform_point4(&self, p: Vec3) -> Vec4 {
        *self * Vec4::point(p)
    }

    /// Transforms a point and drops W without dividing.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform_point4(p).to_vec3()
    }

    /// Transforms a direction (W = 0), ignoring translation.
    #[inline]
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        (*self * Vec4::direction(d)).to_vec3()
    }

    /// Applies the matrix to every stride-3 triple of a flat buffer with
    /// W = 1 and truncates the result back to three components.
    ///
    /// A trailing partial triple is ignored.
    pub fn transform_vertices(&self, vertices: &[f32]) -> Vec<f32> {
        vertices
            .chunks_exact(3)
            .flat_map(|v| self.transform_point(Vec3::new(v[0], v[1], v[2])).to_array())
            .collect()
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }
}

/// Matrix multiplication: Mat4 * Mat4.
///
/// `A * B * v` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        Mat4::multiply(&self, &rhs)
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: [f32; 4]| r[0] * v.x + r[1] * v.y + r[2] * v.z + r[3] * v.w;
        Vec4::new(
            row(self.data[0]),
            row(self.data[1]),
            row(self.data[2]),
            row(self.data[3]),
        )
    }
}

impl AbsDiffEq for Mat4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Mat4 {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
