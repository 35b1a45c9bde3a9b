//! 3D vector used for positions, directions and normals.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use approx::{AbsDiffEq, RelativeEq};

/// Lengths below this are treated as zero when normalizing.
pub const NORMAL_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);
    /// Fallback normal for degenerate geometry.
    pub const UP: Self = Self::Y;

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Reads the triple starting at `index * 3` of a flat buffer.
    #[inline]
    pub fn from_slice(buffer: &[f32], index: usize) -> Self {
        let i = index * 3;
        Self::new(buffer[i], buffer[i + 1], buffer[i + 2])
    }

    pub fn magnitude(&self) -> f32 {
        self.dot(*self).sqrt()
    }

    /// Unit vector in the same direction, or `fallback` when the length is
    /// below [`NORMAL_EPSILON`].
    pub fn normalize_or(&self, fallback: Vec3) -> Self {
        let magnitude = self.magnitude();
        if magnitude < NORMAL_EPSILON || !magnitude.is_finite() {
            fallback
        } else {
            *self / magnitude
        }
    }

    /// Unit vector, falling back to [`Vec3::UP`] for zero-length input.
    pub fn normalize(&self) -> Self {
        self.normalize_or(Self::UP)
    }

    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the cross product of two vectors.
    /// The resulting vector is perpendicular to both input vectors.
    pub fn cross(&self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Reflects `self` (pointing away from the surface) about `normal`:
    /// `2(N·L)N - L`.
    pub fn reflect(&self, normal: Vec3) -> Self {
        normal * (2.0 * normal.dot(*self)) - *self
    }

    pub fn min(&self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(&self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn max_component(&self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    /// Weighted sum of three vectors, used for barycentric interpolation.
    #[inline]
    pub fn weighted(values: [Vec3; 3], weights: [f32; 3]) -> Self {
        values[0] * weights[0] + values[1] * weights[1] + values[2] * weights[2]
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Component-wise addition of two vectors.
impl Add<Vec3> for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign<Vec3> for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

/// Component-wise subtraction of two vectors.
impl Sub<Vec3> for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Scalar multiplication of a vector.
impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Scalar division of a vector.
impl Div<f32> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Negation of a vector.
impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl AbsDiffEq for Vec3 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl RelativeEq for Vec3 {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_zero_falls_back_to_up() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::UP);
        assert_eq!(Vec3::new(1e-6, 0.0, 0.0).normalize(), Vec3::UP);
    }

    #[test]
    fn normalize_produces_unit_length() {
        let n = Vec3::new(3.0, 4.0, 12.0).normalize();
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn reflect_about_normal() {
        // Light straight along the normal reflects onto itself.
        let n = Vec3::Z;
        assert_relative_eq!(Vec3::Z.reflect(n), Vec3::Z, epsilon = 1e-6);

        // 45 degree incidence mirrors across the normal.
        let l = Vec3::new(1.0, 0.0, 1.0).normalize();
        let r = l.reflect(n);
        assert_relative_eq!(r, Vec3::new(-1.0, 0.0, 1.0).normalize(), epsilon = 1e-6);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
    }
}
