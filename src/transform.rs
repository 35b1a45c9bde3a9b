//! Accumulated model transform and the input gestures that drive it.
//!
//! The model matrix is never rebuilt from Euler angles; every gesture yields
//! a small incremental matrix which is composed on the left of the current
//! one, so rotations always happen about the world axes.

use crate::math::mat4::Mat4;

/// The model transform: a single matrix mutated by replacement or
/// composition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    matrix: Mat4,
}

impl Transform {
    /// Create an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Replace the whole transform.
    pub fn set(&mut self, matrix: Mat4) -> &mut Self {
        self.matrix = matrix;
        self
    }

    /// Apply `delta` after the current transform (`delta * current`).
    pub fn compose(&mut self, delta: Mat4) -> &mut Self {
        self.matrix = delta * self.matrix;
        self
    }

    pub fn reset(&mut self) -> &mut Self {
        self.matrix = Mat4::identity();
        self
    }

    /// Inverse-transpose of the rotation/scale part, identity if singular.
    pub fn normal_matrix(&self) -> Mat4 {
        self.matrix.normal_matrix()
    }
}

/// Axis key held while dragging or scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisKey {
    #[default]
    None,
    X,
    Y,
    Z,
}

/// Converts raw pointer deltas into incremental transform matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    /// Radians per pixel of drag.
    pub rotation_sensitivity: f32,
    /// World units per pixel of drag.
    pub translation_sensitivity: f32,
    /// Relative scale change per wheel notch.
    pub scale_sensitivity: f32,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 0.01,
            translation_sensitivity: 0.01,
            scale_sensitivity: 0.005,
        }
    }
}

impl Interaction {
    /// Left-button drag.
    ///
    /// With `free` (Ctrl held) the drag tumbles around X and Y at once.
    /// Otherwise the held axis key picks the rotation axis: `X` uses the
    /// vertical motion, `Y` the horizontal one, and no key spins around Z.
    pub fn rotation(&self, dx: f32, dy: f32, axis: AxisKey, free: bool) -> Mat4 {
        let s = self.rotation_sensitivity;
        if free {
            return Mat4::rotation_y(dx * s) * Mat4::rotation_x(dy * s);
        }
        match axis {
            AxisKey::X => Mat4::rotation_x(dy * s),
            AxisKey::Y => Mat4::rotation_y(dx * s),
            AxisKey::None | AxisKey::Z => Mat4::rotation_z(dx * s),
        }
    }

    /// Right-button drag. Screen Y grows downward, so vertical motion is
    /// inverted; with `Z` held, vertical motion moves along Z instead.
    pub fn translation(&self, dx: f32, dy: f32, axis: AxisKey) -> Mat4 {
        let s = self.translation_sensitivity;
        match axis {
            AxisKey::Z => Mat4::translation(dx * s, 0.0, dy * s),
            _ => Mat4::translation(dx * s, -dy * s, 0.0),
        }
    }

    /// Wheel notch. Positive `delta` (scrolling toward the user) shrinks the
    /// model; the held axis key restricts scaling to that axis.
    pub fn scaling(&self, delta: f32, axis: AxisKey) -> Mat4 {
        if delta == 0.0 {
            return Mat4::identity();
        }
        let f = 1.0 - delta.signum() * self.scale_sensitivity;
        match axis {
            AxisKey::X => Mat4::scaling(f, 1.0, 1.0),
            AxisKey::Y => Mat4::scaling(1.0, f, 1.0),
            AxisKey::Z => Mat4::scaling(1.0, 1.0, f),
            AxisKey::None => Mat4::scaling(f, f, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec3::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform::default().matrix(), Mat4::identity());
    }

    #[test]
    fn compose_applies_delta_after_current() {
        let mut t = Transform::new();
        t.compose(Mat4::scaling(2.0, 2.0, 2.0))
            .compose(Mat4::translation(1.0, 0.0, 0.0));
        // Scale first, then translate.
        let p = t.matrix().transform_point(Vec3::X);
        assert_relative_eq!(p, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn set_and_reset_replace_the_matrix() {
        let mut t = Transform::new();
        t.set(Mat4::translation(0.0, 5.0, 0.0));
        assert_eq!(t.matrix(), Mat4::translation(0.0, 5.0, 0.0));
        t.reset();
        assert_eq!(t.matrix(), Mat4::identity());
    }

    #[test]
    fn drag_without_key_spins_around_z() {
        let gesture = Interaction::default();
        let m = gesture.rotation(10.0, 50.0, AxisKey::None, false);
        assert_relative_eq!(m, Mat4::rotation_z(0.1));
    }

    #[test]
    fn axis_keys_pick_rotation_axis() {
        let gesture = Interaction::default();
        assert_relative_eq!(
            gesture.rotation(10.0, 20.0, AxisKey::X, false),
            Mat4::rotation_x(0.2)
        );
        assert_relative_eq!(
            gesture.rotation(10.0, 20.0, AxisKey::Y, false),
            Mat4::rotation_y(0.1)
        );
        assert_relative_eq!(
            gesture.rotation(10.0, 20.0, AxisKey::None, true),
            Mat4::rotation_y(0.1) * Mat4::rotation_x(0.2)
        );
    }

    #[test]
    fn right_drag_translates_with_screen_y_flipped() {
        let gesture = Interaction::default();
        let p = gesture
            .translation(100.0, 100.0, AxisKey::None)
            .transform_point(Vec3::ZERO);
        assert_relative_eq!(p, Vec3::new(1.0, -1.0, 0.0));

        let p = gesture
            .translation(0.0, 100.0, AxisKey::Z)
            .transform_point(Vec3::ZERO);
        assert_relative_eq!(p, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn wheel_scales_by_small_steps() {
        let gesture = Interaction::default();
        let m = gesture.scaling(3.0, AxisKey::None);
        assert_relative_eq!(m.get(0, 0), 0.995);
        assert_relative_eq!(m.get(2, 2), 0.995);

        let m = gesture.scaling(-1.0, AxisKey::Y);
        assert_relative_eq!(m.get(0, 0), 1.0);
        assert_relative_eq!(m.get(1, 1), 1.005);

        assert_eq!(gesture.scaling(0.0, AxisKey::Z), Mat4::identity());
    }
}
