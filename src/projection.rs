//! Projection modes selectable from the viewer.
//!
//! [`ProjectionMode`] is the single source of truth for which projection is
//! active. [`ProjectionMode::matrix`] turns it into the matrix the scene
//! stores; selecting a mode always replaces that matrix wholesale.

use serde::{Deserialize, Serialize};

use crate::math::mat4::Mat4;

/// Distance from the eye to the origin in perspective mode. Normalized meshes
/// span `[-1, 1]`, so this keeps the whole model in front of the eye.
pub const CAMERA_DISTANCE: f32 = 3.0;

pub const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionMode {
    /// No projection at all; model coordinates are used as clip coordinates.
    Identity,
    #[default]
    OrthographicFront,
    OrthographicTop,
    OrthographicSide,
    /// Symmetric frustum looking at the origin from `+Z`.
    Perspective { fov_y: f32, near: f32, far: f32 },
    Cavalier,
    Cabinet,
}

impl ProjectionMode {
    /// Perspective with the default field of view and clip planes.
    pub fn perspective() -> Self {
        ProjectionMode::Perspective {
            fov_y: DEFAULT_FOV_Y,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    /// The mode bound to number key `n` in the viewer (1-based).
    pub fn from_index(n: usize) -> Option<Self> {
        Some(match n {
            1 => ProjectionMode::OrthographicFront,
            2 => ProjectionMode::OrthographicTop,
            3 => ProjectionMode::OrthographicSide,
            4 => Self::perspective(),
            5 => ProjectionMode::Cavalier,
            6 => ProjectionMode::Cabinet,
            7 => ProjectionMode::Identity,
            _ => return None,
        })
    }

    pub fn is_parallel(&self) -> bool {
        !matches!(self, ProjectionMode::Perspective { .. })
    }

    /// Builds the full projection matrix for a canvas with the given aspect
    /// ratio (width / height).
    ///
    /// Parallel modes are squeezed along the longer screen axis so a unit
    /// square stays square. Perspective pulls the eye back by
    /// [`CAMERA_DISTANCE`].
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };

        match *self {
            ProjectionMode::Perspective { fov_y, near, far } => {
                Mat4::perspective(fov_y, aspect, near, far)
                    * Mat4::translation(0.0, 0.0, -CAMERA_DISTANCE)
            }
            ProjectionMode::Identity => Mat4::identity(),
            parallel => aspect_correction(aspect) * parallel.base_matrix(),
        }
    }

    fn base_matrix(&self) -> Mat4 {
        match self {
            ProjectionMode::OrthographicFront => Mat4::orthographic_front(),
            ProjectionMode::OrthographicTop => Mat4::orthographic_top(),
            ProjectionMode::OrthographicSide => Mat4::orthographic_side(),
            ProjectionMode::Cavalier => Mat4::oblique_cavalier(),
            ProjectionMode::Cabinet => Mat4::oblique_cabinet(),
            ProjectionMode::Identity | ProjectionMode::Perspective { .. } => Mat4::identity(),
        }
    }
}

fn aspect_correction(aspect: f32) -> Mat4 {
    if aspect >= 1.0 {
        Mat4::scaling(1.0 / aspect, 1.0, 1.0)
    } else {
        Mat4::scaling(1.0, aspect, 1.0)
    }
}

impl std::fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionMode::Identity => write!(f, "identity"),
            ProjectionMode::OrthographicFront => write!(f, "orthographic front"),
            ProjectionMode::OrthographicTop => write!(f, "orthographic top"),
            ProjectionMode::OrthographicSide => write!(f, "orthographic side"),
            ProjectionMode::Perspective { fov_y, .. } => {
                write!(f, "perspective ({:.0} deg)", fov_y.to_degrees())
            }
            ProjectionMode::Cavalier => write!(f, "oblique cavalier"),
            ProjectionMode::Cabinet => write!(f, "oblique cabinet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec3::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn square_canvas_leaves_parallel_views_unscaled() {
        let m = ProjectionMode::OrthographicFront.matrix(1.0);
        assert_eq!(m, Mat4::orthographic_front());
    }

    #[test]
    fn wide_canvas_squeezes_x() {
        let m = ProjectionMode::OrthographicFront.matrix(2.0);
        assert_relative_eq!(m.transform_point(Vec3::X).x, 0.5);
        assert_relative_eq!(m.transform_point(Vec3::Y).y, 1.0);
    }

    #[test]
    fn perspective_places_origin_in_front_of_eye() {
        let clip = ProjectionMode::perspective()
            .matrix(1.0)
            .transform_point4(Vec3::ZERO);
        assert_relative_eq!(clip.w, CAMERA_DISTANCE);
        // The whole normalized cube is in front of the eye.
        let corner = ProjectionMode::perspective()
            .matrix(1.0)
            .transform_point4(Vec3::ONE);
        assert!(corner.w > 0.0);
    }

    #[test]
    fn number_keys_cover_every_mode() {
        let modes: Vec<_> = (1..=7).filter_map(ProjectionMode::from_index).collect();
        assert_eq!(modes.len(), 7);
        assert!(ProjectionMode::from_index(8).is_none());
        assert!(!ProjectionMode::perspective().is_parallel());
    }

    #[test]
    fn invalid_aspect_is_treated_as_square() {
        assert_eq!(
            ProjectionMode::Cabinet.matrix(0.0),
            ProjectionMode::Cabinet.matrix(1.0)
        );
    }
}
