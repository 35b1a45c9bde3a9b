//! Everything a frame depends on, other than the mesh itself.
//!
//! The viewer never reaches into the renderer to change state; it builds a
//! [`SceneCommand`] and applies it here. Rendering reads the scene and
//! nothing else.

use crate::colors::{self, Color};
use crate::config::{RenderFlag, RenderFlags};
use crate::light::{Lighting, ShadingMode, DEFAULT_LIGHT_POSITION};
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::projection::ProjectionMode;
use crate::transform::Transform;

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub transform: Transform,
    pub projection: Mat4,
    pub projection_mode: ProjectionMode,
    pub flags: RenderFlags,
    pub shading: ShadingMode,
    pub base_color: Color,
    pub light_position: Vec3,
    pub background: Color,
    aspect: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// A discrete state change requested by the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCommand {
    SetTransform(Mat4),
    /// `new = delta * current`
    ComposeTransform(Mat4),
    /// Overrides the projection matrix without changing the selected mode.
    SetProjection(Mat4),
    SelectProjection(ProjectionMode),
    SetFlag(RenderFlag, bool),
    ToggleFlag(RenderFlag),
    SetBaseColor(Color),
    SetLightPosition(Vec3),
    SetShadingMode(ShadingMode),
    ResetTransform,
}

impl Scene {
    /// A scene with default state for a canvas of the given aspect ratio.
    pub fn new(aspect: f32) -> Self {
        let projection_mode = ProjectionMode::default();
        Self {
            transform: Transform::new(),
            projection: projection_mode.matrix(aspect),
            projection_mode,
            flags: RenderFlags::default(),
            shading: ShadingMode::default(),
            base_color: colors::FACE,
            light_position: DEFAULT_LIGHT_POSITION,
            background: colors::BACKGROUND,
            aspect,
        }
    }

    pub fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::SetTransform(m) => {
                self.transform.set(m);
            }
            SceneCommand::ComposeTransform(delta) => {
                self.transform.compose(delta);
            }
            SceneCommand::ResetTransform => {
                self.transform.reset();
            }
            SceneCommand::SetProjection(m) => self.projection = m,
            SceneCommand::SelectProjection(mode) => self.select_projection(mode),
            SceneCommand::SetFlag(flag, value) => self.flags.set(flag, value),
            SceneCommand::ToggleFlag(flag) => {
                let value = !self.flags.get(flag);
                self.flags.set(flag, value);
            }
            SceneCommand::SetBaseColor(color) => self.base_color = color.clamped(),
            SceneCommand::SetLightPosition(position) => self.light_position = position,
            SceneCommand::SetShadingMode(mode) => self.shading = mode,
        }
    }

    /// Selects a projection mode and replaces the projection matrix with it.
    pub fn select_projection(&mut self, mode: ProjectionMode) {
        self.projection_mode = mode;
        self.projection = mode.matrix(self.aspect);
    }

    /// Updates the canvas aspect ratio and rebuilds the projection for the
    /// selected mode.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection = self.projection_mode.matrix(aspect);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn model(&self) -> Mat4 {
        self.transform.matrix()
    }

    pub fn lighting(&self) -> Lighting {
        Lighting::new(self.light_position)
    }
}
