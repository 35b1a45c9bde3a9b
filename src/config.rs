//! Render flags and the viewer's TOML configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::colors::{self, Color};
use crate::light::{ShadingMode, DEFAULT_LIGHT_POSITION};
use crate::math::vec3::Vec3;
use crate::projection::ProjectionMode;
use crate::scene::Scene;

/// Which optional pipeline stages run. Copied once at the start of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderFlags {
    pub fill_faces: bool,
    pub show_wireframe: bool,
    pub lighting: bool,
    pub backface_culling: bool,
    pub z_buffer: bool,
    pub show_axes: bool,
    pub show_light_indicator: bool,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            fill_faces: true,
            show_wireframe: false,
            lighting: true,
            backface_culling: true,
            z_buffer: true,
            show_axes: true,
            show_light_indicator: true,
        }
    }
}

/// Names a single field of [`RenderFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFlag {
    FillFaces,
    Wireframe,
    Lighting,
    BackfaceCulling,
    ZBuffer,
    Axes,
    LightIndicator,
}

impl RenderFlags {
    pub fn get(&self, flag: RenderFlag) -> bool {
        match flag {
            RenderFlag::FillFaces => self.fill_faces,
            RenderFlag::Wireframe => self.show_wireframe,
            RenderFlag::Lighting => self.lighting,
            RenderFlag::BackfaceCulling => self.backface_culling,
            RenderFlag::ZBuffer => self.z_buffer,
            RenderFlag::Axes => self.show_axes,
            RenderFlag::LightIndicator => self.show_light_indicator,
        }
    }

    pub fn set(&mut self, flag: RenderFlag, value: bool) {
        let slot = match flag {
            RenderFlag::FillFaces => &mut self.fill_faces,
            RenderFlag::Wireframe => &mut self.show_wireframe,
            RenderFlag::Lighting => &mut self.lighting,
            RenderFlag::BackfaceCulling => &mut self.backface_culling,
            RenderFlag::ZBuffer => &mut self.z_buffer,
            RenderFlag::Axes => &mut self.show_axes,
            RenderFlag::LightIndicator => &mut self.show_light_indicator,
        };
        *slot = value;
    }

    /// Culling only applies when faces are filled.
    pub fn culls(&self) -> bool {
        self.fill_faces && self.backface_culling
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Startup settings for the viewer binary.
///
/// Every field is optional in the file; missing ones keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub base_color: Color,
    pub light_position: [f32; 3],
    pub shading: ShadingMode,
    pub projection: ProjectionMode,
    pub flags: RenderFlags,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: colors::BACKGROUND,
            base_color: colors::FACE,
            light_position: DEFAULT_LIGHT_POSITION.to_array(),
            shading: ShadingMode::default(),
            projection: ProjectionMode::default(),
            flags: RenderFlags::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// The initial scene described by this configuration.
    pub fn scene(&self) -> Scene {
        let mut scene = Scene::new(self.width as f32 / self.height.max(1) as f32);
        scene.background = self.background;
        scene.base_color = self.base_color.clamped();
        scene.light_position = Vec3::from(self.light_position);
        scene.shading = self.shading;
        scene.flags = self.flags;
        scene.select_projection(self.projection);
        scene
    }
}
