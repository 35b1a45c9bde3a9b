//! A 3D model viewer built around a CPU scanline rasterizer.
//!
//! SDL2 is used only for the window and for presenting finished frames; all
//! transformation, culling, shading and depth testing happens on the CPU.
//!
//! # Quick Start
//!
//! ```ignore
//! use meshview::prelude::*;
//!
//! let mesh = Mesh::from_obj("teapot.obj")?;
//! let mut scene = Scene::new(800.0 / 600.0);
//! scene.apply(SceneCommand::SelectProjection(ProjectionMode::perspective()));
//!
//! let mut backend = create_backend(BackendKind::Software, 800, 600)?;
//! backend.render(&scene, Some(&mesh))?;
//! backend.snapshot().save_png("teapot.png")?;
//! ```

// Public API - exposed to library consumers
pub mod backend;
pub mod colors;
pub mod config;
pub mod engine;
pub mod light;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod scene;
pub mod transform;
pub mod window;

// Internal modules - used within the crate only
pub(crate) mod render;

// Re-export commonly needed types at crate root for convenience
pub use backend::{create_backend, BackendKind, RenderBackend, RenderError};
pub use engine::Engine;
pub use mesh::{LoadError, Mesh};
pub use scene::{Scene, SceneCommand};

/// Prelude module for convenient imports.
pub mod prelude {
    // Backends
    pub use crate::backend::{create_backend, BackendKind, Frame, RenderBackend, RenderError};
    pub use crate::engine::Engine;

    // Scene state
    pub use crate::colors::Color;
    pub use crate::config::{RenderFlag, RenderFlags, ViewerConfig};
    pub use crate::light::ShadingMode;
    pub use crate::projection::ProjectionMode;
    pub use crate::scene::{Scene, SceneCommand};
    pub use crate::transform::{AxisKey, Interaction, Transform};

    // Mesh
    pub use crate::mesh::{Mesh, MeshData};

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{
        FlatShader, FrameBuffer, GouraudShader, ScanlineRasterizer, ScreenVertex, Triangle,
    };
}
