//! Render backend abstraction.
//!
//! A [`Scene`] plus an optional [`Mesh`] is everything a backend needs to
//! produce a frame. The software [`Engine`] is the only backend that draws;
//! the hardware path is recognised so it can be reported as unsupported
//! instead of silently falling back.

use std::path::Path;

use crate::engine::Engine;
use crate::mesh::Mesh;
use crate::scene::Scene;

/// Errors that end a rendering session. Geometry problems never show up
/// here; they are patched over inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot allocate frame buffers for {width}x{height}")]
    Allocation { width: u32, height: u32 },

    #[error("render backend not supported: {0}")]
    UnsupportedBackend(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("snapshot failed: {0}")]
    Snapshot(#[from] image::ImageError),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Interface shared by every renderer that consumes a [`Scene`].
pub trait RenderBackend {
    fn name(&self) -> &'static str;

    /// Reallocates the output for a new canvas size.
    fn resize(&mut self, width: u32, height: u32) -> BackendResult<()>;

    /// Renders one complete frame. With no mesh the frame still gets its
    /// background and overlays.
    fn render(&mut self, scene: &Scene, mesh: Option<&Mesh>) -> BackendResult<()>;

    /// The last composed frame, RGBA8, row-major, top row first.
    fn frame(&self) -> &[u8];

    fn size(&self) -> (u32, u32);

    fn snapshot(&self) -> Frame<'_> {
        let (width, height) = self.size();
        Frame::new(self.frame(), width, height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Software,
    Hardware,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Software => write!(f, "software"),
            BackendKind::Hardware => write!(f, "hardware"),
        }
    }
}

/// Creates the backend for `kind` with a canvas of `width` x `height`.
pub fn create_backend(
    kind: BackendKind,
    width: u32,
    height: u32,
) -> BackendResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Software => {
            let engine = Engine::new(width, height)?;
            log::info!("created {} backend at {}x{}", engine.name(), width, height);
            Ok(Box::new(engine))
        }
        BackendKind::Hardware => {
            log::warn!("hardware backend requested but not available");
            Err(RenderError::UnsupportedBackend(kind.to_string()))
        }
    }
}

/// A borrowed RGBA8 frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pixels: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    pub fn new(pixels: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Writes the frame as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> BackendResult<()> {
        image::save_buffer_with_format(
            path.as_ref(),
            self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        log::info!("wrote snapshot to {}", path.as_ref().display());
        Ok(())
    }
}
