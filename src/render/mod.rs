//! Rendering internals: frame buffers, line drawing and triangle fills.

pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;

pub use framebuffer::FrameBuffer;
pub use rasterizer::{
    barycentric, edge_function, signed_area, FlatShader, GouraudShader, PhongShader, PixelShader,
    ScanlineRasterizer, ScreenVertex, Triangle, DEGENERATE_AREA,
};
pub use renderer::{LineDepth, Renderer};
