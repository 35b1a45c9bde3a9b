//! Core rendering engine.
//!
//! The [`Engine`] is the software [`RenderBackend`]: it owns the frame
//! buffers and runs the per-frame pipeline over a [`Scene`] and a [`Mesh`]:
//!
//! ```text
//! clear -> transform -> [sort + cull -> fill] -> [wireframe] -> [axes] -> [light indicator] -> compose
//! ```
//!
//! Every optional stage is controlled by the scene's [`RenderFlags`], copied
//! once when the frame starts.

use crate::backend::{BackendResult, RenderBackend};
use crate::colors::{self, Color};
use crate::config::RenderFlags;
use crate::light::{Lighting, ShadingMode};
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::mesh::Mesh;
use crate::render::{
    FlatShader, GouraudShader, LineDepth, PhongShader, Renderer, ScanlineRasterizer, ScreenVertex,
    Triangle, DEGENERATE_AREA,
};
use crate::scene::Scene;

/// Clip-space W at or below this magnitude is not divided by.
pub const W_EPSILON: f32 = 1e-4;

/// How far behind the filled surface a wireframe pixel may be and still show.
pub const WIREFRAME_DEPTH_BIAS: f32 = 1e-3;

/// A mesh vertex after the transform stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectedVertex {
    /// Pixel position and depth key.
    pub screen: ScreenVertex,
    /// Z after the perspective divide.
    pub ndc_z: f32,
    pub world: Vec3,
    /// Unit normal in world space.
    pub normal: Vec3,
    /// Lit vertex color, only filled in for Gouraud shading.
    pub color: Color,
}

/// Counters for the last rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    pub culled: usize,
    pub triangles: usize,
    pub degenerate: usize,
    pub edges: usize,
}

/// Per-frame lighting inputs, computed once.
struct Shading {
    lighting: Lighting,
    normal_matrix: Mat4,
}

pub struct Engine {
    renderer: Renderer,
    rasterizer: ScanlineRasterizer,
    projected: Vec<ProjectedVertex>,
    /// Face indices to draw this frame, in draw order.
    visible_faces: Vec<usize>,
    edges: Vec<(usize, usize)>,
    stats: FrameStats,
}

impl Engine {
    pub fn new(width: u32, height: u32) -> BackendResult<Self> {
        Ok(Self {
            renderer: Renderer::new(width, height)?,
            rasterizer: ScanlineRasterizer::new(),
            projected: Vec::new(),
            visible_faces: Vec::new(),
            edges: Vec::new(),
            stats: FrameStats::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Per-vertex output of the last transform stage.
    pub fn projected(&self) -> &[ProjectedVertex] {
        &self.projected
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Maps a clip-space position to the canvas. The divide is skipped when
    /// `|W|` is too small; the depth key is clip Z before the divide.
    fn to_screen(&self, clip: Vec4) -> (ScreenVertex, f32) {
        let ndc = clip.perspective_divide(W_EPSILON);
        let width = self.renderer.width() as f32;
        let height = self.renderer.height() as f32;
        let screen = ScreenVertex::new(
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
            clip.z,
        );
        (screen, ndc.z)
    }

    /// Clear: opaque background, depth at `+inf`, transparent overlay.
    fn clear(&mut self, scene: &Scene) {
        self.renderer.clear(scene.background.to_rgba8());
        self.renderer.clear_overlay();
    }

    /// Transform: model to world to clip to screen for every vertex.
    fn transform(&mut self, scene: &Scene, mesh: &Mesh, flags: &RenderFlags, shading: &Shading) {
        let model = scene.model();
        let Shading {
            lighting,
            normal_matrix,
        } = shading;
        let gouraud = flags.fill_faces && flags.lighting && scene.shading == ShadingMode::Gouraud;

        let mut projected = std::mem::take(&mut self.projected);
        projected.clear();
        projected.extend(
            mesh.vertices()
                .iter()
                .zip(mesh.vertex_normals())
                .map(|(&position, &normal)| {
                    let world = model.transform_point(position);
                    let (screen, ndc_z) = self.to_screen(scene.projection.transform_point4(world));
                    let normal = normal_matrix.transform_direction(normal).normalize();
                    let color = if gouraud {
                        lighting.shade(world, normal, scene.base_color)
                    } else {
                        scene.base_color
                    };
                    ProjectedVertex {
                        screen,
                        ndc_z,
                        world,
                        normal,
                        color,
                    }
                }),
        );
        self.projected = projected;
    }

    /// Face ordering and culling. Only runs when faces are filled; otherwise
    /// every face stays visible in mesh order.
    fn order_faces(&mut self, mesh: &Mesh, flags: &RenderFlags) {
        self.visible_faces.clear();
        self.visible_faces.extend(0..mesh.faces().len());
        if !flags.fill_faces {
            return;
        }

        let projected = &self.projected;
        let average_depth = |face: usize| {
            let indices = mesh.faces()[face].indices();
            indices.iter().map(|&i| projected[i].screen.z).sum::<f32>() / indices.len() as f32
        };
        let mut keyed: Vec<(usize, f32)> = self
            .visible_faces
            .iter()
            .map(|&f| (f, average_depth(f)))
            .collect();
        // Farthest first.
        keyed.sort_by(|a, b| b.1.total_cmp(&a.1));

        self.visible_faces.clear();
        for (face, _) in keyed {
            if flags.backface_culling {
                let indices = mesh.faces()[face].indices();
                let area = crate::render::signed_area(
                    projected[indices[0]].screen,
                    projected[indices[1]].screen,
                    projected[indices[2]].screen,
                );
                if area < 0.0 {
                    self.stats.culled += 1;
                    continue;
                }
            }
            self.visible_faces.push(face);
        }
    }

    /// Fill: fan-triangulate every visible face and scan-convert it.
    fn fill_faces(&mut self, scene: &Scene, mesh: &Mesh, flags: &RenderFlags, shading: &Shading) {
        let Shading {
            lighting,
            normal_matrix,
        } = shading;
        let base = scene.base_color;
        let mut fb = self.renderer.as_framebuffer(flags.z_buffer);

        for &face_index in &self.visible_faces {
            let face = &mesh.faces()[face_index];
            let face_normal = normal_matrix
                .transform_direction(mesh.face_normals()[face_index])
                .normalize();

            for [a, b, c] in face.triangles() {
                let [pa, pb, pc] = [self.projected[a], self.projected[b], self.projected[c]];
                let triangle = Triangle::new([pa.screen, pb.screen, pc.screen]);
                self.stats.triangles += 1;

                let degenerate = triangle.signed_area().abs() < DEGENERATE_AREA;
                if degenerate {
                    self.stats.degenerate += 1;
                }

                if !flags.lighting {
                    self.rasterizer
                        .fill_triangle(&triangle, &mut fb, &FlatShader::new(base));
                    continue;
                }

                if degenerate || scene.shading == ShadingMode::Flat {
                    let centroid = (pa.world + pb.world + pc.world) / 3.0;
                    let color = lighting.shade(centroid, face_normal, base);
                    self.rasterizer
                        .fill_triangle(&triangle, &mut fb, &FlatShader::new(color));
                    continue;
                }

                match scene.shading {
                    ShadingMode::Gouraud => {
                        let shader = GouraudShader::new([pa.color, pb.color, pc.color]);
                        self.rasterizer.fill_triangle(&triangle, &mut fb, &shader);
                    }
                    ShadingMode::Phong => {
                        let shader = PhongShader::new(
                            lighting,
                            [pa.world, pb.world, pc.world],
                            [pa.normal, pb.normal, pc.normal],
                            base,
                        );
                        self.rasterizer.fill_triangle(&triangle, &mut fb, &shader);
                    }
                    ShadingMode::Flat => {}
                }
            }
        }
    }

    /// Wireframe: each unique undirected edge of the visible faces, once.
    fn draw_wireframe(&mut self, mesh: &Mesh, flags: &RenderFlags) {
        self.edges.clear();
        for &face in &self.visible_faces {
            self.edges.extend(
                mesh.faces()[face]
                    .edges()
                    .map(|(a, b)| if a < b { (a, b) } else { (b, a) }),
            );
        }
        self.edges.sort_unstable();
        self.edges.dedup();
        self.stats.edges = self.edges.len();

        let depth = if flags.fill_faces {
            LineDepth::HiddenLine {
                bias: WIREFRAME_DEPTH_BIAS,
            }
        } else {
            LineDepth::Ignore
        };
        let color = colors::WIREFRAME.to_rgba8();
        for &(a, b) in &self.edges {
            self.renderer
                .draw_line(self.projected[a].screen, self.projected[b].screen, color, depth);
        }
    }

    /// World axes, transformed by the projection only.
    fn draw_axes(&mut self, projection: &Mat4) {
        let (origin, _) = self.to_screen(projection.transform_point4(Vec3::ZERO));
        for (axis, color) in [
            (Vec3::X, colors::AXIS_X),
            (Vec3::Y, colors::AXIS_Y),
            (Vec3::Z, colors::AXIS_Z),
        ] {
            let (tip, _) = self.to_screen(projection.transform_point4(axis));
            self.renderer
                .draw_line(origin, tip, color.to_rgba8(), LineDepth::Ignore);
        }
    }

    fn draw_light_indicator(&mut self, scene: &Scene) {
        let (at, _) = self.to_screen(scene.projection.transform_point4(scene.light_position));
        self.renderer.draw_light_glyph(at.x, at.y);
    }
}

impl RenderBackend for Engine {
    fn name(&self) -> &'static str {
        "software"
    }

    fn resize(&mut self, width: u32, height: u32) -> BackendResult<()> {
        self.renderer.resize(width, height)?;
        log::info!("resized frame buffers to {}x{}", width, height);
        Ok(())
    }

    fn render(&mut self, scene: &Scene, mesh: Option<&Mesh>) -> BackendResult<()> {
        let flags = scene.flags;
        let shading = Shading {
            lighting: scene.lighting(),
            normal_matrix: scene.transform.normal_matrix(),
        };
        self.stats = FrameStats::default();

        self.clear(scene);
        self.projected.clear();
        self.visible_faces.clear();

        if let Some(mesh) = mesh.filter(|m| !m.is_empty()) {
            self.stats.faces = mesh.faces().len();
            self.transform(scene, mesh, &flags, &shading);
            self.order_faces(mesh, &flags);
            if flags.fill_faces {
                self.fill_faces(scene, mesh, &flags, &shading);
            }
            if flags.show_wireframe {
                self.draw_wireframe(mesh, &flags);
            }
        }

        if flags.show_axes {
            self.draw_axes(&scene.projection);
        }
        if flags.show_light_indicator {
            self.draw_light_indicator(scene);
        }
        self.renderer.compose();

        log::debug!(
            "frame {}x{}: {} faces, {} culled, {} triangles ({} degenerate), {} edges",
            self.width(),
            self.height(),
            self.stats.faces,
            self.stats.culled,
            self.stats.triangles,
            self.stats.degenerate,
            self.stats.edges
        );
        Ok(())
    }

    fn frame(&self) -> &[u8] {
        self.renderer.frame()
    }

    fn size(&self) -> (u32, u32) {
        (self.renderer.width(), self.renderer.height())
    }
}
