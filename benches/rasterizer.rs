use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meshview::bench::{FlatShader, FrameBuffer, GouraudShader, ScanlineRasterizer, ScreenVertex, Triangle};
use meshview::colors::Color;
use meshview::light::ShadingMode;
use meshview::math::mat4::Mat4;
use meshview::projection::ProjectionMode;
use meshview::scene::{Scene, SceneCommand};
use meshview::{Engine, Mesh, RenderBackend};

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

struct Buffers {
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Buffers {
    fn new() -> Self {
        let pixels = (BUFFER_WIDTH * BUFFER_HEIGHT) as usize;
        Self {
            color: vec![0u8; pixels * 4],
            depth: vec![f32::INFINITY; pixels],
        }
    }

    fn view(&mut self) -> FrameBuffer<'_> {
        self.depth.fill(f32::INFINITY);
        FrameBuffer::new(&mut self.color, &mut self.depth, BUFFER_WIDTH, BUFFER_HEIGHT, true)
    }
}

fn triangle(points: [(f32, f32); 3]) -> Triangle {
    Triangle::new(points.map(|(x, y)| ScreenVertex::new(x, y, 0.5)))
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");

    let scanline = ScanlineRasterizer::new();
    let flat = FlatShader::new(Color::new(1.0, 0.0, 0.0));
    let gouraud = GouraudShader::new([
        Color::new(1.0, 0.0, 0.0),
        Color::new(0.0, 1.0, 0.0),
        Color::new(0.0, 0.0, 1.0),
    ]);

    for (name, tri) in [
        ("small", triangle([(100.0, 100.0), (120.0, 100.0), (110.0, 120.0)])),
        ("medium", triangle([(100.0, 100.0), (300.0, 100.0), (200.0, 300.0)])),
        ("large", triangle([(50.0, 50.0), (750.0, 100.0), (400.0, 550.0)])),
    ] {
        group.bench_with_input(BenchmarkId::new("flat", name), &tri, |b, tri| {
            let mut buffers = Buffers::new();
            b.iter(|| {
                let mut fb = buffers.view();
                scanline.fill_triangle(black_box(tri), &mut fb, &flat);
            });
        });

        group.bench_with_input(BenchmarkId::new("gouraud", name), &tri, |b, tri| {
            let mut buffers = Buffers::new();
            b.iter(|| {
                let mut fb = buffers.view();
                scanline.fill_triangle(black_box(tri), &mut fb, &gouraud);
            });
        });
    }

    group.finish();
}

fn benchmark_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_frame");

    let cube = Mesh::cube();
    let mut scene = Scene::new(BUFFER_WIDTH as f32 / BUFFER_HEIGHT as f32);
    scene.apply(SceneCommand::SelectProjection(ProjectionMode::perspective()));
    scene.apply(SceneCommand::ComposeTransform(
        Mat4::rotation_y(0.6) * Mat4::rotation_x(0.4),
    ));

    for mode in [ShadingMode::Flat, ShadingMode::Gouraud, ShadingMode::Phong] {
        scene.apply(SceneCommand::SetShadingMode(mode));
        group.bench_with_input(BenchmarkId::new("cube", mode), &scene, |b, scene| {
            let mut engine = Engine::new(BUFFER_WIDTH, BUFFER_HEIGHT).unwrap();
            b.iter(|| engine.render(black_box(scene), Some(&cube)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_triangle, benchmark_full_frame);
criterion_main!(benches);
