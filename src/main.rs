use std::path::PathBuf;

use clap::Parser;

use meshview::backend::{create_backend, BackendKind, RenderBackend};
use meshview::config::ViewerConfig;
use meshview::math::vec3::Vec3;
use meshview::mesh::Mesh;
use meshview::scene::{Scene, SceneCommand};
use meshview::window::{Window, WindowEvent};

/// Interactive 3D model viewer with a CPU scanline rasterizer.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Opts {
    /// OBJ file to display (a unit cube when omitted)
    #[clap(value_name = "OBJ")]
    model: Option<PathBuf>,

    /// TOML file with startup settings
    #[clap(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Canvas width, overrides the config file
    #[clap(short, long, value_name = "PIXELS")]
    width: Option<u32>,

    /// Canvas height, overrides the config file
    #[clap(short = 'H', long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Render a single frame to this PNG file and exit
    #[clap(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,
}

fn load_config(opts: &Opts) -> Result<ViewerConfig, String> {
    let mut config = match &opts.config {
        Some(path) => ViewerConfig::load_from_file(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?,
        None => ViewerConfig::default(),
    };
    if let Some(width) = opts.width {
        config.width = width;
    }
    if let Some(height) = opts.height {
        config.height = height;
    }
    config.width = config.width.max(1);
    config.height = config.height.max(1);
    Ok(config)
}

fn load_mesh(path: Option<&PathBuf>) -> Result<Mesh, String> {
    let mesh = match path {
        Some(path) => Mesh::from_obj(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => Mesh::cube(),
    };
    let stats = mesh.stats();
    log::info!(
        "loaded mesh: {} vertices, {} faces, {} normals, dimensions {:.3} x {:.3} x {:.3}",
        stats.vertex_count,
        stats.face_count,
        stats.normal_count,
        stats.dimensions.x,
        stats.dimensions.y,
        stats.dimensions.z
    );
    Ok(mesh)
}

fn snapshot_path(counter: &mut u32) -> PathBuf {
    *counter += 1;
    PathBuf::from(format!("meshview-{:03}.png", counter))
}

fn run_interactive(config: &ViewerConfig, mut scene: Scene, mesh: Mesh) -> Result<(), String> {
    let mut window =
        Window::new("meshview", config.width, config.height).map_err(|e| e.to_string())?;
    let mut backend = create_backend(BackendKind::Software, config.width, config.height)
        .map_err(|e| e.to_string())?;
    let mut snapshots = 0;

    backend
        .render(&scene, Some(&mesh))
        .map_err(|e| e.to_string())?;
    window.present(backend.frame()).map_err(|e| e.to_string())?;

    'running: loop {
        let mut dirty = false;
        for event in window.wait_events() {
            match event {
                WindowEvent::Quit => break 'running,
                WindowEvent::Resize(w, h) => {
                    backend.resize(w, h).map_err(|e| e.to_string())?;
                    window.resize(w, h).map_err(|e| e.to_string())?;
                    scene.set_aspect(w as f32 / h as f32);
                    dirty = true;
                }
                WindowEvent::Command(command) => {
                    scene.apply(command);
                    dirty = true;
                }
                WindowEvent::MoveLight(dx, dy) => {
                    let position = scene.light_position + Vec3::new(dx, dy, 0.0);
                    scene.apply(SceneCommand::SetLightPosition(position));
                    dirty = true;
                }
                WindowEvent::Snapshot => {
                    let path = snapshot_path(&mut snapshots);
                    if let Err(e) = backend.snapshot().save_png(&path) {
                        log::error!("{}", e);
                    }
                }
            }
        }

        if dirty {
            backend
                .render(&scene, Some(&mesh))
                .map_err(|e| e.to_string())?;
            window.present(backend.frame()).map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

fn run_snapshot(config: &ViewerConfig, scene: &Scene, mesh: &Mesh, path: &PathBuf) -> Result<(), String> {
    let mut backend = create_backend(BackendKind::Software, config.width, config.height)
        .map_err(|e| e.to_string())?;
    backend.render(scene, Some(mesh)).map_err(|e| e.to_string())?;
    backend
        .snapshot()
        .save_png(path)
        .map_err(|e| e.to_string())
}

fn main() -> Result<(), String> {
    env_logger::init();

    let opts = Opts::parse();
    let config = load_config(&opts)?;
    let scene = config.scene();
    let mesh = load_mesh(opts.model.as_ref())?;

    match &opts.snapshot {
        Some(path) => run_snapshot(&config, &scene, &mesh, path),
        None => run_interactive(&config, scene, mesh),
    }
}
