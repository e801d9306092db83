use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pollster::block_on;
use serde_json::json;
use winit::dpi::LogicalSize;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::Window;

use earth_live::suspense;
use earth_live::{
    EarthAssets, EarthLoader, Renderer, Scene, SceneNode, Starfield, TextureSource, Viewer,
    WindowApp, DEFAULT_STAR_SEED,
};

/// Interactive Earth in a starfield.
#[derive(Debug, Parser)]
#[command(name = "earth-live", version, about)]
struct CliOptions {
    /// Print the scene and load the Earth without opening a window.
    #[arg(long)]
    summary_only: bool,
    /// Print the summary as JSON (implies --summary-only).
    #[arg(long)]
    json: bool,
    /// Equirectangular PNG or JPEG for the Earth's surface.
    #[arg(long, value_name = "PATH")]
    texture: Option<PathBuf>,
    /// Seed for the starfield layout.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_STAR_SEED)]
    star_seed: u64,
}

impl CliOptions {
    fn loader(&self, scene: &Scene) -> EarthLoader {
        let loader = EarthLoader::new(scene.earth().copied().unwrap_or_default());
        match &self.texture {
            Some(path) => loader.with_texture(TextureSource::Path(path.clone())),
            None => loader,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse();
    let scene = Scene::compose();

    if options.summary_only || options.json {
        return run_headless(&scene, &options);
    }

    match run_interactive(scene.clone(), &options) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
            );
            run_headless(&scene, &options)
        }
        Err(err) => Err(err),
    }
}

fn run_headless(scene: &Scene, options: &CliOptions) -> Result<()> {
    let stars = scene
        .starfield()
        .map(|params| Starfield::generate(params, options.star_seed));
    let assets = options
        .loader(scene)
        .load()
        .context("failed to load Earth assets")?;

    if options.json {
        let summary = json!({
            "scene": scene,
            "stars": stars.as_ref().map_or(0, Starfield::len),
            "earth": {
                "vertices": assets.mesh.vertex_count(),
                "triangles": assets.mesh.triangle_count(),
                "textured": assets.textured,
            },
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_scene_summary(scene);
        if let Some(stars) = &stars {
            println!("Generated {} stars (seed {})", stars.len(), options.star_seed);
        }
        print_earth_summary(&assets);
    }
    Ok(())
}

fn run_interactive(scene: Scene, options: &CliOptions) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Loading Earth...")
                    .with_inner_size(LogicalSize::new(1280.0, 720.0)),
            )
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(
        Arc::clone(&window),
        &scene,
        options.star_seed,
    ))?;

    let (boundary, resolver) = suspense::channel::<EarthAssets>();
    options
        .loader(&scene)
        .spawn(resolver)
        .context("failed to start the Earth loader")?;

    print_scene_summary(&scene);
    let mut app = WindowApp::new(renderer, Viewer::new(scene, boundary));
    let mut last_error = None;

    #[allow(deprecated)]
    event_loop
        .run(|event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            if let Err(err) = app.process_event(&event, elwt) {
                last_error = Some(err);
                elwt.exit();
            }
        })
        .context("event loop terminated abnormally")?;

    match last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn print_scene_summary(scene: &Scene) {
    let viewport = scene.viewport();
    println!(
        "Composed scene with {} nodes (camera at ({:.2}, {:.2}, {:.2}), fov {})",
        scene.nodes().len(),
        viewport.position.x,
        viewport.position.y,
        viewport.position.z,
        viewport.fov
    );
    for node in scene.nodes() {
        println!(" - {}", describe_node(node));
    }
}

fn describe_node(node: &SceneNode) -> String {
    match node {
        SceneNode::Background { color } => format!("background {color}"),
        SceneNode::Stars(params) => format!(
            "stars count={} radius={} depth={} factor={} fade={}",
            params.count, params.radius, params.depth, params.factor, params.fade
        ),
        SceneNode::Light(light) => {
            let mut line = format!("{:?} light intensity={}", light.kind, light.intensity)
                .to_lowercase();
            if let Some(position) = light.position {
                line.push_str(&format!(
                    " pos=({:.2}, {:.2}, {:.2})",
                    position.x, position.y, position.z
                ));
            }
            if let Some(color) = light.color {
                line.push_str(&format!(" color={color}"));
            }
            line
        }
        SceneNode::Earth(config) => format!(
            "earth radius={} segments={} rings={}",
            config.radius, config.segments, config.rings
        ),
        SceneNode::OrbitControls(config) => format!(
            "orbit controls zoom={} pan={} rotate={} speeds=({}, {}, {})",
            config.enable_zoom,
            config.enable_pan,
            config.enable_rotate,
            config.zoom_speed,
            config.pan_speed,
            config.rotate_speed
        ),
    }
}

fn print_earth_summary(assets: &EarthAssets) {
    println!(
        "Earth ready: {} vertices, {} triangles ({})",
        assets.mesh.vertex_count(),
        assets.mesh.triangle_count(),
        if assets.textured {
            "textured"
        } else {
            "procedural surface"
        }
    );
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}
