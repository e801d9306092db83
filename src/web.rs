#![cfg(target_arch = "wasm32")]

use std::sync::Arc;

use log::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use winit::dpi::LogicalSize;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::web::{EventLoopExtWebSys, WindowAttributesExtWebSys};
use winit::window::Window;

use crate::placeholder::LoadingPlaceholder;
use crate::suspense;
use crate::{
    EarthAssets, EarthLoader, Renderer, Scene, TextureSource, Viewer, WindowApp,
    DEFAULT_STAR_SEED,
};

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Mounts the viewer on the canvas with id `canvas_id`. `texture` holds the
/// bytes of an equirectangular surface image; without it the Earth uses the
/// built-in procedural surface.
#[wasm_bindgen]
pub async fn run(canvas_id: String, texture: Option<js_sys::Uint8Array>) -> Result<(), JsValue> {
    let scene = Scene::compose();
    let placeholder = LoadingPlaceholder::default();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?;
    let element = document
        .get_element_by_id(&canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas element not found"))?;
    let canvas: web_sys::HtmlCanvasElement = element
        .dyn_into()
        .map_err(|_| JsValue::from_str("element is not a canvas"))?;

    let event_loop = EventLoop::new()
        .map_err(|err| JsValue::from_str(&format!("failed to create event loop: {err}")))?;
    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_canvas(Some(canvas))
                    .with_title(placeholder.label.as_str())
                    .with_inner_size(LogicalSize::new(1280.0, 720.0)),
            )
            .map_err(|err| JsValue::from_str(&format!("window error: {err}")))?,
    );

    let renderer = Renderer::new(Arc::clone(&window), &scene, DEFAULT_STAR_SEED)
        .await
        .map_err(|err| JsValue::from_str(&format!("renderer error: {err}")))?;

    let mut loader = EarthLoader::new(scene.earth().copied().unwrap_or_default());
    if let Some(bytes) = texture {
        loader = loader.with_texture(TextureSource::Bytes(bytes.to_vec()));
    }
    let (boundary, resolver) = suspense::channel::<EarthAssets>();
    wasm_bindgen_futures::spawn_local(async move { loader.load_into(resolver) });

    info!("Composed scene with {} nodes", scene.nodes().len());
    let mut app = WindowApp::new(renderer, Viewer::new(scene, boundary));

    #[allow(deprecated)]
    event_loop.spawn(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        if let Err(err) = app.process_event(&event, elwt) {
            error!("{err:?}");
            elwt.exit();
        }
    });

    Ok(())
}
