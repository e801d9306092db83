//! A single interactive 3D view of the Earth in a starfield.
//!
//! The scene description, asset loading, starfield generation and camera
//! controls are platform independent and testable without a GPU. The
//! `render` and `runtime` modules drive them through wgpu and winit, both
//! from the native binary and from the browser entry point in `web`.

pub mod app;
pub mod color;
pub mod controls;
pub mod earth;
pub mod input;
pub mod placeholder;
pub mod render;
pub mod runtime;
pub mod scene;
pub mod stars;
pub mod suspense;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{Frame, Viewer};
pub use color::Color;
pub use controls::OrbitControls;
pub use earth::{AssetError, EarthAssets, EarthLoader, EarthMesh, TextureSource};
pub use input::{Gesture, MouseButton, PointerTracker};
pub use placeholder::LoadingPlaceholder;
pub use render::{CameraParams, LightParams, Renderer};
pub use runtime::WindowApp;
pub use scene::{
    EarthConfig, Light, LightKind, OrbitControlsConfig, Scene, SceneBuilder, SceneNode,
    StarfieldParams, Viewport,
};
pub use stars::{Star, Starfield, DEFAULT_STAR_SEED};
pub use suspense::{LoadState, Resolver, Suspense};
