mod common;
mod label;
mod renderer;
mod shared;

pub use common::{CameraParams, LightParams};
pub use renderer::Renderer;
