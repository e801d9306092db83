use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Camera parameters for the single viewport of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Viewport {
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            aspect.max(0.01),
            self.near,
            self.far,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
}

/// Light declaration; directional lights shine from `position` towards the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub intensity: f32,
}

impl Light {
    pub fn ambient(intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            position: None,
            color: None,
            intensity,
        }
    }

    pub fn directional(position: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            position: Some(position),
            color: None,
            intensity,
        }
    }

    pub fn point(position: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position: Some(position),
            color: Some(color),
            intensity,
        }
    }

    /// Color with white as the default, matching an undeclared color.
    pub fn color_or_white(&self) -> Color {
        self.color.unwrap_or(Color::WHITE)
    }
}

/// Inputs of the procedural starfield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarfieldParams {
    pub radius: f32,
    pub depth: f32,
    pub count: u32,
    pub factor: f32,
    pub saturation: f32,
    pub fade: bool,
}

/// Enable flags and speeds handed to the orbit controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitControlsConfig {
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_rotate: bool,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub rotate_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarthConfig {
    pub radius: f32,
    pub segments: u32,
    pub rings: u32,
    /// Spin around the Y axis in radians per second.
    pub spin_rate: f32,
}

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 64,
            rings: 64,
            spin_rate: 0.1,
        }
    }
}

/// One declared child of the canvas, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum SceneNode {
    Background { color: Color },
    Stars(StarfieldParams),
    Light(Light),
    Earth(EarthConfig),
    OrbitControls(OrbitControlsConfig),
}

/// Render tree for the starfield + Earth viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    viewport: Viewport,
    nodes: Vec<SceneNode>,
}

impl Scene {
    /// Composes the fixed Earth scene.
    pub fn compose() -> Self {
        SceneBuilder::new(Viewport {
            position: Vec3::new(0.0, 0.0, 4.0),
            fov: 45.0,
            near: 0.1,
            far: 1000.0,
        })
        .background(Color::new(2.0 / 255.0, 9.0 / 255.0, 36.0 / 255.0))
        .stars(StarfieldParams {
            radius: 300.0,
            depth: 60.0,
            count: 20_000,
            factor: 7.0,
            saturation: 0.0,
            fade: true,
        })
        .light(Light::ambient(0.3))
        .light(Light::directional(Vec3::new(1.0, 1.0, 1.0), 1.5))
        .light(Light::point(
            Vec3::new(-10.0, -10.0, -10.0),
            Color::new(40.0 / 255.0, 96.0 / 255.0, 216.0 / 255.0),
            1.0,
        ))
        .earth(EarthConfig::default())
        .controls(OrbitControlsConfig {
            enable_zoom: true,
            enable_pan: true,
            enable_rotate: true,
            zoom_speed: 0.6,
            pan_speed: 0.5,
            rotate_speed: 0.4,
        })
        .build()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn background(&self) -> Color {
        self.nodes
            .iter()
            .find_map(|node| match node {
                SceneNode::Background { color } => Some(*color),
                _ => None,
            })
            .unwrap_or(Color::BLACK)
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Light(light) => Some(light),
            _ => None,
        })
    }

    pub fn starfield(&self) -> Option<&StarfieldParams> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Stars(params) => Some(params),
            _ => None,
        })
    }

    pub fn earth(&self) -> Option<&EarthConfig> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Earth(config) => Some(config),
            _ => None,
        })
    }

    pub fn controls(&self) -> Option<&OrbitControlsConfig> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::OrbitControls(config) => Some(config),
            _ => None,
        })
    }
}

/// Builds a [`Scene`] one declaration at a time.
///
/// The viewport is fixed when the builder is created, so a scene always has
/// exactly one.
#[derive(Debug)]
pub struct SceneBuilder {
    viewport: Viewport,
    nodes: Vec<SceneNode>,
}

impl SceneBuilder {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            nodes: Vec::new(),
        }
    }

    pub fn background(mut self, color: Color) -> Self {
        self.nodes.push(SceneNode::Background { color });
        self
    }

    pub fn stars(mut self, params: StarfieldParams) -> Self {
        self.nodes.push(SceneNode::Stars(params));
        self
    }

    pub fn light(mut self, light: Light) -> Self {
        self.nodes.push(SceneNode::Light(light));
        self
    }

    pub fn earth(mut self, config: EarthConfig) -> Self {
        self.nodes.push(SceneNode::Earth(config));
        self
    }

    pub fn controls(mut self, config: OrbitControlsConfig) -> Self {
        self.nodes.push(SceneNode::OrbitControls(config));
        self
    }

    pub fn build(self) -> Scene {
        Scene {
            viewport: self.viewport,
            nodes: self.nodes,
        }
    }
}
