use glam::{Mat4, Vec3};
use log::info;

use crate::controls::OrbitControls;
use crate::earth::EarthAssets;
use crate::input::Gesture;
use crate::placeholder::LoadingPlaceholder;
use crate::render::{CameraParams, LightParams};
use crate::scene::{LightKind, Scene};
use crate::suspense::Suspense;

const READY_TITLE: &str = "Earth";

/// What a single frame should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Loading {
        spin: f32,
    },
    Scene {
        camera: CameraParams,
        lights: LightParams,
        earth_rotation: f32,
        time: f32,
    },
}

impl Frame {
    pub fn is_loading(&self) -> bool {
        matches!(self, Frame::Loading { .. })
    }
}

/// Platform independent viewer state: the composed scene, the Earth's
/// suspension boundary and the camera controls.
#[derive(Debug)]
pub struct Viewer {
    scene: Scene,
    placeholder: LoadingPlaceholder,
    earth: Suspense<EarthAssets>,
    controls: OrbitControls,
    lights: LightParams,
    elapsed: f32,
    earth_rotation: f32,
}

impl Viewer {
    pub fn new(scene: Scene, earth: Suspense<EarthAssets>) -> Self {
        let eye = scene.viewport().position;
        let controls = OrbitControls::new(
            scene.controls().copied().unwrap_or(DISABLED_CONTROLS),
            eye,
            Vec3::ZERO,
        );
        let lights = light_params(&scene);
        Self {
            scene,
            placeholder: LoadingPlaceholder::default(),
            earth,
            controls,
            lights,
            elapsed: 0.0,
            earth_rotation: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn placeholder(&self) -> &LoadingPlaceholder {
        &self.placeholder
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn earth_assets(&self) -> Option<&EarthAssets> {
        self.earth.value()
    }

    /// Returns `true` on the frame the Earth assets arrive.
    pub fn poll_assets(&mut self) -> bool {
        let ready = self.earth.poll();
        if ready {
            info!("Earth assets resolved after {:.2}s", self.elapsed);
        }
        ready
    }

    pub fn is_ready(&self) -> bool {
        self.earth.is_ready()
    }

    /// `false` once the loader gave up; the placeholder then stays for good.
    pub fn can_load(&self) -> bool {
        self.earth.can_resolve()
    }

    pub fn title(&self) -> &str {
        if self.is_ready() {
            READY_TITLE
        } else {
            &self.placeholder.label
        }
    }

    /// Routes a gesture to the controls; ignored while loading.
    pub fn apply(&mut self, gesture: Gesture, viewport_px: (u32, u32)) {
        if !self.is_ready() {
            return;
        }
        let height = viewport_px.1 as f32;
        match gesture {
            Gesture::Rotate(delta) => self.controls.rotate(delta, height),
            Gesture::Pan(delta) => self.controls.pan(delta, height, self.scene.viewport().fov),
            Gesture::Dolly(steps) => self.controls.dolly(steps),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        if let Some(assets) = self.earth.value() {
            self.earth_rotation += assets.config.spin_rate * dt;
            self.controls.update();
        }
    }

    pub fn frame(&self, aspect: f32) -> Frame {
        if !self.is_ready() {
            return Frame::Loading {
                spin: self.placeholder.spin_angle(self.elapsed),
            };
        }
        let projection = self.scene.viewport().projection(aspect);
        Frame::Scene {
            camera: CameraParams {
                view: self.controls.view_matrix(),
                projection,
                view_proj: projection * self.controls.view_matrix(),
                position: self.controls.eye(),
            },
            lights: self.lights,
            earth_rotation: self.earth_rotation,
            time: self.elapsed,
        }
    }

    /// Model matrix for the Earth for the current rotation.
    pub fn earth_model(&self) -> Mat4 {
        Mat4::from_rotation_y(self.earth_rotation)
    }
}

const DISABLED_CONTROLS: crate::scene::OrbitControlsConfig = crate::scene::OrbitControlsConfig {
    enable_zoom: false,
    enable_pan: false,
    enable_rotate: false,
    zoom_speed: 1.0,
    pan_speed: 1.0,
    rotate_speed: 1.0,
};

/// Folds the declared lights into the fixed light slots of the renderer.
/// Ambient lights add up. The renderer has one directional and one point
/// slot, so the last declaration of those kinds wins, position and color.
pub fn light_params(scene: &Scene) -> LightParams {
    let mut params = LightParams::default();
    for light in scene.lights() {
        let radiance = light.color_or_white().to_linear() * light.intensity;
        match light.kind {
            LightKind::Ambient => params.ambient += radiance,
            LightKind::Directional => {
                let position = light.position.unwrap_or(Vec3::Y);
                params.directional_direction = position.normalize_or_zero();
                params.directional_color = radiance;
            }
            LightKind::Point => {
                params.point_position = light.position.unwrap_or(Vec3::ZERO);
                params.point_color = radiance;
            }
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::earth::EarthLoader;
    use crate::scene::{EarthConfig, Light, SceneBuilder};
    use crate::suspense;
    use glam::Vec2;

    fn small_earth() -> EarthAssets {
        EarthLoader::new(EarthConfig {
            segments: 8,
            rings: 4,
            ..EarthConfig::default()
        })
        .load()
        .unwrap()
    }

    #[test]
    fn shows_placeholder_until_resolved() {
        let (boundary, resolver) = suspense::channel();
        let mut viewer = Viewer::new(Scene::compose(), boundary);

        viewer.advance(0.016);
        assert!(!viewer.poll_assets());
        assert!(viewer.frame(1.5).is_loading());
        assert_eq!(viewer.title(), "Loading Earth...");

        resolver.resolve(small_earth());
        assert!(viewer.poll_assets());
        viewer.advance(0.016);
        let frame = viewer.frame(1.5);
        assert!(matches!(frame, Frame::Scene { .. }));
        assert_eq!(viewer.title(), "Earth");
    }

    #[test]
    fn unresolved_load_keeps_placeholder() {
        let (boundary, resolver) = suspense::channel();
        let mut viewer = Viewer::new(Scene::compose(), boundary);
        assert!(viewer.can_load());
        drop(resolver);
        assert!(!viewer.can_load());
        for _ in 0..10_000 {
            viewer.advance(1.0);
            viewer.poll_assets();
            assert!(viewer.frame(1.0).is_loading());
        }
    }

    #[test]
    fn initial_camera_uses_viewport_position() {
        let (boundary, resolver) = suspense::channel();
        resolver.resolve(small_earth());
        let mut viewer = Viewer::new(Scene::compose(), boundary);
        viewer.poll_assets();
        match viewer.frame(1.0) {
            Frame::Scene { camera, .. } => {
                assert!((camera.position - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
            }
            Frame::Loading { .. } => panic!("expected the scene"),
        }
    }

    #[test]
    fn earth_spins_only_once_ready() {
        let (boundary, resolver) = suspense::channel();
        let mut viewer = Viewer::new(Scene::compose(), boundary);
        viewer.advance(5.0);
        resolver.resolve(small_earth());
        viewer.poll_assets();
        viewer.advance(2.0);
        match viewer.frame(1.0) {
            Frame::Scene {
                earth_rotation,
                time,
                ..
            } => {
                assert!((earth_rotation - 0.2).abs() < 1e-5);
                assert!((time - 7.0).abs() < 1e-5);
            }
            Frame::Loading { .. } => panic!("expected the scene"),
        }
    }

    #[test]
    fn gestures_are_ignored_while_loading() {
        let (boundary, resolver) = suspense::channel();
        let mut viewer = Viewer::new(Scene::compose(), boundary);
        viewer.apply(Gesture::Rotate(Vec2::new(300.0, 0.0)), (800, 600));
        resolver.resolve(small_earth());
        viewer.poll_assets();
        viewer.advance(0.016);
        assert!((viewer.controls().eye() - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);

        viewer.apply(Gesture::Rotate(Vec2::new(300.0, 0.0)), (800, 600));
        viewer.advance(0.016);
        assert!(viewer.controls().eye().x.abs() > 1e-4);
    }

    #[test]
    fn light_params_follow_declarations() {
        let params = light_params(&Scene::compose());
        assert!((params.ambient - Vec3::splat(0.3)).length() < 1e-5);
        assert!((params.directional_color - Vec3::splat(1.5)).length() < 1e-5);
        assert!(
            (params.directional_direction - Vec3::ONE.normalize()).length() < 1e-5
        );
        assert_eq!(params.point_position, Vec3::splat(-10.0));
        assert!(params.point_color.z > params.point_color.x);
    }

    #[test]
    fn single_slot_lights_take_the_last_declaration() {
        let scene = SceneBuilder::new(*Scene::compose().viewport())
            .light(Light::ambient(0.25))
            .light(Light::ambient(0.25))
            .light(Light::point(Vec3::X, Color::WHITE, 4.0))
            .light(Light::point(Vec3::NEG_Y, Color::WHITE, 2.0))
            .light(Light::directional(Vec3::Z, 3.0))
            .light(Light::directional(Vec3::X, 1.0))
            .build();
        let params = light_params(&scene);
        assert!((params.ambient - Vec3::splat(0.5)).length() < 1e-5);
        assert_eq!(params.point_position, Vec3::NEG_Y);
        assert!((params.point_color - Vec3::splat(2.0)).length() < 1e-5);
        assert_eq!(params.directional_direction, Vec3::X);
        assert!((params.directional_color - Vec3::ONE).length() < 1e-5);
    }
}
