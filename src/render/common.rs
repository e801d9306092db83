use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::stars::Star;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Lighting state consumed by the renderer's uniform buffer. Colors are
/// linear and pre-multiplied by intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightParams {
    pub ambient: Vec3,
    /// Unit vector from the surface towards the light.
    pub directional_direction: Vec3,
    pub directional_color: Vec3,
    pub point_position: Vec3,
    pub point_color: Vec3,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub directional_direction: [f32; 4],
    pub directional_color: [f32; 4],
    pub point_position: [f32; 4],
    pub point_color: [f32; 4],
    /// width, height, time, fade
    pub viewport: [f32; 4],
}

impl GlobalUniform {
    pub fn new(
        camera: &CameraParams,
        lights: &LightParams,
        viewport_px: (u32, u32),
        time: f32,
        fade: bool,
    ) -> Self {
        Self {
            view: camera.view.to_cols_array_2d(),
            projection: camera.projection.to_cols_array_2d(),
            view_proj: camera.view_proj.to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).into(),
            ambient: lights.ambient.extend(0.0).into(),
            directional_direction: lights.directional_direction.extend(0.0).into(),
            directional_color: lights.directional_color.extend(0.0).into(),
            point_position: lights.point_position.extend(1.0).into(),
            point_color: lights.point_color.extend(0.0).into(),
            viewport: [
                viewport_px.0.max(1) as f32,
                viewport_px.1.max(1) as f32,
                time,
                if fade { 1.0 } else { 0.0 },
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
}

impl ObjectConstants {
    pub fn new(model: Mat4) -> Self {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct StarInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

impl From<&Star> for StarInstance {
    fn from(star: &Star) -> Self {
        Self {
            position: star.position.to_array(),
            size: star.size,
            color: star.color.to_linear().extend(1.0).into(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct OverlayVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 3 * 64 + 7 * 16);
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 64 + 48);
        assert_eq!(std::mem::size_of::<StarInstance>(), 32);
        assert_eq!(std::mem::size_of::<OverlayVertex>(), 24);
    }

    #[test]
    fn rotation_normal_matrix_is_rotation() {
        let model = Mat4::from_rotation_y(0.7);
        let constants = ObjectConstants::new(model);
        let expected = mat3_to_3x4(Mat3::from_mat4(model));
        for (row, want) in constants.normal.iter().zip(expected.iter()) {
            for (a, b) in row.iter().zip(want.iter()) {
                assert!((a - b).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn star_instances_are_linear() {
        let star = Star {
            position: Vec3::new(1.0, 2.0, 3.0),
            color: Color::WHITE,
            size: 4.0,
        };
        let instance = StarInstance::from(&star);
        assert_eq!(instance.position, [1.0, 2.0, 3.0]);
        assert_eq!(instance.size, 4.0);
        assert!((instance.color[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fade_flag_reaches_the_uniform() {
        let camera = CameraParams {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            position: Vec3::ZERO,
        };
        let uniform = GlobalUniform::new(&camera, &LightParams::default(), (0, 0), 2.0, true);
        assert_eq!(uniform.viewport, [1.0, 1.0, 2.0, 1.0]);
    }
}
