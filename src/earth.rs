use std::f32::consts::{PI, TAU};
use std::path::PathBuf;

use glam::Vec3;
use image::RgbImage;
use log::{error, info};
use thiserror::Error;

use crate::color::Color;
use crate::scene::EarthConfig;
use crate::suspense::Resolver;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read texture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),
    #[error("texture has zero area")]
    EmptyTexture,
    #[error("sphere needs at least 3 segments and 2 rings, got {segments}x{rings}")]
    Tessellation { segments: u32, rings: u32 },
}

/// Where the surface colors come from.
#[derive(Debug, Clone)]
pub enum TextureSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// UV sphere with interleaved `position.xyz`, `normal.xyz`, `color.rgb`
/// vertices. Colors are linear.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EarthMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl EarthMesh {
    pub const FLOATS_PER_VERTEX: usize = 9;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::FLOATS_PER_VERTEX
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Everything the Earth needs before it can be drawn.
#[derive(Debug, Clone)]
pub struct EarthAssets {
    pub config: EarthConfig,
    pub mesh: EarthMesh,
    pub textured: bool,
}

#[derive(Debug, Clone)]
pub struct EarthLoader {
    config: EarthConfig,
    texture: Option<TextureSource>,
}

impl EarthLoader {
    pub fn new(config: EarthConfig) -> Self {
        Self {
            config,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureSource) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn load(&self) -> Result<EarthAssets, AssetError> {
        let texture = self.texture.as_ref().map(decode_texture).transpose()?;
        let mesh = match &texture {
            Some(image) => build_sphere(&self.config, |u, v| sample_equirect(image, u, v))?,
            None => build_sphere(&self.config, procedural_surface)?,
        };
        Ok(EarthAssets {
            config: self.config,
            mesh,
            textured: texture.is_some(),
        })
    }

    /// Loads on a worker thread and resolves `resolver` with the result.
    /// A failed load is logged and never resolves.
    pub fn spawn(self, resolver: Resolver<EarthAssets>) -> std::io::Result<()> {
        std::thread::Builder::new()
            .name("earth-loader".into())
            .spawn(move || self.load_into(resolver))?;
        Ok(())
    }

    pub fn load_into(&self, resolver: Resolver<EarthAssets>) {
        match self.load() {
            Ok(assets) => {
                info!(
                    "Earth ready: {} vertices, {} triangles{}",
                    assets.mesh.vertex_count(),
                    assets.mesh.triangle_count(),
                    if assets.textured { " (textured)" } else { "" }
                );
                resolver.resolve(assets);
            }
            Err(err) => error!("failed to load Earth assets: {err}"),
        }
    }
}

fn decode_texture(source: &TextureSource) -> Result<RgbImage, AssetError> {
    let image = match source {
        TextureSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
                path: path.clone(),
                source,
            })?;
            image::load_from_memory(&bytes)?
        }
        TextureSource::Bytes(bytes) => image::load_from_memory(bytes)?,
    };
    let image = image.to_rgb8();
    if image.width() == 0 || image.height() == 0 {
        return Err(AssetError::EmptyTexture);
    }
    Ok(image)
}

/// `u` runs west to east from the antimeridian, `v` from north to south.
fn sample_equirect(image: &RgbImage, u: f32, v: f32) -> Color {
    let x = ((u.rem_euclid(1.0) * image.width() as f32) as u32).min(image.width() - 1);
    let y = ((v.clamp(0.0, 1.0) * image.height() as f32) as u32).min(image.height() - 1);
    let [r, g, b] = image.get_pixel(x, y).0;
    Color::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

const OCEAN: Color = Color::new(0.07, 0.22, 0.52);
const LAND: Color = Color::new(0.16, 0.42, 0.18);
const DESERT: Color = Color::new(0.62, 0.52, 0.33);
const ICE: Color = Color::new(0.93, 0.95, 0.97);

/// Untextured fallback: banded oceans, continents and polar caps.
fn procedural_surface(u: f32, v: f32) -> Color {
    let longitude = u * TAU;
    let latitude = (0.5 - v) * PI;
    if latitude.abs() > 70f32.to_radians() {
        return ICE;
    }
    let continents = (3.0 * longitude).sin() * (2.0 * latitude).cos()
        + 0.5 * (5.0 * longitude + 1.3).sin() * (3.0 * latitude + 0.4).sin();
    if continents > 0.35 {
        if latitude.abs() < 30f32.to_radians() && continents > 0.8 {
            DESERT
        } else {
            LAND
        }
    } else {
        OCEAN
    }
}

fn build_sphere(
    config: &EarthConfig,
    mut surface: impl FnMut(f32, f32) -> Color,
) -> Result<EarthMesh, AssetError> {
    let (segments, rings) = (config.segments, config.rings);
    if segments < 3 || rings < 2 {
        return Err(AssetError::Tessellation { segments, rings });
    }

    let columns = segments + 1;
    let mut mesh = EarthMesh {
        vertices: Vec::with_capacity(
            (columns * (rings + 1)) as usize * EarthMesh::FLOATS_PER_VERTEX,
        ),
        indices: Vec::with_capacity((segments * rings * 6) as usize),
    };

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let polar = v * PI;
        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let azimuth = u * TAU;
            let normal = Vec3::new(
                -azimuth.cos() * polar.sin(),
                polar.cos(),
                azimuth.sin() * polar.sin(),
            );
            let position = normal * config.radius;
            let color = surface(u, v).to_linear();
            mesh.vertices.extend_from_slice(&position.to_array());
            mesh.vertices.extend_from_slice(&normal.to_array());
            mesh.vertices.extend_from_slice(&color.to_array());
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * columns + segment;
            let b = a + columns;
            let c = b + 1;
            let d = a + 1;
            // pole rings collapse one of the two triangles
            if ring != 0 {
                mesh.indices.extend_from_slice(&[d, a, c]);
            }
            if ring != rings - 1 {
                mesh.indices.extend_from_slice(&[a, b, c]);
            }
        }
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suspense;

    fn small_config() -> EarthConfig {
        EarthConfig {
            segments: 8,
            rings: 6,
            ..EarthConfig::default()
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let config = EarthConfig {
            radius: 2.0,
            ..small_config()
        };
        let assets = EarthLoader::new(config).load().unwrap();
        assert!(!assets.textured);
        assert_eq!(assets.mesh.vertex_count(), 9 * 7);
        for vertex in assets.mesh.vertices.chunks(EarthMesh::FLOATS_PER_VERTEX) {
            let position = Vec3::from_slice(&vertex[0..3]);
            let normal = Vec3::from_slice(&vertex[3..6]);
            assert!((position.length() - 2.0).abs() < 1e-4);
            assert!((normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn indices_stay_in_bounds_and_skip_pole_slivers() {
        let mesh = EarthLoader::new(small_config()).load().unwrap().mesh;
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&index| index < count));
        // two triangles per quad minus one per quad on each pole ring
        assert_eq!(mesh.triangle_count(), (8 * 6 * 2 - 8 * 2) as usize);
    }

    #[test]
    fn rejects_degenerate_tessellation() {
        let config = EarthConfig {
            segments: 2,
            ..EarthConfig::default()
        };
        assert!(matches!(
            EarthLoader::new(config).load(),
            Err(AssetError::Tessellation { segments: 2, .. })
        ));
    }

    #[test]
    fn poles_are_icy() {
        assert_eq!(procedural_surface(0.3, 0.0), ICE);
        assert_eq!(procedural_surface(0.7, 1.0), ICE);
    }

    #[test]
    fn texture_colors_are_sampled() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        image.put_pixel(1, 0, image::Rgb([0, 0, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let assets = EarthLoader::new(small_config())
            .with_texture(TextureSource::Bytes(bytes))
            .load()
            .unwrap();
        assert!(assets.textured);
        let first = &assets.mesh.vertices[6..9];
        assert_eq!(first, &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_texture_file_is_an_io_error() {
        let result = EarthLoader::new(small_config())
            .with_texture(TextureSource::Path("does/not/exist.png".into()))
            .load();
        assert!(matches!(result, Err(AssetError::Io { .. })));
    }

    #[test]
    fn failed_load_never_resolves() {
        let (mut boundary, resolver) = suspense::channel();
        EarthLoader::new(small_config())
            .with_texture(TextureSource::Bytes(b"not an image".to_vec()))
            .load_into(resolver);
        assert!(!boundary.poll());
        assert!(!boundary.can_resolve());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn spawned_load_resolves() {
        let (mut boundary, resolver) = suspense::channel();
        EarthLoader::new(small_config()).spawn(resolver).unwrap();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while !boundary.poll() {
            assert!(std::time::Instant::now() < deadline, "loader never resolved");
            std::thread::yield_now();
        }
        assert_eq!(boundary.value().unwrap().mesh.vertex_count(), 9 * 7);
    }
}
