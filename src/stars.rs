use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::Color;
use crate::scene::StarfieldParams;

pub const DEFAULT_STAR_SEED: u64 = 0x5eed_0f_57a2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub color: Color,
    /// Point size before perspective attenuation.
    pub size: f32,
}

/// Background stars scattered through a spherical shell.
#[derive(Debug, Clone, PartialEq)]
pub struct Starfield {
    pub stars: Vec<Star>,
    pub fade: bool,
}

impl Starfield {
    /// Places `count` stars in the shell between `radius` and
    /// `radius + depth`, walking inwards from the outer edge.
    pub fn generate(params: &StarfieldParams, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let count = params.count as usize;
        let increment = if count == 0 {
            0.0
        } else {
            params.depth / count as f32
        };

        let mut radius = params.radius + params.depth;
        let mut stars = Vec::with_capacity(count);
        for index in 0..count {
            radius -= increment * rng.random::<f32>();
            let polar = (1.0 - rng.random::<f32>() * 2.0).acos();
            let azimuth = rng.random::<f32>() * TAU;
            let position = Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            );
            let color = Color::from_hsl(index as f32 / count as f32, params.saturation, 0.9);
            let size = (0.5 + 0.5 * rng.random::<f32>()) * params.factor;
            stars.push(Star {
                position,
                color,
                size,
            });
        }

        Self {
            stars,
            fade: params.fade,
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn params() -> StarfieldParams {
        *Scene::compose().starfield().unwrap()
    }

    #[test]
    fn generates_requested_count_inside_shell() {
        let params = params();
        let field = Starfield::generate(&params, DEFAULT_STAR_SEED);
        assert_eq!(field.len(), 20_000);
        assert!(field.fade);
        for star in &field.stars {
            let distance = star.position.length();
            assert!(distance <= params.radius + params.depth + 1e-2);
            assert!(distance >= params.radius - 1e-2);
            assert!(star.size >= 0.5 * params.factor && star.size <= params.factor);
        }
    }

    #[test]
    fn zero_saturation_gives_grey_stars() {
        let field = Starfield::generate(&params(), 1);
        assert!(field
            .stars
            .iter()
            .all(|star| star.color == Color::new(0.9, 0.9, 0.9)));
    }

    #[test]
    fn same_seed_same_sky() {
        let params = StarfieldParams {
            count: 64,
            ..params()
        };
        assert_eq!(
            Starfield::generate(&params, 9),
            Starfield::generate(&params, 9)
        );
        assert_ne!(
            Starfield::generate(&params, 9),
            Starfield::generate(&params, 10)
        );
    }

    #[test]
    fn empty_field() {
        let params = StarfieldParams {
            count: 0,
            ..params()
        };
        assert!(Starfield::generate(&params, 3).is_empty());
    }

    #[test]
    fn generation_leaves_parameters_untouched() {
        let scene = Scene::compose();
        let before = *scene.starfield().unwrap();
        let _ = Starfield::generate(scene.starfield().unwrap(), 5);
        assert_eq!(scene.starfield(), Some(&before));
    }
}
