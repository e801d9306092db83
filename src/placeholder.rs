use std::f32::consts::TAU;

use glam::Vec2;
use serde::Serialize;

use crate::color::Color;

/// Fallback view shown while the Earth assets are pending: a globe icon
/// spinning once per second above a text label, centred together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingPlaceholder {
    pub label: String,
    pub icon_color: Color,
    pub text_color: Color,
    pub background: Color,
    /// Icon edge length in logical pixels.
    pub icon_size: f32,
    /// Label font size in logical pixels.
    pub label_size: f32,
    /// Height of the label's line box in logical pixels.
    pub label_line_height: f32,
    /// Space between the icon and the label in logical pixels.
    pub label_gap: f32,
    /// Seconds per full turn.
    pub spin_period: f32,
}

/// Where the icon and the label go, in logical pixels relative to the
/// viewport centre with y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderLayout {
    pub icon_center: Vec2,
    pub label_center: Vec2,
}

impl Default for LoadingPlaceholder {
    fn default() -> Self {
        Self {
            label: "Loading Earth...".to_string(),
            icon_color: Color::new(59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0),
            text_color: Color::WHITE,
            background: Color::BLACK,
            icon_size: 64.0,
            label_size: 20.0,
            label_line_height: 28.0,
            label_gap: 16.0,
            spin_period: 1.0,
        }
    }
}

// The icon is drawn on a 24 unit grid, stroke width 2.
const ICON_GRID: f32 = 24.0;
const ICON_STROKE: f32 = 2.0;
const OUTER_RADIUS: f32 = 10.0;
const MERIDIAN_HALF_WIDTH: f32 = 4.5;
const RING_SEGMENTS: usize = 48;

impl LoadingPlaceholder {
    /// Clockwise spin angle in radians, linear in time.
    pub fn spin_angle(&self, elapsed: f32) -> f32 {
        if self.spin_period <= 0.0 {
            return 0.0;
        }
        (elapsed / self.spin_period).rem_euclid(1.0) * TAU
    }

    /// Icon above label, the pair centred as one group.
    pub fn layout(&self) -> PlaceholderLayout {
        let top = -(self.icon_size + self.label_gap + self.label_line_height) * 0.5;
        PlaceholderLayout {
            icon_center: Vec2::new(0.0, top + self.icon_size * 0.5),
            label_center: Vec2::new(
                0.0,
                top + self.icon_size + self.label_gap + self.label_line_height * 0.5,
            ),
        }
    }

    /// Triangle list for the globe icon in normalized device coordinates,
    /// for a viewport of `viewport_px` physical pixels at `scale_factor`
    /// physical pixels per logical pixel.
    pub fn icon_triangles(
        &self,
        viewport_px: (u32, u32),
        scale_factor: f32,
        angle: f32,
    ) -> Vec<[f32; 2]> {
        let width = viewport_px.0.max(1) as f32;
        let height = viewport_px.1.max(1) as f32;
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        let unit = self.icon_size / ICON_GRID * scale;
        let centre = self.layout().icon_center * scale;
        let rotation = Vec2::from_angle(-angle);
        let to_ndc = |point: Vec2| -> [f32; 2] {
            let rotated = rotation.rotate(point * unit);
            [
                (rotated.x + centre.x) * 2.0 / width,
                (rotated.y - centre.y) * 2.0 / height,
            ]
        };

        let mut strokes: Vec<[Vec2; 4]> = Vec::new();
        ring(&mut strokes, OUTER_RADIUS, OUTER_RADIUS);
        ring(&mut strokes, MERIDIAN_HALF_WIDTH, OUTER_RADIUS);
        strokes.push(segment(
            Vec2::new(-OUTER_RADIUS, 0.0),
            Vec2::new(OUTER_RADIUS, 0.0),
        ));

        let mut triangles = Vec::with_capacity(strokes.len() * 6);
        for [a, b, c, d] in strokes {
            for corner in [a, b, c, a, c, d] {
                triangles.push(to_ndc(corner));
            }
        }
        triangles
    }
}

fn ring(strokes: &mut Vec<[Vec2; 4]>, radius_x: f32, radius_y: f32) {
    let half = ICON_STROKE * 0.5;
    let point = |index: usize, offset: f32| {
        let theta = index as f32 / RING_SEGMENTS as f32 * TAU;
        Vec2::new(
            (radius_x + offset) * theta.cos(),
            (radius_y + offset) * theta.sin(),
        )
    };
    for index in 0..RING_SEGMENTS {
        strokes.push([
            point(index, -half),
            point(index + 1, -half),
            point(index + 1, half),
            point(index, half),
        ]);
    }
}

fn segment(from: Vec2, to: Vec2) -> [Vec2; 4] {
    let normal = (to - from).perp().normalize_or_zero() * (ICON_STROKE * 0.5);
    [from - normal, to - normal, to + normal, from + normal]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_label_and_colors() {
        let placeholder = LoadingPlaceholder::default();
        assert_eq!(placeholder.label, "Loading Earth...");
        assert_eq!(placeholder.icon_color.to_hex(), "#3b82f6");
        assert_eq!(placeholder.background, Color::BLACK);
    }

    #[test]
    fn spin_is_periodic() {
        let placeholder = LoadingPlaceholder::default();
        assert_eq!(placeholder.spin_angle(0.0), 0.0);
        assert!((placeholder.spin_angle(0.25) - TAU / 4.0).abs() < 1e-5);
        assert!((placeholder.spin_angle(3.25) - placeholder.spin_angle(0.25)).abs() < 1e-4);
    }

    #[test]
    fn icon_and_label_are_centred_as_a_group() {
        let placeholder = LoadingPlaceholder::default();
        let layout = placeholder.layout();
        let icon_top = layout.icon_center.y - placeholder.icon_size * 0.5;
        let label_bottom = layout.label_center.y + placeholder.label_line_height * 0.5;
        assert!((icon_top + label_bottom).abs() < 1e-5);
        assert!(layout.label_center.y > layout.icon_center.y);
        assert_eq!(layout.icon_center, Vec2::new(0.0, -22.0));
        assert_eq!(layout.label_center, Vec2::new(0.0, 40.0));
    }

    #[test]
    fn icon_is_deterministic_and_placed_at_its_slot() {
        let placeholder = LoadingPlaceholder::default();
        let first = placeholder.icon_triangles((800, 600), 1.0, 0.3);
        let second = placeholder.icon_triangles((800, 600), 1.0, 0.3);
        assert_eq!(first, second);
        assert_eq!(first.len() % 3, 0);

        let centre = first.iter().fold(Vec2::ZERO, |acc, p| acc + Vec2::from(*p))
            / first.len() as f32;
        // 22 logical pixels above the middle, y up in NDC
        assert!(centre.x.abs() < 1e-3);
        assert!((centre.y - 22.0 * 2.0 / 600.0).abs() < 1e-3);
    }

    fn logical_extent(triangles: &[[f32; 2]], viewport_px: (u32, u32), scale: f32) -> Vec2 {
        let (mut min, mut max) = (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN));
        for &[x, y] in triangles {
            let px = Vec2::new(
                x * viewport_px.0 as f32 / 2.0,
                y * viewport_px.1 as f32 / 2.0,
            );
            min = min.min(px);
            max = max.max(px);
        }
        (max - min) / scale
    }

    #[test]
    fn icon_keeps_its_logical_size_on_hidpi() {
        let placeholder = LoadingPlaceholder::default();
        let normal = placeholder.icon_triangles((800, 600), 1.0, 0.0);
        let hidpi = placeholder.icon_triangles((1600, 1200), 2.0, 0.0);

        let normal = logical_extent(&normal, (800, 600), 1.0);
        let hidpi = logical_extent(&hidpi, (1600, 1200), 2.0);
        assert!(hidpi.x >= 0.8 * placeholder.icon_size);
        assert!(hidpi.x <= placeholder.icon_size);
        assert!((hidpi - normal).length() < 1e-2);
    }

    #[test]
    fn icon_fits_its_pixel_size() {
        let placeholder = LoadingPlaceholder::default();
        let (width, height) = (1000u32, 500u32);
        let centre = placeholder.layout().icon_center;
        for angle in [0.0, 1.0, 2.5] {
            for [x, y] in placeholder.icon_triangles((width, height), 1.0, angle) {
                let px = x * width as f32 / 2.0 - centre.x;
                let py = y * height as f32 / 2.0 + centre.y;
                assert!(px.hypot(py) <= placeholder.icon_size * 0.5 + 0.01);
            }
        }
    }
}
