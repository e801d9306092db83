use egui_wgpu::ScreenDescriptor;
use glam::Vec2;

use crate::color::Color;

/// One line of text, positioned in physical pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LabelText<'a> {
    pub text: &'a str,
    pub color: Color,
    pub font_px: f32,
    /// Centre of the line box, y pointing down.
    pub center: Vec2,
}

/// Draws a text label onto the surface through egui.
///
/// egui runs with one point per physical pixel; callers scale font size and
/// position by the window scale factor themselves.
pub(crate) struct LabelPainter {
    context: egui::Context,
    renderer: egui_wgpu::Renderer,
    primitives: Vec<egui::ClippedPrimitive>,
    screen: ScreenDescriptor,
    stale_textures: Vec<egui::TextureId>,
}

impl LabelPainter {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            context: egui::Context::default(),
            renderer: egui_wgpu::Renderer::new(
                device,
                format,
                egui_wgpu::RendererOptions::default(),
            ),
            primitives: Vec::new(),
            screen: ScreenDescriptor {
                size_in_pixels: [1, 1],
                pixels_per_point: 1.0,
            },
            stale_textures: Vec::new(),
        }
    }

    /// Lays out `label` and uploads its geometry. The returned command
    /// buffers must be submitted ahead of `encoder`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        viewport_px: (u32, u32),
        label: &LabelText<'_>,
    ) -> Vec<wgpu::CommandBuffer> {
        for id in self.stale_textures.drain(..) {
            self.renderer.free_texture(&id);
        }

        let (width, height) = (viewport_px.0.max(1), viewport_px.1.max(1));
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(width as f32, height as f32),
            )),
            ..Default::default()
        };
        let [r, g, b] = label.color.to_srgb8();
        let output = self.context.run(input, |ctx| {
            ctx.layer_painter(egui::LayerId::background()).text(
                egui::pos2(label.center.x, label.center.y),
                egui::Align2::CENTER_CENTER,
                label.text,
                egui::FontId::proportional(label.font_px),
                egui::Color32::from_rgb(r, g, b),
            );
        });

        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        // freed after this frame has been drawn
        self.stale_textures = output.textures_delta.free;

        self.primitives = self
            .context
            .tessellate(output.shapes, output.pixels_per_point);
        self.screen = ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: output.pixels_per_point,
        };
        self.renderer
            .update_buffers(device, queue, encoder, &self.primitives, &self.screen)
    }

    pub fn paint(&self, pass: &mut wgpu::RenderPass<'static>) {
        self.renderer.render(pass, &self.primitives, &self.screen);
    }
}
