use winit::{event::WindowEvent, window::Window};

use crate::params::ShadingParams;
use crate::shading::{ShadingMode, TextureAvailability};

/// Frame statistics shown in the overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub frame_time_ms: f32,
}

/// egui overlay acting as the live parameter source.
pub struct Ui {
    context: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    params: ShadingParams,
    availability: TextureAvailability,
    show_performance: bool,
}

impl Ui {
    pub fn new(
        window: &Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        params: ShadingParams,
        availability: TextureAvailability,
    ) -> Self {
        let context = egui::Context::default();

        let egui_state = egui_winit::State::new(
            context.clone(),
            egui::viewport::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            window.theme(),
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            context,
            state: egui_state,
            renderer: egui_renderer,
            params,
            availability,
            show_performance: false,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    pub fn params(&self) -> ShadingParams {
        self.params
    }

    /// Draws the panel on top of `view`. Returns command buffers egui needs
    /// submitted before the encoder.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        window: &Window,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        active_mode: ShadingMode,
        stats: FrameStats,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = self.state.take_egui_input(window);

        let mut params = self.params;
        let mut show_performance = self.show_performance;
        let availability = self.availability;

        let full_output = self.context.run(raw_input, |ctx| {
            egui::Window::new("PBR Spheres")
                .default_width(260.0)
                .default_pos([20.0, 20.0])
                .resizable(false)
                .collapsible(true)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Albedo");
                        egui::color_picker::color_edit_button_srgb(ui, &mut params.albedo);
                    });
                    ui.separator();

                    ui.checkbox(&mut params.punctual, "Punctual lights");
                    ui.checkbox(&mut params.material, "Material");
                    ui.add_enabled(
                        availability.textured_metal,
                        egui::Checkbox::new(&mut params.textured_metal, "Rusted iron textures"),
                    );
                    ui.add_enabled(
                        availability.image_based,
                        egui::Checkbox::new(&mut params.use_baked_irradiance, "Baked irradiance"),
                    );
                    if !availability.image_based {
                        ui.small("Environment textures missing: image-based lighting off");
                    }

                    ui.separator();
                    ui.label(format!("Mode: {}", active_mode.label()));
                    ui.small("Columns: roughness 0 → 1, rows: metallic 0 → 1");
                    ui.checkbox(&mut show_performance, "Show Performance");
                });

            if show_performance {
                egui::Window::new("Performance")
                    .default_width(200.0)
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", stats.fps));
                        ui.label(format!("Frame time: {:.2} ms", stats.frame_time_ms));
                    });
            }
        });

        if params != self.params {
            log::debug!("Shading parameters changed: {:?}", params);
        }
        self.params = params;
        self.show_performance = show_performance;

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [window.inner_size().width, window.inner_size().height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let extra = self
            .renderer
            .update_buffers(device, queue, encoder, &paint_jobs, &screen_descriptor);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui main render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        extra
    }
}
