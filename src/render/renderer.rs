use std::path::PathBuf;
use std::sync::Arc;

use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::Camera,
    error::RenderError,
    geometry::{
        Geometry, GpuGeometry,
        sphere::{DEFAULT_RADIUS, DEFAULT_SUBDIVISIONS},
    },
    params::ShadingParams,
    render::{
        environment::{AssetPaths, Environment, EnvironmentImages},
        frame::{FramePlan, FramePlanner, PassKind},
        pipeline::{SphereProgram, sampled_slots},
        texture::{DEPTH_FORMAT, RENDER_TARGET_SIZE, RenderTarget, create_depth_texture},
    },
    shading::{ShadingMode, TextureAvailability},
    ui::{FrameStats, Ui},
};

/// Start-up configuration handed over by the application shell.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub assets: PathBuf,
    pub background: [u8; 3],
    pub subdivisions: u32,
    /// Draw the fallback triangle instead of spheres.
    pub triangle: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            background: [0, 0, 0],
            subdivisions: DEFAULT_SUBDIVISIONS,
            triangle: false,
        }
    }
}

pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub depth_view: wgpu::TextureView,
    program: SphereProgram,
    geometry: GpuGeometry,
    environment: Environment,
    target: RenderTarget,
    offscreen_bind_group: wgpu::BindGroup,
    forward_bind_group: wgpu::BindGroup,
    planner: FramePlanner,
    camera: Camera,
    last_mode: Option<ShadingMode>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, settings: &RendererSettings) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Adapter(e.to_string()))?;
        let info = adapter.get_info();
        log::info!(
            "Adapter: {} ({:?}, {:?}), Driver: {}",
            info.name,
            info.backend,
            info.device_type,
            info.driver
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
            })
            .await?;

        // The shader encodes sRGB itself, so a linear surface format avoids a
        // second encode.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Adapter("surface reports no formats".to_string()))?;

        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::PresentMode::Fifo)
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Surface format: {:?}, present mode: {:?}", surface_format, present_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(
            &device,
            config.width,
            config.height,
            DEPTH_FORMAT,
            "depth_texture",
        );

        let geometry = if settings.triangle {
            Geometry::triangle()
        } else {
            Geometry::sphere(DEFAULT_RADIUS, settings.subdivisions, settings.subdivisions)?
        };
        let geometry = geometry.upload(&device);

        let images = EnvironmentImages::load(&AssetPaths::new(settings.assets.clone()));
        let environment = Environment::new(&device, &queue, &images);

        let layout = Environment::bind_group_layout(&device);
        let program = SphereProgram::compile(&device, surface_format, layout).await?;

        let target = RenderTarget::new(&device, RENDER_TARGET_SIZE, RENDER_TARGET_SIZE);
        let offscreen_bind_group = environment.bind_group(
            &device,
            &program.environment_layout,
            None,
            "offscreen_environment_bind_group",
        );
        let forward_bind_group = environment.bind_group(
            &device,
            &program.environment_layout,
            Some(&target.color.view),
            "forward_environment_bind_group",
        );

        let planner = FramePlanner::new(
            environment.availability(),
            environment.loaded_slots().to_vec(),
            target.size(),
            settings.background,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_view,
            program,
            geometry,
            environment,
            target,
            offscreen_bind_group,
            forward_bind_group,
            planner,
            camera: Camera::new(),
            last_mode: None,
        })
    }

    pub fn availability(&self) -> TextureAvailability {
        self.environment.availability()
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            self.depth_view = create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                DEPTH_FORMAT,
                "depth_texture",
            );
        }
    }

    /// Plans and runs one frame. The first frame only bakes the offscreen
    /// target; every later frame shades the window and draws the overlay.
    pub fn render(
        &mut self,
        params: &ShadingParams,
        ui: Option<&mut Ui>,
        window: &Window,
        stats: FrameStats,
    ) -> Result<(), RenderError> {
        let plan = self.planner.plan(
            &mut self.camera,
            params,
            (self.config.width, self.config.height),
        );
        if self.last_mode != Some(plan.mode) {
            log::info!(
                "Shading mode: {} (samples {:?})",
                plan.mode.label(),
                sampled_slots(plan.mode)
            );
            self.last_mode = Some(plan.mode);
        }
        self.program.write_uniforms(&self.queue, &plan)?;

        match plan.pass {
            PassKind::OffscreenPrecompute => {
                self.render_offscreen(&plan);
                window.request_redraw();
                Ok(())
            }
            PassKind::ForwardShading => self.render_forward(&plan, ui, window, stats),
        }
    }

    fn render_offscreen(&self, plan: &FramePlan) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Offscreen Encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Irradiance Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.color.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(plan.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.program
                .record(&mut rpass, plan, &self.geometry, &self.offscreen_bind_group);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        log::info!("Irradiance baked into offscreen target");
    }

    fn render_forward(
        &mut self,
        plan: &FramePlan,
        ui: Option<&mut Ui>,
        window: &Window,
        stats: FrameStats,
    ) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other) => return Ok(()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(plan.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.program
                .record(&mut rpass, plan, &self.geometry, &self.forward_bind_group);
        }

        let mut command_buffers = Vec::new();
        if let Some(ui) = ui {
            command_buffers = ui.render(
                window,
                &mut encoder,
                &view,
                &self.device,
                &self.queue,
                plan.mode,
                stats,
            );
        }
        command_buffers.push(encoder.finish());

        self.queue.submit(command_buffers);
        output.present();

        Ok(())
    }
}
