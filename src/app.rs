use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    params::ShadingParams,
    render::{Renderer, RendererSettings},
    ui::{FrameStats, Ui},
};

pub struct App {
    pub window: Option<Arc<Window>>,
    pub renderer: Option<Renderer>,
    pub ui: Option<Ui>,
    pub settings: RendererSettings,
    pub initial_params: ShadingParams,
    pub initial_size: (u32, u32),
    pub last_frame: Instant,
    pub stats: FrameStats,
    fatal: Option<anyhow::Error>,
}

impl App {
    pub fn new(
        settings: RendererSettings,
        initial_params: ShadingParams,
        initial_size: (u32, u32),
    ) -> Self {
        Self {
            window: None,
            renderer: None,
            ui: None,
            settings,
            initial_params,
            initial_size,
            last_frame: Instant::now(),
            stats: FrameStats::default(),
            fatal: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.fatal.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("PBR Spheres")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.initial_size.0 as f64,
                self.initial_size.1 as f64,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create window")?,
        );

        let renderer = pollster::block_on(Renderer::new(Arc::clone(&window), &self.settings))
            .context("failed to initialise renderer")?;
        let ui = Ui::new(
            &window,
            &renderer.device,
            renderer.surface_format(),
            self.initial_params,
            renderer.availability(),
        );

        self.renderer = Some(renderer);
        self.ui = Some(ui);
        self.window = Some(window);
        Ok(())
    }

    fn update_stats(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        if delta > 0.0 {
            let fps = 1.0 / delta;
            self.stats.fps = if self.stats.fps == 0.0 {
                fps
            } else {
                self.stats.fps * 0.9 + fps * 0.1
            };
            self.stats.frame_time_ms = delta * 1000.0;
        }
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.update_stats();

        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            let params = self
                .ui
                .as_ref()
                .map(|ui| ui.params())
                .unwrap_or(self.initial_params);
            renderer.render(&params, self.ui.as_mut(), window, self.stats)?;
        }

        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(ui), Some(window)) = (&mut self.ui, &self.window) {
            if ui.handle_event(window, &event) {
                window.request_redraw();
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close was requested; stopping");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.render() {
                    self.fail(event_loop, err);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}
