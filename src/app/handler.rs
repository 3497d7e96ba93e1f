use std::sync::Arc;

use log::{error, warn};
use tokio::runtime::Runtime;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use super::app::App;
use crate::error::ViewerError;
use crate::settings::Settings;

pub struct AppHandler {
    pub app: Option<App>,
    pub source: String,
    pub settings: Settings,
    pub runtime: Runtime,
    /// Startup failure that ended the event loop
    pub error: Option<ViewerError>,
}

impl AppHandler {
    pub fn new(source: String, settings: Settings, runtime: Runtime) -> Self {
        Self {
            app: None,
            source,
            settings,
            runtime,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<App, ViewerError> {
        let display = &self.settings.display;
        let window_attrs = Window::default_attributes()
            .with_title("glbview")
            .with_inner_size(winit::dpi::LogicalSize::new(
                display.window_width,
                display.window_height,
            ))
            .with_transparent(display.transparent_background);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let runtime_handle = self.runtime.handle().clone();
        self.runtime.block_on(App::new(
            window,
            runtime_handle,
            self.settings.clone(),
            self.source.clone(),
        ))
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                error!("Startup failed: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            match app.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    app.recover_surface();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("Surface out of memory, exiting");
                    event_loop.exit();
                }
                Err(e) => warn!("Render error: {:?}", e),
            }
            app.window.request_redraw();
        }
    }
}
