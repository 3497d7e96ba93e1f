use std::sync::Arc;

use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use log::{debug, info};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

use crate::controls::{ControlBinder, ControlContext, MorphPanel};
use crate::error::ViewerError;
use crate::loader::{AssetLoadResult, on_load, spawn_load};
use crate::render_loop;
use crate::renderer::Renderer;
use crate::renderer::camera::OrbitController;
use crate::settings::Settings;
use crate::stage::{Stage, Viewport};
use crate::state::ViewerState;
use crate::ui::ControlPanel;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

pub struct App {
    pub window: Arc<Window>,
    renderer: Renderer,
    stage: Stage,
    state: ViewerState,
    orbit: OrbitController,
    binder: ControlBinder,
    morph_panel: Option<MorphPanel>,
    ui: ControlPanel,
    egui_ctx: egui::Context,
    egui_state: State,
    egui_wants_pointer: bool,
    settings: Settings,
    load_rx: UnboundedReceiver<AssetLoadResult>,
}

impl App {
    /// Builds the stage and the GPU side for `window`, then starts loading
    /// `source` in the background.
    pub async fn new(
        window: Arc<Window>,
        runtime: Handle,
        settings: Settings,
        source: String,
    ) -> Result<Self, ViewerError> {
        let size = window.inner_size();
        let stage = Stage::bootstrap(
            Viewport {
                width: size.width,
                height: size.height,
            },
            &settings.display,
        )?;

        let renderer = Renderer::new(window.clone(), &stage, &settings.display).await?;

        let egui_ctx = egui::Context::default();
        let egui_state = State::new(
            egui_ctx.clone(),
            egui::viewport::ViewportId::ROOT,
            &*window,
            None,
            None,
            None,
        );

        let orbit = OrbitController::for_camera(&stage.camera);
        let binder = ControlBinder::bind(&settings.controls);
        let morph_panel = settings.controls.morph_panel.then(MorphPanel::new);

        let (load_tx, load_rx) = mpsc::unbounded_channel();
        info!("Loading asset '{}'", source);
        spawn_load(&runtime, source, load_tx);

        Ok(Self {
            window,
            renderer,
            stage,
            state: ViewerState::new(),
            orbit,
            binder,
            morph_panel,
            ui: ControlPanel::new(),
            egui_ctx,
            egui_state,
            egui_wants_pointer: false,
            settings,
            load_rx,
        })
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        let egui_response = self.egui_state.on_window_event(&self.window, event);
        if egui_response.consumed {
            return EventResponse {
                repaint: egui_response.repaint,
                exit: false,
            };
        }

        match event {
            WindowEvent::CloseRequested => {
                return EventResponse {
                    repaint: false,
                    exit: true,
                };
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape)
                {
                    return EventResponse {
                        repaint: false,
                        exit: true,
                    };
                }
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                self.stage.resize(size.width, size.height);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                // Releases always go through so a drag never sticks
                if !pressed || !self.egui_wants_pointer {
                    self.orbit.on_mouse_button(*button, pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let height = self.stage.viewport().height;
                if self.orbit.on_mouse_move((position.x, position.y), height) {
                    return EventResponse {
                        repaint: true,
                        exit: false,
                    };
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !self.egui_wants_pointer {
                    let lines = match delta {
                        MouseScrollDelta::LineDelta(_, y) => *y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                    };
                    self.orbit.on_scroll(lines);
                }
            }
            _ => {}
        }

        EventResponse {
            repaint: egui_response.repaint,
            exit: false,
        }
    }

    /// Hands a finished background load to the pipeline. A failed load
    /// leaves the stage empty.
    fn poll_load(&mut self) {
        while let Ok(result) = self.load_rx.try_recv() {
            match result {
                AssetLoadResult::Loaded { source, asset } => {
                    info!("Asset '{}' ready", source);
                    on_load(
                        asset,
                        &mut self.stage,
                        &mut self.state,
                        self.morph_panel.as_mut(),
                    );
                }
                AssetLoadResult::Failed { source, error } => {
                    debug!("Viewer stays empty, '{}' did not load: {}", source, error);
                }
            }
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.poll_load();

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut events = Vec::new();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            events = self.ui.show(
                ctx,
                &self.settings.ui,
                &self.binder,
                &self.state,
                self.morph_panel.as_ref(),
            );
        });
        self.egui_wants_pointer = self.egui_ctx.wants_pointer_input();

        let mut ctx = ControlContext {
            state: &mut self.state,
            graph: &mut self.stage.graph,
            orbit: &mut self.orbit,
            morph_panel: self.morph_panel.as_mut(),
        };
        for event in events {
            self.binder.dispatch(event, &mut ctx);
        }

        render_loop::advance(&mut self.state, &mut self.orbit, &mut self.stage);

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = self.window.inner_size();
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        self.renderer.render(
            &mut self.stage,
            paint_jobs,
            full_output.textures_delta,
            screen_descriptor,
        )
    }

    /// Re-applies the surface configuration after it was lost or went stale.
    pub fn recover_surface(&mut self) {
        self.renderer.reconfigure();
    }
}
