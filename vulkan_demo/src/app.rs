use vkboot::winit;
use vkboot::winit::event::{ElementState, KeyEvent, WindowEvent};
use vkboot::winit::keyboard::{KeyCode, PhysicalKey};

use crate::settings::DemoSettings;

pub struct App {
    settings: DemoSettings,
    // Declared before the window so it is dropped first
    render_context: Option<vkboot::RenderContext>,
    window: Option<winit::window::Window>,
    /// First failure, returned from `main` once the loop stops
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(settings: DemoSettings) -> Self {
        Self {
            settings,
            render_context: None,
            window: None,
            error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &winit::event_loop::ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.error.get_or_insert(error);
        self.render_context = None;
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop.create_window(
            winit::window::WindowAttributes::default()
                .with_title(self.settings.title.clone())
                .with_inner_size(winit::dpi::PhysicalSize::new(
                    self.settings.width,
                    self.settings.height,
                ))
                .with_resizable(self.settings.resizable),
        )?;
        let render_context = vkboot::RenderContext::new(&self.settings.app_settings(), &window)?;
        self.render_context = Some(render_context);
        self.window = Some(window);
        Ok(())
    }

    /// Releases the render context before the window it presents to
    fn shutdown(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(render_context) = self.render_context.take() {
            drop(render_context);
        }
        event_loop.exit();
    }
}

impl winit::application::ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }
        if let Err(error) = self.init(event_loop) {
            self.fail(event_loop, error);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        self.render_context = None;
        self.window = None;
    }
}
