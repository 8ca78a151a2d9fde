use tracing_subscriber::FmtSubscriber;

use vkboot::winit;

mod app;
mod settings;

fn main() -> anyhow::Result<()> {
    let settings = settings::DemoSettings::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let event_loop = winit::event_loop::EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);
    let mut app = app::App::new(settings);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
