use glbview::app::AppHandler;
use glbview::loader::DEFAULT_ASSET;
use glbview::settings::Settings;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // First argument overrides the bundled asset path
    let source = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ASSET.to_string());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler::new(source, Settings::load(), tokio::runtime::Runtime::new()?);
    event_loop.run_app(&mut handler)?;

    if let Some(err) = handler.error.take() {
        return Err(err.into());
    }
    Ok(())
}
