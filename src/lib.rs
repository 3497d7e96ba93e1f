pub mod animation;
pub mod app;
pub mod controls;
pub mod error;
pub mod loader;
pub mod material;
pub mod render_loop;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod stage;
pub mod state;
pub mod texture;
pub mod ui;

pub const CONFY_APP_NAME: &str = "glbview";
