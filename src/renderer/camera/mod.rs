mod controller;
mod state;

pub use controller::OrbitController;
pub use state::OrbitState;
