pub mod capture;
pub mod devices;
pub mod state;

pub use capture::LineCapture;
pub use state::LampState;
