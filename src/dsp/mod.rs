//! Per-frame signal chain, in the order the controller runs it:
//! sampler, spectrum, band selection, energy, AGC, renderer.

pub mod agc;
pub mod band;
pub mod energy;
pub mod render;
pub mod sampler;
pub mod spectrum;
pub mod window;

pub use agc::AutoGain;
pub use band::BandSelection;
pub use energy::band_energy;
pub use render::duty_from_level;
pub use sampler::{FrameTiming, Sampler};
pub use spectrum::Spectrum;
pub use window::HannWindow;
