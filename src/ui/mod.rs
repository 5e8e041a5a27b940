pub mod controls;
pub mod lamp;
pub mod spectrum;

pub use controls::*;
pub use lamp::*;
pub use spectrum::*;
