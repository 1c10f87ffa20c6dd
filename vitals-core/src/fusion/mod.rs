//! Response fusion engine

mod engine;
mod key_points;

pub use engine::{FusionEngine, NO_INFORMATION};
pub use key_points::extract_key_points;
