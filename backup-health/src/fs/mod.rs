//! Filesystem access for backup generations.

pub mod generations;
pub mod sizer;

pub use generations::{list_generation_dirs, list_generations};
pub use sizer::size_generation;
