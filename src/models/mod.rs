//! Data models

pub mod input;
pub mod prediction;

pub use input::*;
pub use prediction::*;
