#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod engine;
pub mod utils;
pub mod windowing;

pub use engine::*;
pub use windowing::*;

pub use ::gilrs;
pub use ::log;
pub use ::winit;
