pub mod event;
pub mod input;
pub mod keycodes;
pub mod rendering;

pub use event::*;
pub use keycodes::Key;
