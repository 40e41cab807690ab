pub mod checks;

pub use checks::*;
