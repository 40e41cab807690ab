pub mod backend;
pub mod error;
pub mod material;
pub mod shader;
pub mod state_cache;

pub use backend::{FixedFunctionApi, ShaderBackend, WgpuFixedFunction, WgpuShaderBackend};
pub use error::*;
pub use material::{MaterialParams, MaterialRenderer, ShaderConstantCallback};
pub use shader::*;
pub use state_cache::{CachedGpuState, ClientArray, CompareFunc, MatrixMode, StateCache};
