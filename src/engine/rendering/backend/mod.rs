//! Native GPU APIs the shader binder and the state cache drive.

pub mod wgpu_backend;

pub use wgpu_backend::{WgpuFixedFunction, WgpuProgram, WgpuShaderBackend};

use crate::engine::rendering::error::BackendError;
use crate::engine::rendering::shader::{CompiledStage, UniformBlock, UniformTable};
use crate::engine::rendering::state_cache::{ClientArray, CompareFunc, MatrixMode};

/// Program creation and constant upload on a native API.
pub trait ShaderBackend {
    type Program;

    /// Whether unsigned integer constants can be uploaded as such.
    fn supports_unsigned(&self) -> bool;

    fn link(
        &mut self,
        stages: &[&CompiledStage],
        table: &UniformTable,
    ) -> Result<Self::Program, BackendError>;

    fn bind(&mut self, program: &Self::Program) -> Result<(), BackendError>;

    /// Writes `bytes` at `offset` into the given uniform block.
    fn upload(
        &mut self,
        program: &Self::Program,
        block: &UniformBlock,
        offset: u32,
        bytes: &[u8],
    ) -> Result<(), BackendError>;

    fn destroy(&mut self, program: Self::Program);
}

/// The fixed-function state calls a [`StateCache`](crate::engine::rendering::StateCache)
/// filters. Implementors issue the call unconditionally.
pub trait FixedFunctionApi {
    fn max_texture_units(&self) -> u32;

    fn set_alpha_test(&mut self, enabled: bool);

    fn set_alpha_func(&mut self, func: CompareFunc, reference: f32);

    fn set_client_array(&mut self, array: ClientArray, enabled: bool);

    fn set_client_active_texture(&mut self, unit: u32);

    fn set_matrix_mode(&mut self, mode: MatrixMode);
}
