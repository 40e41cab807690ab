use crate::engine::rendering::backend::{FixedFunctionApi, ShaderBackend};
use crate::engine::rendering::error::{BackendError, MissingBlockErr};
use crate::engine::rendering::shader::{CompiledStage, Stage, UniformBlock, UniformTable};
use crate::engine::rendering::state_cache::{ClientArray, CompareFunc, MatrixMode};
use log::trace;
use std::borrow::Cow;
use std::collections::HashMap;
use wgpu::{
    Buffer, BufferDescriptor, BufferUsages, Device, Queue, ShaderModule, ShaderModuleDescriptor,
    ShaderSource,
};

/// Uniform buffer bindings need sizes in multiples of 16 bytes.
const UNIFORM_ALIGNMENT: u64 = 16;

/// Native side of a linked program: one module per stage and one uniform
/// buffer per reflected block.
#[derive(Debug)]
pub struct WgpuProgram {
    pub modules: Vec<(Stage, String, ShaderModule)>,
    pub buffers: HashMap<(u32, u32), Buffer>,
}

impl WgpuProgram {
    pub fn module(&self, stage: Stage) -> Option<(&str, &ShaderModule)> {
        self.modules
            .iter()
            .find(|(s, _, _)| *s == stage)
            .map(|(_, entry, module)| (entry.as_str(), module))
    }

    pub fn buffer(&self, group: u32, binding: u32) -> Option<&Buffer> {
        self.buffers.get(&(group, binding))
    }
}

pub struct WgpuShaderBackend {
    device: Device,
    queue: Queue,
}

impl WgpuShaderBackend {
    pub fn new(device: Device, queue: Queue) -> Self {
        WgpuShaderBackend { device, queue }
    }

    #[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
    pub fn from_context(gpu: &crate::windowing::GpuContext) -> Self {
        Self::new(gpu.device.clone(), gpu.queue.clone())
    }
}

impl ShaderBackend for WgpuShaderBackend {
    type Program = WgpuProgram;

    fn supports_unsigned(&self) -> bool {
        true
    }

    fn link(
        &mut self,
        stages: &[&CompiledStage],
        table: &UniformTable,
    ) -> Result<WgpuProgram, BackendError> {
        let modules = stages
            .iter()
            .map(|stage| {
                let module = self.device.create_shader_module(ShaderModuleDescriptor {
                    label: Some(stage.entry_point.as_str()),
                    source: ShaderSource::Naga(Cow::Owned(stage.module.clone())),
                });
                (stage.stage, stage.entry_point.clone(), module)
            })
            .collect();

        let buffers = table
            .blocks()
            .iter()
            .map(|block| {
                let size = u64::from(block.size.max(1)).next_multiple_of(UNIFORM_ALIGNMENT);
                let buffer = self.device.create_buffer(&BufferDescriptor {
                    label: Some("Shader Constants"),
                    size,
                    usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                ((block.group, block.binding), buffer)
            })
            .collect();

        Ok(WgpuProgram { modules, buffers })
    }

    fn bind(&mut self, program: &WgpuProgram) -> Result<(), BackendError> {
        trace!("Binding program with {} stage(s)", program.modules.len());
        Ok(())
    }

    fn upload(
        &mut self,
        program: &WgpuProgram,
        block: &UniformBlock,
        offset: u32,
        bytes: &[u8],
    ) -> Result<(), BackendError> {
        let Some(buffer) = program.buffer(block.group, block.binding) else {
            return MissingBlockErr {
                group: block.group,
                binding: block.binding,
            }
            .fail();
        };
        self.queue.write_buffer(buffer, u64::from(offset), bytes);
        Ok(())
    }

    fn destroy(&mut self, program: WgpuProgram) {
        for buffer in program.buffers.values() {
            buffer.destroy();
        }
    }
}

/// Fixed-function state packed the way pipelines consume it.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PipelineKey {
    pub alpha_test: bool,
    pub alpha_func: CompareFunc,
    pub alpha_ref_bits: u32,
    pub client_arrays: u8,
    pub client_active_texture: u32,
    pub matrix_mode: MatrixMode,
}

/// Emulates the fixed-function calls on wgpu. Alpha testing is exposed to
/// shaders as pipeline-overridable constants; every change bumps
/// [`WgpuFixedFunction::revision`] so dependent pipelines get rebuilt.
#[derive(Debug)]
pub struct WgpuFixedFunction {
    key: PipelineKey,
    revision: u64,
    max_texture_units: u32,
}

impl WgpuFixedFunction {
    pub fn new(max_texture_units: u32) -> Self {
        WgpuFixedFunction {
            key: PipelineKey::default(),
            revision: 0,
            max_texture_units,
        }
    }

    pub fn key(&self) -> PipelineKey {
        self.key
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Values for the `alpha_test`, `alpha_func` and `alpha_ref` override
    /// constants of a fragment shader.
    pub fn override_constants(&self) -> [(&'static str, f64); 3] {
        [
            ("alpha_test", if self.key.alpha_test { 1.0 } else { 0.0 }),
            ("alpha_func", f64::from(self.key.alpha_func as u32)),
            ("alpha_ref", f64::from(f32::from_bits(self.key.alpha_ref_bits))),
        ]
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

impl FixedFunctionApi for WgpuFixedFunction {
    fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    fn set_alpha_test(&mut self, enabled: bool) {
        self.key.alpha_test = enabled;
        self.touch();
    }

    fn set_alpha_func(&mut self, func: CompareFunc, reference: f32) {
        self.key.alpha_func = func;
        self.key.alpha_ref_bits = reference.to_bits();
        self.touch();
    }

    fn set_client_array(&mut self, array: ClientArray, enabled: bool) {
        let bit = 1 << array as u8;
        if enabled {
            self.key.client_arrays |= bit;
        } else {
            self.key.client_arrays &= !bit;
        }
        self.touch();
    }

    fn set_client_active_texture(&mut self, unit: u32) {
        self.key.client_active_texture = unit;
        self.touch();
    }

    fn set_matrix_mode(&mut self, mode: MatrixMode) {
        self.key.matrix_mode = mode;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rendering::state_cache::StateCache;

    #[test]
    fn redundant_changes_do_not_invalidate_pipelines() {
        let mut cache = StateCache::new(WgpuFixedFunction::new(8));
        let after_defaults = cache.api().revision();

        cache.set_alpha_test(true);
        cache.set_alpha_test(true);
        cache.set_alpha_func(CompareFunc::Greater, 0.5);
        cache.set_alpha_func(CompareFunc::Greater, 0.5);

        assert_eq!(cache.api().revision(), after_defaults + 2);
        let overrides = cache.api().override_constants();
        assert_eq!(overrides[0], ("alpha_test", 1.0));
        assert_eq!(overrides[2], ("alpha_ref", 0.5));
    }
}
