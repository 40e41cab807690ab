use crate::engine::rendering::backend::ShaderBackend;
use crate::engine::rendering::error::{
    BindErr, CompileError, ConstantError, LinkError, NativeLinkErr, NoStagesErr, ResetErr,
    TooLargeErr, TypeMismatchErr, UnknownProgramErr, UnresolvedErr, UnsupportedOnBackendErr,
    UploadErr,
};
use crate::engine::rendering::shader::reflect::{
    ConstantId, ConstantKind, UniformLocation, UniformTable,
};
use crate::engine::rendering::shader::{CompiledStage, Stage, StageSource, compile_stage};
use itertools::Itertools;
use log::{debug, error, warn};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use snafu::{OptionExt, ResultExt, ensure};

new_key_type! { pub struct ProgramId; }

/// Constant data in one of the three numeric paths.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ConstantData<'a> {
    Float(&'a [f32]),
    Int(&'a [i32]),
    Uint(&'a [u32]),
}

impl ConstantData<'_> {
    pub fn kind(&self) -> ConstantKind {
        match self {
            ConstantData::Float(_) => ConstantKind::Float,
            ConstantData::Int(_) => ConstantKind::Int,
            ConstantData::Uint(_) => ConstantKind::Uint,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            ConstantData::Float(v) => bytemuck::cast_slice(v),
            ConstantData::Int(v) => bytemuck::cast_slice(v),
            ConstantData::Uint(v) => bytemuck::cast_slice(v),
        }
    }
}

struct Program<P> {
    native: P,
    table: UniformTable,
    /// Declared default contents of every uniform block.
    defaults: Vec<Vec<u8>>,
    /// Per-instance contents, reset from `defaults` on activation.
    memory: Vec<Vec<u8>>,
}

/// Where a validated constant write lands.
struct Write {
    block: usize,
    offset: u32,
}

/// Compiles and links programs, resolves their constants by name and
/// uploads constant data through a [`ShaderBackend`].
pub struct ShaderBinder<B: ShaderBackend> {
    backend: B,
    programs: SlotMap<ProgramId, Program<B::Program>>,
    active: Option<ProgramId>,
}

impl<B: ShaderBackend> ShaderBinder<B> {
    pub fn new(backend: B) -> Self {
        ShaderBinder {
            backend,
            programs: SlotMap::with_key(),
            active: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn compile(
        &self,
        stage: Stage,
        source: StageSource<'_>,
    ) -> Result<CompiledStage, CompileError> {
        compile_stage(stage, source)
    }

    /// Links the given stages. Either stage may be left out, but not both.
    pub fn link(
        &mut self,
        vertex: Option<&CompiledStage>,
        fragment: Option<&CompiledStage>,
    ) -> Result<ProgramId, LinkError> {
        let stages: SmallVec<[&CompiledStage; 2]> = vertex.into_iter().chain(fragment).collect();
        ensure!(!stages.is_empty(), NoStagesErr);

        let mut table = UniformTable::default();
        for stage in &stages {
            table.merge(&stage.uniforms);
        }

        let native = self.backend.link(&stages, &table).context(NativeLinkErr)?;
        let defaults: Vec<Vec<u8>> = table
            .blocks()
            .iter()
            .map(|block| vec![0; block.size as usize])
            .collect();

        debug!(
            "Linked program with {} stage(s) and constants [{}]",
            stages.len(),
            table.names().join(", ")
        );

        Ok(self.programs.insert(Program {
            native,
            memory: defaults.clone(),
            defaults,
            table,
        }))
    }

    /// Makes `program` current and resets its constants to their declared
    /// defaults.
    pub fn use_program(&mut self, program: ProgramId) -> Result<(), ConstantError> {
        let slot = self.programs.get_mut(program).context(UnknownProgramErr)?;

        self.backend.bind(&slot.native).context(BindErr)?;
        self.active = Some(program);

        slot.memory.clone_from(&slot.defaults);
        for (block, bytes) in slot.table.blocks().iter().zip(&slot.memory) {
            if bytes.is_empty() {
                continue;
            }
            self.backend
                .upload(&slot.native, block, 0, bytes)
                .context(ResetErr {
                    group: block.group,
                    binding: block.binding,
                })
                .inspect_err(|e| warn!("{e}"))?;
        }
        Ok(())
    }

    pub fn active_program(&self) -> Option<ProgramId> {
        self.active
    }

    /// Looks `name` up in the program's constant table. A miss is logged
    /// together with every name that would have resolved.
    pub fn resolve_constant(&self, program: ProgramId, name: &str) -> ConstantId {
        let Some(slot) = self.programs.get(program) else {
            return ConstantId::INVALID;
        };

        let id = slot.table.resolve(name);
        if !id.is_valid() {
            warn!("Shader constant not found: {name}");
            warn!(
                "Available constants: {}",
                slot.table.names().map(|n| format!("'{n}'")).join(", ")
            );
        }
        id
    }

    pub fn available_constants(&self, program: ProgramId) -> Vec<&str> {
        self.programs
            .get(program)
            .map(|slot| slot.table.names().collect())
            .unwrap_or_default()
    }

    pub fn uniform_table(&self, program: ProgramId) -> Option<&UniformTable> {
        self.programs.get(program).map(|slot| &slot.table)
    }

    /// Current instance bytes of a constant.
    pub fn constant_bytes(&self, program: ProgramId, id: ConstantId) -> Option<&[u8]> {
        let slot = self.programs.get(program)?;
        match slot.table.get(id)?.location {
            UniformLocation::Buffer {
                block,
                offset,
                size,
            } => {
                let start = offset as usize;
                slot.memory.get(block)?.get(start..start + size as usize)
            }
            UniformLocation::Binding { .. } => None,
        }
    }

    /// Uploads `data` into a constant of `program`.
    ///
    /// Samplers are bound elsewhere, so setting one succeeds without doing
    /// anything.
    pub fn set_constant(
        &mut self,
        program: ProgramId,
        id: ConstantId,
        data: ConstantData<'_>,
    ) -> Result<(), ConstantError> {
        let unsigned = self.backend.supports_unsigned();
        let slot = self.programs.get_mut(program).context(UnknownProgramErr)?;
        let Some(write) = check_write(&slot.table, id, &data, unsigned)? else {
            return Ok(());
        };

        let bytes = data.bytes();
        let start = write.offset as usize;
        if let Some(memory) = slot.memory.get_mut(write.block) {
            memory[start..start + bytes.len()].copy_from_slice(bytes);
        }

        let block = &slot.table.blocks()[write.block];
        if let Err(e) = self.backend.upload(&slot.native, block, write.offset, bytes) {
            let name = slot.table.get(id).map(|e| e.name.clone()).unwrap_or_default();
            warn!("Error setting shader constant '{name}': {e}");
            return Err(e).context(UploadErr { name });
        }
        Ok(())
    }

    /// Changes the value `name` is reset to each time the program is
    /// activated.
    pub fn set_default_constant(
        &mut self,
        program: ProgramId,
        id: ConstantId,
        data: ConstantData<'_>,
    ) -> Result<(), ConstantError> {
        let unsigned = self.backend.supports_unsigned();
        let slot = self.programs.get_mut(program).context(UnknownProgramErr)?;
        let Some(write) = check_write(&slot.table, id, &data, unsigned)? else {
            return Ok(());
        };

        let bytes = data.bytes();
        let start = write.offset as usize;
        if let Some(defaults) = slot.defaults.get_mut(write.block) {
            defaults[start..start + bytes.len()].copy_from_slice(bytes);
        }
        Ok(())
    }

    /// Releases the native program. Returns `false` for unknown ids.
    pub fn destroy_program(&mut self, program: ProgramId) -> bool {
        let Some(slot) = self.programs.remove(program) else {
            return false;
        };
        if self.active == Some(program) {
            self.active = None;
        }
        self.backend.destroy(slot.native);
        true
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

fn check_write(
    table: &UniformTable,
    id: ConstantId,
    data: &ConstantData<'_>,
    supports_unsigned: bool,
) -> Result<Option<Write>, ConstantError> {
    let entry = table.get(id).context(UnresolvedErr { slot: id.0 })?;

    let (block, offset, size) = match entry.location {
        UniformLocation::Binding { .. } => return Ok(None),
        UniformLocation::Buffer {
            block,
            offset,
            size,
        } => (block, offset, size),
    };

    if data.kind() == ConstantKind::Uint && !supports_unsigned {
        error!(
            "Shader constant '{}': this backend does not support unsigned integer constants",
            entry.name
        );
        return UnsupportedOnBackendErr {
            name: entry.name.clone(),
        }
        .fail();
    }

    ensure!(
        data.kind() == entry.kind,
        TypeMismatchErr {
            name: entry.name.clone(),
            expected: entry.kind,
            actual: data.kind(),
        }
    );

    let len = data.bytes().len();
    ensure!(
        len <= size as usize,
        TooLargeErr {
            name: entry.name.clone(),
            capacity: size,
            len,
        }
    );

    Ok(Some(Write { block, offset }))
}

/// What a [`ShaderConstantCallback`](crate::engine::rendering::ShaderConstantCallback)
/// sees of the binder: name resolution and constant upload for the program
/// being drawn with.
pub struct ConstantServices<'a, B: ShaderBackend> {
    binder: &'a mut ShaderBinder<B>,
    program: ProgramId,
}

impl<'a, B: ShaderBackend> ConstantServices<'a, B> {
    pub fn new(binder: &'a mut ShaderBinder<B>, program: ProgramId) -> Self {
        ConstantServices { binder, program }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn resolve(&self, name: &str) -> ConstantId {
        self.binder.resolve_constant(self.program, name)
    }

    /// Sets a constant, reporting failure as `false`. Failures are already
    /// logged by the binder.
    pub fn set(&mut self, id: ConstantId, data: ConstantData<'_>) -> bool {
        self.binder.set_constant(self.program, id, data).is_ok()
    }

    pub fn set_float(&mut self, id: ConstantId, values: &[f32]) -> bool {
        self.set(id, ConstantData::Float(values))
    }

    pub fn set_int(&mut self, id: ConstantId, values: &[i32]) -> bool {
        self.set(id, ConstantData::Int(values))
    }

    pub fn set_uint(&mut self, id: ConstantId, values: &[u32]) -> bool {
        self.set(id, ConstantData::Uint(values))
    }
}
