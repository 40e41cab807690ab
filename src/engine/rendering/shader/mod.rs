pub mod binder;
pub mod reflect;

pub use binder::{ConstantData, ConstantServices, ProgramId, ShaderBinder};
pub use reflect::{
    ConstantId, ConstantKind, UniformBlock, UniformEntry, UniformLocation, UniformTable,
};

use crate::engine::rendering::error::{CompileError, MissingEntryPointErr, UnknownProfileErr};
use crate::utils::checks::{SourceLanguage, check_source};
use log::{debug, error};
use naga::valid::ModuleInfo;
use naga::{Module, ShaderStage};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn naga(self) -> ShaderStage {
        match self {
            Stage::Vertex => ShaderStage::Vertex,
            Stage::Fragment => ShaderStage::Fragment,
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Vertex => write!(f, "vertex"),
            Stage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Source text of one stage plus how to compile it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSource<'a> {
    pub source: &'a str,
    pub entry_point: &'a str,
    pub profile: &'a str,
}

impl<'a> StageSource<'a> {
    pub fn wgsl(source: &'a str, entry_point: &'a str) -> Self {
        StageSource {
            source,
            entry_point,
            profile: "wgsl",
        }
    }
}

/// A parsed and validated stage with its reflected constants.
#[derive(Debug, Clone)]
pub struct CompiledStage {
    pub stage: Stage,
    pub entry_point: String,
    pub module: Module,
    pub info: ModuleInfo,
    pub uniforms: UniformTable,
}

pub fn compile_stage(stage: Stage, source: StageSource<'_>) -> Result<CompiledStage, CompileError> {
    let result = compile_stage_inner(stage, source);
    if let Err(e) = &result {
        error!("Failed to compile {stage} shader: {}", e.diagnostic());
    }
    result
}

fn compile_stage_inner(
    stage: Stage,
    source: StageSource<'_>,
) -> Result<CompiledStage, CompileError> {
    let Some(language) = SourceLanguage::from_profile(source.profile) else {
        return UnknownProfileErr {
            profile: source.profile,
        }
        .fail();
    };

    let (module, info) = check_source(language, stage.naga(), source.source).map_err(|e| {
        let stage = stage.to_string();
        let diagnostic = e.emit_to_string(source.source);
        if e.is_parse_error() {
            CompileError::Parse { stage, diagnostic }
        } else {
            CompileError::Validation { stage, diagnostic }
        }
    })?;

    let has_entry = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage.naga() && ep.name == source.entry_point);
    if !has_entry {
        return MissingEntryPointErr {
            stage: stage.to_string(),
            entry_point: source.entry_point,
        }
        .fail();
    }

    let uniforms = UniformTable::reflect(&module);
    debug!(
        "Compiled {stage} shader '{}' with {} constants",
        source.entry_point,
        uniforms.len()
    );

    Ok(CompiledStage {
        stage,
        entry_point: source.entry_point.to_string(),
        module,
        info,
        uniforms,
    })
}
