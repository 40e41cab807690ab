use crate::engine::rendering::shader::ConstantKind;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub))]
pub enum BackendError {
    #[snafu(display("Native call failed: {reason}"))]
    Native { reason: String },

    #[snafu(display("Uniform block {group}:{binding} does not exist in the native program"))]
    MissingBlock { group: u32, binding: u32 },
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub))]
pub enum CompileError {
    #[snafu(display("Unknown shader target profile '{profile}'"))]
    UnknownProfile { profile: String },

    #[snafu(display("Could not parse {stage} shader:\n{diagnostic}"))]
    Parse { stage: String, diagnostic: String },

    #[snafu(display("Could not validate {stage} shader:\n{diagnostic}"))]
    Validation { stage: String, diagnostic: String },

    #[snafu(display("{stage} shader has no entry point named '{entry_point}'"))]
    MissingEntryPoint { stage: String, entry_point: String },
}

impl CompileError {
    /// Text suitable to show to whoever wrote the shader.
    pub fn diagnostic(&self) -> String {
        match self {
            CompileError::Parse { diagnostic, .. }
            | CompileError::Validation { diagnostic, .. } => diagnostic.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub))]
pub enum LinkError {
    #[snafu(display("A program needs at least one compiled stage"))]
    NoStages,

    #[snafu(display("Could not link program: {source}"))]
    NativeLink { source: BackendError },
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub))]
pub enum ConstantError {
    #[snafu(display("The program does not exist"))]
    UnknownProgram,

    #[snafu(display("Constant slot {slot} is not resolved"))]
    Unresolved { slot: i32 },

    #[snafu(display("Constant '{name}' is {expected:?}, got {actual:?} data"))]
    TypeMismatch {
        name: String,
        expected: ConstantKind,
        actual: ConstantKind,
    },

    #[snafu(display("Constant '{name}' holds {capacity} bytes, got {len}"))]
    TooLarge {
        name: String,
        capacity: u32,
        len: usize,
    },

    #[snafu(display("Constant '{name}': unsigned data is unsupported on this backend"))]
    UnsupportedOnBackend { name: String },

    #[snafu(display("Could not upload constant '{name}': {source}"))]
    Upload { name: String, source: BackendError },

    #[snafu(display("Could not bind program: {source}"))]
    Bind { source: BackendError },

    #[snafu(display("Could not reset uniform block {group}:{binding}: {source}"))]
    Reset {
        group: u32,
        binding: u32,
        source: BackendError,
    },
}
