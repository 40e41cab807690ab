#![allow(dead_code)]

use irrlicht::engine::rendering::{
    BackendError, ClientArray, CompareFunc, CompiledStage, FixedFunctionApi, MatrixMode,
    ShaderBackend, UniformBlock, UniformTable,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, OnceLock};

/// Prints through env_logger and keeps every warning and error so tests
/// can check what was reported.
struct CapturingLogger {
    inner: env_logger::Logger,
    warnings: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() <= Level::Warn
            && let Ok(mut warnings) = self.warnings.lock()
        {
            warnings.push((record.level(), record.args().to_string()));
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<CapturingLogger> = OnceLock::new();

pub fn init_logging() {
    let logger = LOGGER.get_or_init(|| CapturingLogger {
        inner: env_logger::Builder::from_default_env().is_test(true).build(),
        warnings: Mutex::new(Vec::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.inner.filter().max(LevelFilter::Warn));
    }
}

/// Every warning and error logged since the last call.
pub fn take_warnings() -> Vec<(Level, String)> {
    LOGGER
        .get()
        .map(|logger| std::mem::take(&mut *logger.warnings.lock().unwrap()))
        .unwrap_or_default()
}

pub const WGSL_SHADER: &str = r#"
struct Globals {
    tint: vec4<f32>,
    frame: i32,
    flags: u32,
    time: f32,
}

@group(0) @binding(0) var<uniform> globals: Globals;
@group(0) @binding(1) var<uniform> exposure: f32;
@group(1) @binding(0) var albedo: texture_2d<f32>;
@group(1) @binding(1) var albedo_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let x = f32(index & 1u) * globals.time;
    return vec4<f32>(x, 0.0, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return globals.tint * exposure * textureSample(albedo, albedo_sampler, vec2<f32>(0.5));
}
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub program: u32,
    pub group: u32,
    pub binding: u32,
    pub offset: u32,
    pub bytes: Vec<u8>,
}

/// Native programs are plain serial numbers.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub unsigned: bool,
    pub fail_uploads: bool,
    pub next_program: u32,
    pub linked_stages: Vec<usize>,
    pub binds: Vec<u32>,
    pub uploads: Vec<Upload>,
    pub destroyed: Vec<u32>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        RecordingBackend {
            unsigned: true,
            ..Default::default()
        }
    }

    pub fn without_unsigned() -> Self {
        RecordingBackend::default()
    }
}

impl ShaderBackend for RecordingBackend {
    type Program = u32;

    fn supports_unsigned(&self) -> bool {
        self.unsigned
    }

    fn link(
        &mut self,
        stages: &[&CompiledStage],
        _table: &UniformTable,
    ) -> Result<u32, BackendError> {
        self.linked_stages.push(stages.len());
        self.next_program += 1;
        Ok(self.next_program)
    }

    fn bind(&mut self, program: &u32) -> Result<(), BackendError> {
        self.binds.push(*program);
        Ok(())
    }

    fn upload(
        &mut self,
        program: &u32,
        block: &UniformBlock,
        offset: u32,
        bytes: &[u8],
    ) -> Result<(), BackendError> {
        if self.fail_uploads {
            return Err(BackendError::Native {
                reason: "upload refused".to_string(),
            });
        }
        self.uploads.push(Upload {
            program: *program,
            group: block.group,
            binding: block.binding,
            offset,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn destroy(&mut self, program: u32) {
        self.destroyed.push(program);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateCall {
    AlphaTest(bool),
    AlphaFunc(CompareFunc, f32),
    ClientArray(ClientArray, bool),
    ClientActiveTexture(u32),
    MatrixMode(MatrixMode),
}

#[derive(Debug)]
pub struct CountingApi {
    pub max_units: u32,
    pub calls: Vec<StateCall>,
}

impl CountingApi {
    pub fn new(max_units: u32) -> Self {
        CountingApi {
            max_units,
            calls: Vec::new(),
        }
    }
}

impl FixedFunctionApi for CountingApi {
    fn max_texture_units(&self) -> u32 {
        self.max_units
    }

    fn set_alpha_test(&mut self, enabled: bool) {
        self.calls.push(StateCall::AlphaTest(enabled));
    }

    fn set_alpha_func(&mut self, func: CompareFunc, reference: f32) {
        self.calls.push(StateCall::AlphaFunc(func, reference));
    }

    fn set_client_array(&mut self, array: ClientArray, enabled: bool) {
        self.calls.push(StateCall::ClientArray(array, enabled));
    }

    fn set_client_active_texture(&mut self, unit: u32) {
        self.calls.push(StateCall::ClientActiveTexture(unit));
    }

    fn set_matrix_mode(&mut self, mode: MatrixMode) {
        self.calls.push(StateCall::MatrixMode(mode));
    }
}
