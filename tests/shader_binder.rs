mod common;

use common::{RecordingBackend, WGSL_SHADER, init_logging};
use irrlicht::engine::rendering::{
    CompileError, ConstantData, ConstantError, ConstantId, LinkError, ProgramId, ShaderBinder,
    Stage, StageSource,
};

fn linked(backend: RecordingBackend) -> (ShaderBinder<RecordingBackend>, ProgramId) {
    init_logging();
    let mut binder = ShaderBinder::new(backend);
    let vertex = binder
        .compile(Stage::Vertex, StageSource::wgsl(WGSL_SHADER, "vs_main"))
        .unwrap();
    let fragment = binder
        .compile(Stage::Fragment, StageSource::wgsl(WGSL_SHADER, "fs_main"))
        .unwrap();
    let program = binder.link(Some(&vertex), Some(&fragment)).unwrap();
    (binder, program)
}

#[test]
fn both_stages_merge_into_one_table() {
    let (binder, program) = linked(RecordingBackend::new());

    assert_eq!(binder.backend().linked_stages, vec![2]);
    assert_eq!(
        binder.available_constants(program),
        vec!["tint", "frame", "flags", "time", "exposure", "albedo", "albedo_sampler"]
    );
    assert_eq!(binder.uniform_table(program).unwrap().blocks().len(), 2);
}

#[test]
fn resolution_is_deterministic_and_case_sensitive() {
    let (binder, program) = linked(RecordingBackend::new());

    let first = binder.resolve_constant(program, "exposure");
    assert!(first.is_valid());
    assert_eq!(binder.resolve_constant(program, "exposure"), first);
    assert_eq!(binder.resolve_constant(program, "Exposure"), ConstantId::INVALID);
    assert_eq!(binder.resolve_constant(program, "missing"), ConstantId(-1));
}

#[test]
fn float_constant_is_uploaded_at_its_offset() {
    let (mut binder, program) = linked(RecordingBackend::new());
    let time = binder.resolve_constant(program, "time");

    binder
        .set_constant(program, time, ConstantData::Float(&[2.5]))
        .unwrap();

    let upload = binder.backend().uploads.last().unwrap().clone();
    assert_eq!((upload.group, upload.binding, upload.offset), (0, 0, 24));
    assert_eq!(upload.bytes, 2.5f32.to_ne_bytes().to_vec());
    assert_eq!(
        binder.constant_bytes(program, time).unwrap()[..4],
        2.5f32.to_ne_bytes()
    );
}

#[test]
fn setting_a_sampler_is_a_no_op() {
    let (mut binder, program) = linked(RecordingBackend::new());
    let sampler = binder.resolve_constant(program, "albedo_sampler");

    let result = binder.set_constant(program, sampler, ConstantData::Int(&[1]));
    assert!(result.is_ok());
    assert!(binder.backend().uploads.is_empty());
}

#[test]
fn unsigned_data_needs_backend_support() {
    let (mut binder, program) = linked(RecordingBackend::without_unsigned());
    let flags = binder.resolve_constant(program, "flags");

    let result = binder.set_constant(program, flags, ConstantData::Uint(&[7]));
    assert!(matches!(
        result,
        Err(ConstantError::UnsupportedOnBackend { ref name }) if name == "flags"
    ));
    assert!(binder.backend().uploads.is_empty());

    let (mut binder, program) = linked(RecordingBackend::new());
    let flags = binder.resolve_constant(program, "flags");
    assert!(
        binder
            .set_constant(program, flags, ConstantData::Uint(&[7]))
            .is_ok()
    );
}

#[test]
fn mismatched_and_oversized_data_is_rejected() {
    let (mut binder, program) = linked(RecordingBackend::new());
    let frame = binder.resolve_constant(program, "frame");
    let tint = binder.resolve_constant(program, "tint");

    assert!(matches!(
        binder.set_constant(program, frame, ConstantData::Float(&[1.0])),
        Err(ConstantError::TypeMismatch { .. })
    ));
    assert!(matches!(
        binder.set_constant(program, tint, ConstantData::Float(&[1.0; 5])),
        Err(ConstantError::TooLarge { capacity: 16, len: 20, .. })
    ));
    assert!(matches!(
        binder.set_constant(program, ConstantId::INVALID, ConstantData::Float(&[1.0])),
        Err(ConstantError::Unresolved { slot: -1 })
    ));
    assert!(binder.backend().uploads.is_empty());
}

#[test]
fn use_program_resets_constants_to_defaults() {
    let (mut binder, program) = linked(RecordingBackend::new());
    let exposure = binder.resolve_constant(program, "exposure");

    binder
        .set_default_constant(program, exposure, ConstantData::Float(&[1.0]))
        .unwrap();
    binder.use_program(program).unwrap();
    assert_eq!(binder.active_program(), Some(program));
    assert_eq!(
        binder.constant_bytes(program, exposure).unwrap(),
        1.0f32.to_ne_bytes()
    );

    binder
        .set_constant(program, exposure, ConstantData::Float(&[4.0]))
        .unwrap();
    assert_eq!(
        binder.constant_bytes(program, exposure).unwrap(),
        4.0f32.to_ne_bytes()
    );

    binder.use_program(program).unwrap();
    assert_eq!(
        binder.constant_bytes(program, exposure).unwrap(),
        1.0f32.to_ne_bytes()
    );
    assert_eq!(binder.backend().binds.len(), 2);
}

#[test]
fn upload_failures_are_reported() {
    let (mut binder, program) = linked(RecordingBackend::new());
    let time = binder.resolve_constant(program, "time");
    binder.use_program(program).unwrap();

    let mut backend_failing = RecordingBackend::new();
    backend_failing.fail_uploads = true;
    let (mut failing, failing_program) = linked(backend_failing);

    assert!(binder.set_constant(program, time, ConstantData::Float(&[1.0])).is_ok());
    assert!(matches!(
        failing.set_constant(failing_program, time, ConstantData::Float(&[1.0])),
        Err(ConstantError::Upload { .. })
    ));
    assert!(matches!(
        failing.use_program(failing_program),
        Err(ConstantError::Reset { .. })
    ));
    assert_eq!(failing.active_program(), Some(failing_program));
}

#[test]
fn single_stage_programs_link() {
    init_logging();
    let mut binder = ShaderBinder::new(RecordingBackend::new());
    let fragment = binder
        .compile(Stage::Fragment, StageSource::wgsl(WGSL_SHADER, "fs_main"))
        .unwrap();

    let program = binder.link(None, Some(&fragment)).unwrap();
    assert!(binder.resolve_constant(program, "tint").is_valid());
    assert!(matches!(binder.link(None, None), Err(LinkError::NoStages)));
}

#[test]
fn glsl_stages_compile() {
    init_logging();
    let binder = ShaderBinder::new(RecordingBackend::new());
    let source = r#"#version 450
layout(set = 0, binding = 0) uniform Params {
    vec4 color;
    float strength;
};
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = color * strength;
}
"#;

    let stage = binder
        .compile(
            Stage::Fragment,
            StageSource {
                source,
                entry_point: "main",
                profile: "glsl450",
            },
        )
        .unwrap();
    assert!(stage.uniforms.resolve("strength").is_valid());
}

#[test]
fn compile_errors_carry_diagnostics() {
    init_logging();
    let binder = ShaderBinder::new(RecordingBackend::new());

    let err = binder
        .compile(
            Stage::Vertex,
            StageSource {
                source: WGSL_SHADER,
                entry_point: "vs_main",
                profile: "vs_2_0",
            },
        )
        .unwrap_err();
    assert!(matches!(err, CompileError::UnknownProfile { .. }));

    let err = binder
        .compile(Stage::Vertex, StageSource::wgsl("fn main( {", "main"))
        .unwrap_err();
    assert!(matches!(err, CompileError::Parse { .. }));
    assert!(!err.diagnostic().is_empty());

    let err = binder
        .compile(Stage::Vertex, StageSource::wgsl(WGSL_SHADER, "fs_main"))
        .unwrap_err();
    assert!(matches!(err, CompileError::MissingEntryPoint { .. }));
}

#[test]
fn destroyed_programs_are_released() {
    let (mut binder, program) = linked(RecordingBackend::new());
    binder.use_program(program).unwrap();

    assert!(binder.destroy_program(program));
    assert!(!binder.destroy_program(program));
    assert_eq!(binder.active_program(), None);
    assert_eq!(binder.program_count(), 0);
    assert_eq!(binder.backend().destroyed, vec![1]);
    assert!(matches!(
        binder.use_program(program),
        Err(ConstantError::UnknownProgram)
    ));
}
