mod common;

use common::{CountingApi, RecordingBackend, StateCall, WGSL_SHADER, init_logging};
use irrlicht::engine::rendering::{
    CompareFunc, ConstantServices, MaterialParams, MaterialRenderer, ShaderBinder,
    ShaderConstantCallback, StageSource, StateCache,
};

#[derive(Default)]
struct Animated {
    frames: i32,
    last_user_data: Option<i32>,
    results: Vec<bool>,
}

impl ShaderConstantCallback<RecordingBackend> for Animated {
    fn on_set_constants(
        &mut self,
        services: &mut ConstantServices<'_, RecordingBackend>,
        user_data: i32,
    ) {
        self.frames += 1;
        self.last_user_data = Some(user_data);

        let frame = services.resolve("frame");
        let exposure = services.resolve("exposure");
        self.results.push(services.set_int(frame, &[self.frames]));
        self.results.push(services.set_float(exposure, &[0.75]));
        let missing = services.resolve("nope");
        self.results.push(services.set_float(missing, &[1.0]));
    }
}

fn setup() -> (ShaderBinder<RecordingBackend>, StateCache<CountingApi>) {
    init_logging();
    (
        ShaderBinder::new(RecordingBackend::new()),
        StateCache::new(CountingApi::new(8)),
    )
}

#[test]
fn render_feeds_constants_through_the_callback() {
    let (mut binder, mut cache) = setup();
    let mut renderer = MaterialRenderer::new(
        &mut binder,
        Some(StageSource::wgsl(WGSL_SHADER, "vs_main")),
        Some(StageSource::wgsl(WGSL_SHADER, "fs_main")),
        Animated::default(),
        42,
    );
    let program = renderer.program().unwrap();

    renderer.on_set_material(&mut binder, &mut cache, &MaterialParams::default());
    assert_eq!(binder.active_program(), Some(program));

    assert!(renderer.on_render(&mut binder));
    assert!(renderer.on_render(&mut binder));

    let callback = renderer.callback();
    assert_eq!(callback.frames, 2);
    assert_eq!(callback.last_user_data, Some(42));
    assert_eq!(callback.results, vec![true, true, false, true, true, false]);

    let frame = binder.resolve_constant(program, "frame");
    assert_eq!(
        binder.constant_bytes(program, frame).unwrap(),
        2i32.to_ne_bytes()
    );
}

#[test]
fn alpha_state_follows_the_material() {
    let (mut binder, mut cache) = setup();
    let mut renderer = MaterialRenderer::new(
        &mut binder,
        None,
        Some(StageSource::wgsl(WGSL_SHADER, "fs_main")),
        Animated::default(),
        0,
    );
    let material = MaterialParams::builder()
        .alpha_test(true)
        .alpha_func(CompareFunc::GreaterEqual)
        .alpha_ref(0.3)
        .build();
    let start = cache.api().calls.len();

    renderer.on_set_material(&mut binder, &mut cache, &material);
    renderer.on_set_material(&mut binder, &mut cache, &material);
    renderer.on_unset_material(&mut cache);

    assert_eq!(
        &cache.api().calls[start..],
        &[
            StateCall::AlphaTest(true),
            StateCall::AlphaFunc(CompareFunc::GreaterEqual, 0.3),
            StateCall::AlphaTest(false),
        ]
    );
}

#[test]
fn broken_stages_are_skipped() {
    let (mut binder, mut cache) = setup();
    let mut renderer = MaterialRenderer::new(
        &mut binder,
        Some(StageSource::wgsl("fn main( {", "main")),
        Some(StageSource::wgsl(WGSL_SHADER, "fs_main")),
        Animated::default(),
        0,
    );
    assert!(renderer.program().is_some());
    assert_eq!(binder.backend().linked_stages, vec![1]);

    let mut nothing = MaterialRenderer::new(
        &mut binder,
        Some(StageSource::wgsl("fn main( {", "main")),
        None,
        Animated::default(),
        0,
    );
    assert!(nothing.program().is_none());
    nothing.on_set_material(&mut binder, &mut cache, &MaterialParams::default());
    assert!(!nothing.on_render(&mut binder));
    assert_eq!(nothing.callback().frames, 0);

    renderer.on_set_material(&mut binder, &mut cache, &MaterialParams::default());
    renderer.destroy(&mut binder);
    assert_eq!(binder.program_count(), 0);
}
