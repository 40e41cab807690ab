use crate::engine::rendering::backend::{FixedFunctionApi, ShaderBackend};
use crate::engine::rendering::shader::{
    CompiledStage, ConstantServices, ProgramId, ShaderBinder, Stage, StageSource,
};
use crate::engine::rendering::state_cache::{CompareFunc, StateCache};
use bon::Builder;
use log::{debug, warn};

/// The per-material state a material renderer applies before drawing.
#[derive(Debug, Copy, Clone, PartialEq, Builder)]
pub struct MaterialParams {
    #[builder(default = false)]
    pub alpha_test: bool,
    #[builder(default)]
    pub alpha_func: CompareFunc,
    #[builder(default = 0.5)]
    pub alpha_ref: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        MaterialParams::builder().build()
    }
}

/// Hook the application implements to feed per-draw constants.
pub trait ShaderConstantCallback<B: ShaderBackend> {
    /// Called once when a material using this renderer becomes current.
    fn on_set_material(&mut self, _material: &MaterialParams) {}

    /// Called before every draw call with the program already bound.
    fn on_set_constants(&mut self, services: &mut ConstantServices<'_, B>, user_data: i32);
}

/// Draws with a shader program and forwards constant setup to a
/// [`ShaderConstantCallback`].
///
/// If no stage compiled, the renderer still applies the material's
/// fixed-function state and draws without a program.
pub struct MaterialRenderer<B: ShaderBackend, C: ShaderConstantCallback<B>> {
    program: Option<ProgramId>,
    callback: C,
    user_data: i32,
    _backend: std::marker::PhantomData<fn() -> B>,
}

impl<B: ShaderBackend, C: ShaderConstantCallback<B>> MaterialRenderer<B, C> {
    pub fn new(
        binder: &mut ShaderBinder<B>,
        vertex: Option<StageSource<'_>>,
        fragment: Option<StageSource<'_>>,
        callback: C,
        user_data: i32,
    ) -> Self {
        let compile = |binder: &ShaderBinder<B>, stage, source: Option<StageSource<'_>>| {
            source.and_then(|source| binder.compile(stage, source).ok())
        };
        let vertex: Option<CompiledStage> = compile(binder, Stage::Vertex, vertex);
        let fragment: Option<CompiledStage> = compile(binder, Stage::Fragment, fragment);

        let program = if vertex.is_none() && fragment.is_none() {
            warn!("No shader stage available, drawing without a program");
            None
        } else {
            match binder.link(vertex.as_ref(), fragment.as_ref()) {
                Ok(program) => Some(program),
                Err(e) => {
                    warn!("Could not link material program: {e}");
                    None
                }
            }
        };

        Self::with_program(program, callback, user_data)
    }

    pub fn with_program(program: Option<ProgramId>, callback: C, user_data: i32) -> Self {
        MaterialRenderer {
            program,
            callback,
            user_data,
            _backend: std::marker::PhantomData,
        }
    }

    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }

    /// Makes the material current: binds the program (which resets its
    /// constants to the defaults) and applies alpha testing.
    pub fn on_set_material<A: FixedFunctionApi>(
        &mut self,
        binder: &mut ShaderBinder<B>,
        cache: &mut StateCache<A>,
        material: &MaterialParams,
    ) {
        if let Some(program) = self.program
            && let Err(e) = binder.use_program(program)
        {
            warn!("Could not activate material program: {e}");
        }

        cache.set_alpha_test(material.alpha_test);
        if material.alpha_test {
            cache.set_alpha_func(material.alpha_func, material.alpha_ref);
        }
        self.callback.on_set_material(material);
    }

    /// Runs the constant callback for the next draw. Returns `false` when
    /// there is no program to draw with.
    pub fn on_render(&mut self, binder: &mut ShaderBinder<B>) -> bool {
        let Some(program) = self.program else {
            return false;
        };
        let mut services = ConstantServices::new(binder, program);
        self.callback.on_set_constants(&mut services, self.user_data);
        true
    }

    pub fn on_unset_material<A: FixedFunctionApi>(&mut self, cache: &mut StateCache<A>) {
        cache.set_alpha_test(false);
    }

    /// Releases the program this renderer owns.
    pub fn destroy(self, binder: &mut ShaderBinder<B>) {
        if let Some(program) = self.program {
            debug!("Destroying material program");
            binder.destroy_program(program);
        }
    }
}
