use crate::engine::rendering::backend::FixedFunctionApi;
use log::{trace, warn};

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MatrixMode {
    #[default]
    ModelView,
    Projection,
    Texture,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ClientArray {
    Vertex,
    Normal,
    Color,
    TexCoord0,
}

impl ClientArray {
    pub const ALL: [ClientArray; 4] = [
        ClientArray::Vertex,
        ClientArray::Normal,
        ClientArray::Color,
        ClientArray::TexCoord0,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// The fixed-function state last applied to the native context.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CachedGpuState {
    pub alpha_test: bool,
    pub alpha_func: CompareFunc,
    pub alpha_ref: f32,
    pub client_arrays: [bool; 4],
    pub client_active_texture: u32,
    pub matrix_mode: MatrixMode,
}

impl Default for CachedGpuState {
    fn default() -> Self {
        CachedGpuState {
            alpha_test: false,
            alpha_func: CompareFunc::Always,
            alpha_ref: 0.0,
            client_arrays: [false; 4],
            client_active_texture: 0,
            matrix_mode: MatrixMode::ModelView,
        }
    }
}

impl CachedGpuState {
    pub fn client_array(&self, array: ClientArray) -> bool {
        self.client_arrays[array.index()]
    }
}

/// Filters redundant fixed-function state changes.
///
/// The cache owns the native API handle, so every tracked call goes
/// through it and [`CachedGpuState`] always matches the context. If the
/// context is lost or was touched behind the cache's back, [`StateCache::reset`]
/// forces everything back to the defaults.
pub struct StateCache<A: FixedFunctionApi> {
    api: A,
    state: CachedGpuState,
}

impl<A: FixedFunctionApi> StateCache<A> {
    pub fn new(api: A) -> Self {
        let mut cache = StateCache {
            api,
            state: CachedGpuState::default(),
        };
        cache.force_defaults();
        cache
    }

    pub fn reset(&mut self) {
        trace!("Resetting fixed-function state cache");
        self.force_defaults();
    }

    fn force_defaults(&mut self) {
        let defaults = CachedGpuState::default();
        self.api.set_alpha_test(defaults.alpha_test);
        self.api.set_alpha_func(defaults.alpha_func, defaults.alpha_ref);
        for array in ClientArray::ALL {
            self.api.set_client_array(array, defaults.client_array(array));
        }
        self.api.set_client_active_texture(defaults.client_active_texture);
        self.api.set_matrix_mode(defaults.matrix_mode);
        self.state = defaults;
    }

    pub fn state(&self) -> &CachedGpuState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn into_api(self) -> A {
        self.api
    }

    pub fn set_alpha_test(&mut self, enabled: bool) {
        if self.state.alpha_test != enabled {
            self.api.set_alpha_test(enabled);
            self.state.alpha_test = enabled;
        }
    }

    pub fn set_alpha_func(&mut self, func: CompareFunc, reference: f32) {
        if self.state.alpha_func != func || self.state.alpha_ref != reference {
            self.api.set_alpha_func(func, reference);
            self.state.alpha_func = func;
            self.state.alpha_ref = reference;
        }
    }

    pub fn set_client_array(&mut self, array: ClientArray, enabled: bool) {
        let current = &mut self.state.client_arrays[array.index()];
        if *current != enabled {
            self.api.set_client_array(array, enabled);
            *current = enabled;
        }
    }

    pub fn set_client_active_texture(&mut self, unit: u32) {
        if unit >= self.api.max_texture_units() {
            warn!(
                "Texture unit {unit} exceeds the {} units of this driver",
                self.api.max_texture_units()
            );
            return;
        }
        if self.state.client_active_texture != unit {
            self.api.set_client_active_texture(unit);
            self.state.client_active_texture = unit;
        }
    }

    pub fn set_matrix_mode(&mut self, mode: MatrixMode) {
        if self.state.matrix_mode != mode {
            self.api.set_matrix_mode(mode);
            self.state.matrix_mode = mode;
        }
    }
}
