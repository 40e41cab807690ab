mod common;

use common::{CountingApi, StateCall, init_logging};
use irrlicht::engine::rendering::{
    CachedGpuState, ClientArray, CompareFunc, MatrixMode, StateCache,
};

fn cache() -> StateCache<CountingApi> {
    init_logging();
    StateCache::new(CountingApi::new(4))
}

fn calls_after(cache: &StateCache<CountingApi>, start: usize) -> &[StateCall] {
    &cache.api().calls[start..]
}

#[test]
fn defaults_are_forced_on_creation() {
    let cache = cache();

    assert_eq!(*cache.state(), CachedGpuState::default());
    assert!(cache.api().calls.contains(&StateCall::AlphaTest(false)));
    assert!(
        cache
            .api()
            .calls
            .contains(&StateCall::MatrixMode(MatrixMode::ModelView))
    );
    assert_eq!(cache.api().calls.len(), 8);
}

#[test]
fn identical_requests_reach_the_api_once() {
    let mut cache = cache();
    let start = cache.api().calls.len();

    for _ in 0..5 {
        cache.set_alpha_test(true);
        cache.set_alpha_func(CompareFunc::Greater, 0.5);
        cache.set_client_array(ClientArray::Normal, true);
        cache.set_client_active_texture(2);
        cache.set_matrix_mode(MatrixMode::Projection);
    }

    assert_eq!(
        calls_after(&cache, start),
        &[
            StateCall::AlphaTest(true),
            StateCall::AlphaFunc(CompareFunc::Greater, 0.5),
            StateCall::ClientArray(ClientArray::Normal, true),
            StateCall::ClientActiveTexture(2),
            StateCall::MatrixMode(MatrixMode::Projection),
        ]
    );
}

#[test]
fn distinct_requests_all_reach_the_api() {
    let mut cache = cache();
    let start = cache.api().calls.len();

    cache.set_alpha_func(CompareFunc::Greater, 0.5);
    cache.set_alpha_func(CompareFunc::Greater, 0.25);
    cache.set_alpha_func(CompareFunc::Less, 0.25);
    cache.set_matrix_mode(MatrixMode::Texture);
    cache.set_matrix_mode(MatrixMode::ModelView);

    assert_eq!(calls_after(&cache, start).len(), 5);
    assert_eq!(cache.state().alpha_func, CompareFunc::Less);
    assert_eq!(cache.state().alpha_ref, 0.25);
}

#[test]
fn out_of_range_texture_units_are_ignored() {
    let mut cache = cache();
    let start = cache.api().calls.len();

    cache.set_client_active_texture(4);
    assert!(calls_after(&cache, start).is_empty());
    assert_eq!(cache.state().client_active_texture, 0);
}

#[test]
fn reset_forces_defaults_again() {
    let mut cache = cache();
    cache.set_alpha_test(true);
    cache.set_client_array(ClientArray::Color, true);
    let start = cache.api().calls.len();

    cache.reset();

    assert_eq!(*cache.state(), CachedGpuState::default());
    assert!(!cache.state().client_array(ClientArray::Color));
    assert_eq!(calls_after(&cache, start).len(), 8);

    let start = cache.api().calls.len();
    cache.set_alpha_test(false);
    assert!(calls_after(&cache, start).is_empty());
}
