//! Tests that need a JS host: run with `wasm-pack test --node` (or `--headless --chrome`).

#![cfg(target_arch = "wasm32")]

use boids_spatial_hash::{neighbor_query_moore, FlockConfig, FlockEngine};
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PartialConfig {
    speed_limit: f32,
    cell_size: f32,
}

fn partial_config(speed_limit: f32, cell_size: f32) -> JsValue {
    serde_wasm_bindgen::to_value(&PartialConfig {
        speed_limit,
        cell_size,
    })
    .unwrap()
}

#[wasm_bindgen_test]
fn engine_from_partial_config() {
    let engine = FlockEngine::with_config(200, 400.0, 300.0, 9, partial_config(3.0, 100.0))
        .ok()
        .expect("engine");
    assert_eq!(engine.agent_count(), 200);
    assert_eq!(engine.grid_width(), 4);
    assert_eq!(engine.grid_height(), 3);
}

#[wasm_bindgen_test]
fn invalid_cell_size_is_rejected() {
    assert!(FlockEngine::with_config(10, 400.0, 300.0, 1, partial_config(7.0, 0.0)).is_err());

    let mut engine = FlockEngine::new(10, 400.0, 300.0, 1).ok().expect("engine");
    assert!(engine.set_cell_size(-5.0).is_err());
    assert!(engine.set_neighbor_query(42).is_err());
    assert!(engine.set_neighbor_query(neighbor_query_moore()).is_ok());
    assert!(engine.set_speed_limit(f32::NAN).is_err());
    assert!(engine.set_visual_range(f32::INFINITY).is_err());
}

#[wasm_bindgen_test]
fn ticks_respect_speed_limit_through_views() {
    let mut engine = FlockEngine::with_config(500, 640.0, 480.0, 3, partial_config(5.0, 50.0))
        .ok()
        .expect("engine");
    let n = engine.agent_count();

    for _ in 0..60 {
        engine.set_predator(320.0, 240.0);
        engine.tick();
    }

    let vx = unsafe { std::slice::from_raw_parts(engine.velocities_x_ptr(), n) };
    let vy = unsafe { std::slice::from_raw_parts(engine.velocities_y_ptr(), n) };
    for (x, y) in vx.iter().zip(vy) {
        assert!(x.abs() + y.abs() <= 5.0 + 1e-4);
    }
    assert_eq!(engine.tick_count(), 60.0);
}

#[wasm_bindgen_test]
fn config_round_trips_through_js() {
    let mut engine = FlockEngine::new(10, 400.0, 300.0, 1).ok().expect("engine");
    assert!(engine.set_config(partial_config(9.0, 25.0)).is_ok());
    assert_eq!(engine.grid_width(), 16);

    let config: FlockConfig =
        serde_wasm_bindgen::from_value(engine.config().ok().expect("config")).unwrap();
    assert_eq!(config.speed_limit, 9.0);
    assert_eq!(config.cell_size, 25.0);
    assert_eq!(
        config,
        FlockConfig {
            speed_limit: 9.0,
            cell_size: 25.0,
            ..FlockConfig::default()
        }
    );
}
