// Browser smoke tests, run with `wasm-pack test --headless --chrome`.
// Native `cargo test` compiles this file to nothing.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn start_game_boots_and_creates_the_canvas() {
    road_hopper::start_game().expect("start_game");
    let doc = web_sys::window().unwrap().document().unwrap();
    assert!(doc.get_element_by_id("rh-canvas").is_some());
}
