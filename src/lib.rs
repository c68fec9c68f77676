//! Road Hopper core crate.
//!
//! A "cross the road" arcade game compiled to WebAssembly. The exported
//! `start_game()` boots the image cache and drops into the character-selection
//! menu once every sprite has loaded; from there the menu controller hands off
//! to the session controller and the animation-frame loop in [`game`].

use wasm_bindgen::prelude::*;

pub mod game;
pub mod resources;
pub mod rng;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Board geometry and sprite manifest
// -----------------------------------------------------------------------------

/// Fixed logical canvas size.
pub const CANVAS_W: f64 = 505.0;
pub const CANVAS_H: f64 = 606.0;

/// Board tile sprites, one entry per row, top to bottom: the water goal row,
/// three stone lanes, two grass rows for the start area.
pub const ROW_SPRITES: [&str; 6] = [
    "images/water-block.png",
    "images/stone-block.png",
    "images/stone-block.png",
    "images/stone-block.png",
    "images/grass-block.png",
    "images/grass-block.png",
];

pub const BOARD_COLS: usize = 5;
pub const TILE_W: f64 = 101.0;
pub const TILE_H: f64 = 83.0;

pub const ENEMY_SPRITE: &str = "images/enemy-bug.png";

/// Selectable characters in menu order: three in the first row of the portrait
/// grid, two in the second.
pub const PLAYER_SPRITES: [&str; 5] = [
    "images/char-boy.png",
    "images/char-cat-girl.png",
    "images/char-horn-girl.png",
    "images/char-pink-girl.png",
    "images/char-princess-girl.png",
];

/// Everything the resource cache fetches before the menu appears.
pub const ASSET_MANIFEST: [&str; 9] = [
    "images/stone-block.png",
    "images/water-block.png",
    "images/grass-block.png",
    "images/enemy-bug.png",
    "images/char-boy.png",
    "images/char-cat-girl.png",
    "images/char-horn-girl.png",
    "images/char-pink-girl.png",
    "images/char-princess-girl.png",
];

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    game::boot()
}

/// Milliseconds from the performance clock; 0.0 where it is unavailable
/// (native test runs).
pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
