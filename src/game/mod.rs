//! Game state, session control, and the animation-frame loop.
//!
//! Everything mutable lives in one [`GameState`] behind a thread-local
//! `RefCell`. Timer callbacks, input events, and frame callbacks each take a
//! single borrow for their whole run and release it before any scene
//! transition fires, so the run-to-completion model of the browser keeps the
//! state consistent without locks.
//!
//! Scenes: the menu owns input until a character is committed, then the
//! session controller arms its timers and the frame loop ticks until the
//! player dies or the deadline fires. Either ending path funnels through
//! [`game_over`], which is a no-op unless a session is actually in progress.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window,
    window,
};

pub mod collision;
pub mod entity;
pub mod menu;

use crate::{
    ASSET_MANIFEST, BOARD_COLS, CANVAS_H, CANVAS_W, PLAYER_SPRITES, ROW_SPRITES, TILE_H, TILE_W,
    resources, rng,
};
use entity::{ENEMY_BASE_SPEED, ENEMY_SPEED_JITTER, Enemy, LANES, Player, direction_from_key_code};
use menu::{Outcome, Selection};

// --- Session constants -------------------------------------------------------

/// One full game lasts this long.
pub const TIME_LIMIT_MS: i64 = 60_000;
/// A new enemy enters every two seconds.
const SPAWN_EVERY_MS: i32 = 2_000;
const COUNTDOWN_EVERY_MS: i32 = 1_000;
/// The end screen appears this long after a fatal collision.
const ENDING_DELAY_MS: i32 = 2_000;
/// Frame delta cap in seconds: a backgrounded tab resumes with one bounded
/// step instead of teleporting every enemy across the board.
const DT_MAX_SECS: f64 = 0.25;

/// The countdown interval keeps ticking until the budget falls below this
/// floor. The floor sits at -1 ms rather than zero, so one extra tick slips
/// through before the interval cancels itself.
pub const COUNTDOWN_FLOOR_MS: i64 = -1;

/// True once the countdown interval should cancel itself. The deadline
/// timeout, not this check, ends the game.
pub fn countdown_expired(time_left_ms: i64) -> bool {
    time_left_ms < COUNTDOWN_FLOOR_MS
}

// --- State -------------------------------------------------------------------

/// Which controller owns input and drawing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scene {
    Menu,
    Playing,
}

/// Handles for the session timers. All cancellation goes through
/// [`SessionTimers::cancel_all`], which is idempotent: each handle is taken at
/// most once and clearing an already-fired timer is a browser no-op.
#[derive(Default)]
struct SessionTimers {
    spawn: Option<i32>,
    countdown: Option<i32>,
    deadline: Option<i32>,
    ending: Option<i32>,
}

impl SessionTimers {
    fn cancel_all(&mut self, win: &Window) {
        if let Some(id) = self.spawn.take() {
            win.clear_interval_with_handle(id);
        }
        if let Some(id) = self.countdown.take() {
            win.clear_interval_with_handle(id);
        }
        if let Some(id) = self.deadline.take() {
            win.clear_timeout_with_handle(id);
        }
        if let Some(id) = self.ending.take() {
            win.clear_timeout_with_handle(id);
        }
    }
}

struct GameState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    scene: Scene,
    selection: Selection,
    player: Player,
    enemies: Vec<Enemy>,
    score: i64,
    time_left_ms: i64,
    /// Whether any session has run; decides if the menu shows an end banner.
    played: bool,
    timers: SessionTimers,
    last_time: f64,
    raf_id: Option<i32>,
}

/// Input closures, created once and re-registered per scene so a transition
/// deregisters exactly the handlers it owns.
struct Listeners {
    menu_keydown: Closure<dyn FnMut(KeyboardEvent)>,
    menu_click: Closure<dyn FnMut(MouseEvent)>,
    play_keyup: Closure<dyn FnMut(KeyboardEvent)>,
}

thread_local! {
    static STATE: RefCell<Option<GameState>> = RefCell::new(None);
    static LISTENERS: RefCell<Option<Listeners>> = RefCell::new(None);
    static RAF_CB: RefCell<Option<Closure<dyn FnMut(f64)>>> = RefCell::new(None);
}

fn win() -> Result<Window, JsValue> {
    window().ok_or_else(|| JsValue::from_str("no window"))
}

fn document() -> Result<Document, JsValue> {
    win()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn report(err: JsValue) {
    web_sys::console::error_1(&err);
}

// --- Boot --------------------------------------------------------------------

/// Entry point: get or create the canvas, start asset loading, and drop into
/// the menu once every sprite has settled.
pub fn boot() -> Result<(), JsValue> {
    let doc = document()?;

    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id("rh-canvas") {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id("rh-canvas");
        c.set_width(CANVAS_W as u32);
        c.set_height(CANVAS_H as u32);
        c.set_attribute("style", "display:block; margin:0 auto;").ok();
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    resources::load(&ASSET_MANIFEST)?;
    resources::on_ready(move || {
        if let Err(err) = init(canvas, ctx) {
            report(err);
        }
    });
    Ok(())
}

fn init(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Result<(), JsValue> {
    STATE.with(|cell| {
        cell.replace(Some(GameState {
            canvas,
            ctx,
            scene: Scene::Menu,
            selection: Selection::default(),
            player: Player::new(PLAYER_SPRITES[0]),
            enemies: Vec::new(),
            score: 0,
            time_left_ms: TIME_LIMIT_MS,
            played: false,
            timers: SessionTimers::default(),
            last_time: 0.0,
            raf_id: None,
        }))
    });
    init_listeners();
    init_frame_loop();
    enter_menu()
}

// --- Menu scene ---------------------------------------------------------------

/// Banner for the menu, only once a session has actually been played. The
/// liveness flag distinguishes a collision death from an expired clock.
fn last_outcome(state: &GameState) -> Option<(Outcome, i64)> {
    if !state.played {
        return None;
    }
    let outcome = if state.player.is_active {
        Outcome::TimeExpired
    } else {
        Outcome::Died
    };
    Some((outcome, state.score))
}

/// Draw the start screen and hand input to the menu controller.
fn enter_menu() -> Result<(), JsValue> {
    STATE.with(|cell| -> Result<(), JsValue> {
        let mut guard = cell.borrow_mut();
        let state = guard
            .as_mut()
            .ok_or_else(|| JsValue::from_str("game not initialized"))?;
        state.scene = Scene::Menu;
        state.selection = Selection::default();
        state.player.sprite = state.selection.sprite();
        menu::render(&state.ctx, state.selection, last_outcome(state))
    })?;
    add_menu_listeners()
}

#[derive(PartialEq)]
enum MenuAction {
    None,
    Start,
}

/// Menu keydown: arrows move the highlight, Enter commits.
fn on_menu_key(code: u32) -> Result<(), JsValue> {
    const KEY_ENTER: u32 = 13;
    let action = STATE.with(|cell| -> Result<MenuAction, JsValue> {
        let mut guard = cell.borrow_mut();
        let Some(state) = guard.as_mut() else {
            return Ok(MenuAction::None);
        };
        if state.scene != Scene::Menu {
            return Ok(MenuAction::None);
        }
        if code == KEY_ENTER {
            return Ok(MenuAction::Start);
        }
        if let Some(dir) = direction_from_key_code(code) {
            if state.selection.step(dir) {
                state.player.sprite = state.selection.sprite();
                menu::render(&state.ctx, state.selection, last_outcome(state))?;
            }
        }
        Ok(MenuAction::None)
    })?;
    if action == MenuAction::Start {
        begin_session()?;
    }
    Ok(())
}

/// Menu click: a portrait cell selects it, the New Game button starts.
fn on_menu_click(x: f64, y: f64) -> Result<(), JsValue> {
    let action = STATE.with(|cell| -> Result<MenuAction, JsValue> {
        let mut guard = cell.borrow_mut();
        let Some(state) = guard.as_mut() else {
            return Ok(MenuAction::None);
        };
        if state.scene != Scene::Menu {
            return Ok(MenuAction::None);
        }
        if let Some(selection) = menu::cell_at(x, y) {
            state.selection = selection;
            state.player.sprite = selection.sprite();
            menu::render(&state.ctx, state.selection, last_outcome(state))?;
        }
        if menu::new_game_hit(x, y) {
            return Ok(MenuAction::Start);
        }
        Ok(MenuAction::None)
    })?;
    if action == MenuAction::Start {
        begin_session()?;
    }
    Ok(())
}

/// Commit the menu selection, then start a session and the frame loop.
fn begin_session() -> Result<(), JsValue> {
    remove_menu_listeners()?;
    start_game()?;
    start_frame_loop()
}

// --- Session controller --------------------------------------------------------

/// Reset session state, register gameplay input, and arm the three timers:
/// enemy spawner, HUD countdown, and the authoritative deadline.
fn start_game() -> Result<(), JsValue> {
    let w = win()?;
    STATE.with(|cell| -> Result<(), JsValue> {
        let mut guard = cell.borrow_mut();
        let state = guard
            .as_mut()
            .ok_or_else(|| JsValue::from_str("game not initialized"))?;
        state.scene = Scene::Playing;
        state.score = 0;
        state.played = true;
        state.time_left_ms = TIME_LIMIT_MS;
        state.player.is_active = true;
        state.player.reset_position();
        state.enemies.clear();
        state.timers.cancel_all(&w);

        state.timers.spawn = Some(set_interval(&w, SPAWN_EVERY_MS, || {
            STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    spawn_enemy(state);
                }
            });
        })?);

        state.timers.countdown = Some(set_interval(&w, COUNTDOWN_EVERY_MS, || {
            STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    state.time_left_ms -= COUNTDOWN_EVERY_MS as i64;
                    if countdown_expired(state.time_left_ms) {
                        if let (Some(id), Some(w)) = (state.timers.countdown.take(), window()) {
                            w.clear_interval_with_handle(id);
                        }
                    }
                }
            });
        })?);

        state.timers.deadline = Some(set_timeout(&w, TIME_LIMIT_MS as i32, || {
            if let Err(err) = game_over() {
                report(err);
            }
        })?);
        Ok(())
    })?;
    add_play_input()
}

/// Recycle enemies that cleared the right edge, then add one at a random
/// lane, offset, and speed. Recycling bounds the collection for the whole
/// session.
fn spawn_enemy(state: &mut GameState) {
    state.enemies.retain(|e| !e.off_screen());
    let lane = LANES[rng::index(LANES.len())];
    let x = rng::uniform(CANVAS_W / 10.0);
    let speed = ENEMY_BASE_SPEED + rng::uniform(ENEMY_SPEED_JITTER);
    state.enemies.push(Enemy::new(x, lane, speed));
}

/// Deregister gameplay input, cancel every timer, and clear the canvas.
fn stop_game() -> Result<(), JsValue> {
    remove_play_input()?;
    let w = win()?;
    STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.timers.cancel_all(&w);
            state.ctx.clear_rect(0.0, 0.0, CANVAS_W, CANVAS_H);
        }
    });
    Ok(())
}

/// End the current session and hand control back to the menu. A no-op unless
/// a session is in progress, so the deadline timer and the collision delay
/// can never double-fire.
fn game_over() -> Result<(), JsValue> {
    let playing = STATE.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|s| s.scene == Scene::Playing)
            .unwrap_or(false)
    });
    if !playing {
        return Ok(());
    }
    stop_frame_loop();
    stop_game()?;
    STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.player.reset_position();
        }
    });
    enter_menu()
}

// --- Gameplay input ------------------------------------------------------------

/// Gameplay keyup: arrows move the player. Everything else is ignored.
fn on_play_key(code: u32) {
    let Some(dir) = direction_from_key_code(code) else {
        return;
    };
    STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            if state.scene == Scene::Playing && state.player.is_active {
                state.player.handle_input(dir);
            }
        }
    });
}

// --- Frame loop ----------------------------------------------------------------

enum TickOutcome {
    /// Keep ticking.
    Continue,
    /// The player died this frame; schedule the delayed end transition.
    PlayerDown,
    /// A stray frame arrived outside a session; do nothing.
    Idle,
}

/// One frame: advance enemies, collision-check, goal-check, render.
fn tick(state: &mut GameState, now: f64) -> TickOutcome {
    if state.scene != Scene::Playing {
        return TickOutcome::Idle;
    }
    let dt = ((now - state.last_time) / 1000.0).clamp(0.0, DT_MAX_SECS);
    state.last_time = now;

    for enemy in &mut state.enemies {
        enemy.update(dt);
        if enemy.collides_with(&state.player) {
            state.player.is_active = false;
        }
    }
    if state.player.check_goal() {
        state.score += 10;
    }
    if let Err(err) = render_scene(state) {
        report(err);
    }

    if state.player.is_active {
        TickOutcome::Continue
    } else {
        TickOutcome::PlayerDown
    }
}

/// Build the self-rescheduling animation-frame callback once.
fn init_frame_loop() {
    RAF_CB.with(|slot| {
        *slot.borrow_mut() = Some(Closure::wrap(Box::new(|now: f64| {
            let outcome = STATE.with(|cell| {
                let mut guard = cell.borrow_mut();
                match guard.as_mut() {
                    Some(state) => tick(state, now),
                    None => TickOutcome::Idle,
                }
            });
            match outcome {
                TickOutcome::Continue => request_frame(),
                TickOutcome::PlayerDown => schedule_ending(),
                TickOutcome::Idle => {}
            }
        }) as Box<dyn FnMut(f64)>));
    });
}

fn request_frame() {
    let Some(w) = window() else {
        return;
    };
    RAF_CB.with(|slot| {
        let slot = slot.borrow();
        let Some(cb) = slot.as_ref() else {
            return;
        };
        match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    state.raf_id = Some(id);
                }
            }),
            Err(err) => report(err),
        }
    });
}

/// Begin ticking; `last_time` seeds the first delta.
fn start_frame_loop() -> Result<(), JsValue> {
    STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.last_time = crate::performance_now();
        }
    });
    request_frame();
    Ok(())
}

/// Cancel any pending frame. The collision path simply stops re-arming; this
/// is for the deadline path, where a frame may still be scheduled.
fn stop_frame_loop() {
    STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            if let Some(id) = state.raf_id.take() {
                if let Some(w) = window() {
                    let _ = w.cancel_animation_frame(id);
                }
            }
        }
    });
}

/// The end screen appears a beat after the collision; nothing blocks while
/// the last frame stays up.
fn schedule_ending() {
    let Ok(w) = win() else {
        return;
    };
    match set_timeout(&w, ENDING_DELAY_MS, || {
        if let Err(err) = game_over() {
            report(err);
        }
    }) {
        Ok(id) => STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.timers.ending = Some(id);
            }
        }),
        Err(err) => report(err),
    }
}

// --- Rendering -----------------------------------------------------------------

/// Draw the board rows, every entity, then the HUD on top.
fn render_scene(state: &GameState) -> Result<(), JsValue> {
    for (row, sprite) in ROW_SPRITES.iter().enumerate() {
        let img = resources::get(sprite)?;
        for col in 0..BOARD_COLS {
            state.ctx.draw_image_with_html_image_element(
                &img,
                col as f64 * TILE_W,
                row as f64 * TILE_H,
            )?;
        }
    }
    for enemy in &state.enemies {
        enemy.render(&state.ctx)?;
    }
    state.player.render(&state.ctx)?;
    render_hud(state)
}

/// Score on the right, remaining time on the left.
fn render_hud(state: &GameState) -> Result<(), JsValue> {
    let ctx = &state.ctx;
    ctx.set_font("12pt Arial");
    ctx.set_text_align("center");
    ctx.set_fill_style_str("green");
    ctx.set_line_width(1.0);
    ctx.fill_text(&format!("Score: {}", state.score), 450.0, 40.0)?;
    let seconds = state.time_left_ms / 1000;
    ctx.fill_text(&format!("Time Left: {seconds} seconds"), 80.0, 40.0)
}

// --- Listener plumbing ----------------------------------------------------------

fn init_listeners() {
    let menu_keydown = Closure::wrap(Box::new(|evt: KeyboardEvent| {
        if let Err(err) = on_menu_key(evt.key_code()) {
            report(err);
        }
    }) as Box<dyn FnMut(_)>);
    let menu_click = Closure::wrap(Box::new(|evt: MouseEvent| {
        if let Err(err) = on_menu_click(evt.offset_x() as f64, evt.offset_y() as f64) {
            report(err);
        }
    }) as Box<dyn FnMut(_)>);
    let play_keyup = Closure::wrap(Box::new(|evt: KeyboardEvent| {
        on_play_key(evt.key_code());
    }) as Box<dyn FnMut(_)>);
    LISTENERS.with(|cell| {
        cell.replace(Some(Listeners {
            menu_keydown,
            menu_click,
            play_keyup,
        }))
    });
}

fn state_canvas() -> Result<HtmlCanvasElement, JsValue> {
    STATE
        .with(|cell| cell.borrow().as_ref().map(|s| s.canvas.clone()))
        .ok_or_else(|| JsValue::from_str("game not initialized"))
}

fn add_menu_listeners() -> Result<(), JsValue> {
    let doc = document()?;
    let canvas = state_canvas()?;
    LISTENERS.with(|cell| -> Result<(), JsValue> {
        let guard = cell.borrow();
        let listeners = guard
            .as_ref()
            .ok_or_else(|| JsValue::from_str("listeners not initialized"))?;
        doc.add_event_listener_with_callback(
            "keydown",
            listeners.menu_keydown.as_ref().unchecked_ref(),
        )?;
        canvas
            .add_event_listener_with_callback("click", listeners.menu_click.as_ref().unchecked_ref())
    })
}

fn remove_menu_listeners() -> Result<(), JsValue> {
    let doc = document()?;
    let canvas = state_canvas()?;
    LISTENERS.with(|cell| -> Result<(), JsValue> {
        let guard = cell.borrow();
        let listeners = guard
            .as_ref()
            .ok_or_else(|| JsValue::from_str("listeners not initialized"))?;
        doc.remove_event_listener_with_callback(
            "keydown",
            listeners.menu_keydown.as_ref().unchecked_ref(),
        )?;
        canvas.remove_event_listener_with_callback(
            "click",
            listeners.menu_click.as_ref().unchecked_ref(),
        )
    })
}

fn add_play_input() -> Result<(), JsValue> {
    let doc = document()?;
    LISTENERS.with(|cell| -> Result<(), JsValue> {
        let guard = cell.borrow();
        let listeners = guard
            .as_ref()
            .ok_or_else(|| JsValue::from_str("listeners not initialized"))?;
        doc.add_event_listener_with_callback(
            "keyup",
            listeners.play_keyup.as_ref().unchecked_ref(),
        )
    })
}

fn remove_play_input() -> Result<(), JsValue> {
    let doc = document()?;
    LISTENERS.with(|cell| -> Result<(), JsValue> {
        let guard = cell.borrow();
        let listeners = guard
            .as_ref()
            .ok_or_else(|| JsValue::from_str("listeners not initialized"))?;
        doc.remove_event_listener_with_callback(
            "keyup",
            listeners.play_keyup.as_ref().unchecked_ref(),
        )
    })
}

// --- Timer plumbing --------------------------------------------------------------

/// Arm a repeating timer. The closure is leaked; cancellation goes by handle,
/// which guarantees it never fires after [`SessionTimers::cancel_all`].
fn set_interval(win: &Window, ms: i32, f: impl FnMut() + 'static) -> Result<i32, JsValue> {
    let cb = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
    let id = win.set_interval_with_callback_and_timeout_and_arguments_0(
        cb.as_ref().unchecked_ref(),
        ms,
    )?;
    cb.forget();
    Ok(id)
}

/// Arm a one-shot timer. Same leak/cancellation contract as [`set_interval`].
fn set_timeout(win: &Window, ms: i32, f: impl FnMut() + 'static) -> Result<i32, JsValue> {
    let cb = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
    let id = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.as_ref().unchecked_ref(),
        ms,
    )?;
    cb.forget();
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_runs_one_tick_past_zero() {
        let mut budget = TIME_LIMIT_MS;
        let mut ticks = 0;
        while !countdown_expired(budget) {
            budget -= COUNTDOWN_EVERY_MS as i64;
            ticks += 1;
            assert!(ticks <= 100, "countdown never expired");
        }
        // 61 ticks: 60 to reach zero, plus the tolerated extra one.
        assert_eq!(ticks, 61);
        assert_eq!(budget, -1_000);
    }
}
