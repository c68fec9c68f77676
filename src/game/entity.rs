//! Enemies and the player avatar.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::collision;
use crate::{CANVAS_H, CANVAS_W, ENEMY_SPRITE, resources};

/// Gameplay movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Fixed keycode table for the arrow keys. Anything else maps to `None` and
/// is ignored by callers.
pub fn direction_from_key_code(code: u32) -> Option<Direction> {
    match code {
        37 => Some(Direction::Left),
        38 => Some(Direction::Up),
        39 => Some(Direction::Right),
        40 => Some(Direction::Down),
        _ => None,
    }
}

/// The three stone lanes enemies drive along, as sprite y origins.
pub const LANES: [f64; 3] = [65.0, 145.0, 225.0];

/// Base speed and the uniform jitter added on top at spawn, px/s.
pub const ENEMY_BASE_SPEED: f64 = 100.0;
pub const ENEMY_SPEED_JITTER: f64 = 20.0;

pub struct Enemy {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub sprite: &'static str,
}

impl Enemy {
    pub fn new(x: f64, y: f64, speed: f64) -> Self {
        Self {
            x,
            y,
            speed,
            sprite: ENEMY_SPRITE,
        }
    }

    /// Advance along the lane. `dt` is in seconds.
    pub fn update(&mut self, dt: f64) {
        self.x += self.speed * dt;
    }

    pub fn collides_with(&self, player: &Player) -> bool {
        collision::enemy_hits_player(self.x, self.y, player.x, player.y)
    }

    /// Fully past the right edge, eligible for recycling at the next spawn.
    pub fn off_screen(&self) -> bool {
        self.x > CANVAS_W
    }

    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        ctx.draw_image_with_html_image_element(&resources::get(self.sprite)?, self.x, self.y)
    }
}

/// Where the player spawns on the grass. The y origin is derived from the
/// canvas width, not the height.
pub const START_X: f64 = 100.0;
pub const START_Y: f64 = CANVAS_W - 70.0;

/// One keypress worth of movement.
pub const STEP: f64 = 30.0;

/// Crossing above this row reaches the water and scores.
pub const GOAL_Y: f64 = 25.0;

/// Clamp bounds for the sprite origin.
pub const MAX_X: f64 = CANVAS_W - 100.0;
pub const MAX_Y: f64 = CANVAS_H - 200.0;

pub struct Player {
    pub x: f64,
    pub y: f64,
    pub sprite: &'static str,
    pub is_active: bool,
}

impl Player {
    pub fn new(sprite: &'static str) -> Self {
        Self {
            x: START_X,
            y: START_Y,
            sprite,
            is_active: false,
        }
    }

    pub fn reset_position(&mut self) {
        self.x = START_X;
        self.y = START_Y;
    }

    /// Goal check: past the water threshold the player respawns on the grass.
    /// Returns whether a goal was reached; the session owns the score.
    pub fn check_goal(&mut self) -> bool {
        if self.y < GOAL_Y {
            self.reset_position();
            true
        } else {
            false
        }
    }

    /// Step 30 px in `dir`, then clamp so the sprite stays on the board.
    pub fn handle_input(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.x -= STEP,
            Direction::Right => self.x += STEP,
            Direction::Up => self.y -= STEP,
            Direction::Down => self.y += STEP,
        }
        self.x = self.x.clamp(0.0, MAX_X);
        self.y = self.y.clamp(0.0, MAX_Y);
    }

    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        ctx.draw_image_with_html_image_element(&resources::get(self.sprite)?, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_drifts_monotonically_right() {
        let mut enemy = Enemy::new(10.0, LANES[0], 110.0);
        for dt in [0.0, 0.008, 0.016, 0.25] {
            let before = enemy.x;
            enemy.update(dt);
            assert!(enemy.x >= before);
        }
        assert_eq!(enemy.y, LANES[0]);
    }

    #[test]
    fn arrow_codes_map_and_others_do_not() {
        assert_eq!(direction_from_key_code(37), Some(Direction::Left));
        assert_eq!(direction_from_key_code(38), Some(Direction::Up));
        assert_eq!(direction_from_key_code(39), Some(Direction::Right));
        assert_eq!(direction_from_key_code(40), Some(Direction::Down));
        assert_eq!(direction_from_key_code(13), None);
        assert_eq!(direction_from_key_code(65), None);
    }

    #[test]
    fn goal_resets_to_start_coordinate() {
        let mut player = Player::new("images/char-boy.png");
        player.x = 200.0;
        player.y = 15.0;
        assert!(player.check_goal());
        assert_eq!((player.x, player.y), (START_X, START_Y));
        // Below the threshold nothing happens.
        player.y = 25.0;
        assert!(!player.check_goal());
        assert_eq!(player.y, 25.0);
    }

    #[test]
    fn input_clamps_into_bounds_from_anywhere() {
        let mut player = Player::new("images/char-boy.png");
        // The spawn point sits below MAX_Y on purpose; the first input pulls
        // the player into the clamped region and it never leaves again.
        for dir in [Direction::Down, Direction::Left, Direction::Up, Direction::Right] {
            for _ in 0..30 {
                player.handle_input(dir);
                assert!((0.0..=MAX_X).contains(&player.x), "x escaped: {}", player.x);
                assert!((0.0..=MAX_Y).contains(&player.y), "y escaped: {}", player.y);
            }
        }
    }

    #[test]
    fn repeated_moves_against_a_wall_are_idempotent() {
        let mut player = Player::new("images/char-boy.png");
        player.x = 0.0;
        player.handle_input(Direction::Left);
        player.handle_input(Direction::Left);
        assert_eq!(player.x, 0.0);
        player.x = MAX_X;
        player.handle_input(Direction::Right);
        assert_eq!(player.x, MAX_X);
    }
}
