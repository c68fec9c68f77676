//! Character-selection start menu.
//!
//! A 3x2 grid holds the five portraits (the second row has only two). Arrow
//! keys move a highlight with boundary clamping for the uneven rows, clicks
//! select a cell directly, and Enter or the New Game button commits the
//! highlighted character and starts a session. After a session the menu also
//! shows how it ended.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::entity::Direction;
use crate::{CANVAS_H, CANVAS_W, PLAYER_SPRITES, resources};

/// Row widths of the portrait grid.
pub const ROW_LENGTHS: [usize; 2] = [3, 2];

/// Pixel geometry: 110 px cells starting at x = 110. Portraits are drawn
/// 40 px above their highlight band so the art centers in it.
pub const CELL: f64 = 110.0;
pub const GRID_X0: f64 = 110.0;
pub const PORTRAIT_Y0: f64 = 110.0;
pub const HIGHLIGHT_Y0: f64 = 150.0;

/// New Game button hit rectangle (inclusive bounds).
pub const NEW_GAME_LEFT: f64 = 150.0;
pub const NEW_GAME_RIGHT: f64 = 350.0;
pub const NEW_GAME_TOP: f64 = 420.0;
pub const NEW_GAME_BOTTOM: f64 = 450.0;

/// Highlighted cell of the portrait grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub row: usize,
    pub col: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Self { row: 0, col: 0 }
    }
}

impl Selection {
    /// Index into [`PLAYER_SPRITES`].
    pub fn portrait_index(self) -> usize {
        self.row * ROW_LENGTHS[0] + self.col
    }

    pub fn sprite(self) -> &'static str {
        PLAYER_SPRITES[self.portrait_index()]
    }

    /// Arrow-key navigation with clamping for the uneven rows: down only
    /// works from a column the second row actually has, right stops at the
    /// end of the current row. Returns whether the highlight moved.
    pub fn step(&mut self, dir: Direction) -> bool {
        let before = *self;
        match dir {
            Direction::Left if self.col > 0 => self.col -= 1,
            Direction::Right if self.col + 1 < ROW_LENGTHS[self.row] => self.col += 1,
            Direction::Up if self.row == 1 => self.row = 0,
            Direction::Down if self.row == 0 && self.col < ROW_LENGTHS[1] => self.row = 1,
            _ => {}
        }
        *self != before
    }

    /// Top-left pixel of the highlight rectangle.
    pub fn highlight_origin(self) -> (f64, f64) {
        (
            GRID_X0 + self.col as f64 * CELL,
            HIGHLIGHT_Y0 + self.row as f64 * CELL,
        )
    }
}

/// Map a canvas-relative click to the portrait cell it lands in, if any.
/// Bands are strict on every edge, matching the highlight rectangles.
pub fn cell_at(x: f64, y: f64) -> Option<Selection> {
    for (row, &len) in ROW_LENGTHS.iter().enumerate() {
        let top = HIGHLIGHT_Y0 + row as f64 * CELL;
        if y <= top || y >= top + CELL {
            continue;
        }
        for col in 0..len {
            let left = GRID_X0 + col as f64 * CELL;
            if x > left && x < left + CELL {
                return Some(Selection { row, col });
            }
        }
    }
    None
}

/// Is a canvas-relative click inside the New Game button?
pub fn new_game_hit(x: f64, y: f64) -> bool {
    (NEW_GAME_LEFT..=NEW_GAME_RIGHT).contains(&x) && (NEW_GAME_TOP..=NEW_GAME_BOTTOM).contains(&y)
}

/// How the last session ended, for the menu banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Died,
    TimeExpired,
}

/// Banner wording shown above the portrait grid.
pub fn end_message(outcome: Outcome, score: i64) -> String {
    match outcome {
        Outcome::Died => format!("Game Over !! Your Score is {score}"),
        Outcome::TimeExpired => format!("Time Out !! Your Score is {score}"),
    }
}

/// Paint the whole start screen: backdrop, portraits, the New Game button,
/// the end-of-session banner when one applies, and the highlight.
pub fn render(
    ctx: &CanvasRenderingContext2d,
    selection: Selection,
    last_outcome: Option<(Outcome, i64)>,
) -> Result<(), JsValue> {
    ctx.set_fill_style_str("#5FC148");
    ctx.fill_rect(0.0, 0.0, CANVAS_W, CANVAS_H);

    let mut portrait = 0usize;
    for (row, &len) in ROW_LENGTHS.iter().enumerate() {
        for col in 0..len {
            let img = resources::get(PLAYER_SPRITES[portrait])?;
            ctx.draw_image_with_html_image_element(
                &img,
                GRID_X0 + col as f64 * CELL,
                PORTRAIT_Y0 + row as f64 * CELL,
            )?;
            portrait += 1;
        }
    }

    ctx.set_font("30pt Arial");
    ctx.set_text_align("center");
    ctx.set_stroke_style_str("#FFFF66");
    ctx.set_line_width(1.0);
    ctx.set_fill_style_str("#FFFF66");
    ctx.fill_text("New Game", 250.0, 450.0)?;
    ctx.stroke_text("New Game", 250.0, 450.0)?;

    if let Some((outcome, score)) = last_outcome {
        ctx.set_font("15pt Arial");
        ctx.set_text_align("center");
        ctx.set_line_width(1.0);
        ctx.set_fill_style_str("#FFFFFF");
        ctx.fill_text(&end_message(outcome, score), 250.0, 100.0)?;
    }

    let (hx, hy) = selection.highlight_origin();
    ctx.set_fill_style_str("rgba(238, 223, 204, 0.5)");
    ctx.fill_rect(hx, hy, CELL, CELL);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_reaches_the_fourth_portrait() {
        let mut sel = Selection::default();
        assert!(sel.step(Direction::Down));
        assert_eq!(sel, Selection { row: 1, col: 0 });
        assert_eq!(sel.portrait_index(), 3);
        assert_eq!(sel.sprite(), PLAYER_SPRITES[3]);
    }

    #[test]
    fn navigation_respects_the_short_second_row() {
        // Down from the third column has no cell beneath it.
        let mut sel = Selection { row: 0, col: 2 };
        assert!(!sel.step(Direction::Down));
        assert_eq!(sel, Selection { row: 0, col: 2 });

        // Right on the second row stops at its last column.
        let mut sel = Selection { row: 1, col: 1 };
        assert!(!sel.step(Direction::Right));
        assert_eq!(sel, Selection { row: 1, col: 1 });

        // Up from the first row and left from the first column are no-ops.
        let mut sel = Selection::default();
        assert!(!sel.step(Direction::Up));
        assert!(!sel.step(Direction::Left));
        assert_eq!(sel, Selection::default());
    }

    #[test]
    fn every_cell_maps_to_a_distinct_portrait() {
        let mut seen = Vec::new();
        for (row, &len) in ROW_LENGTHS.iter().enumerate() {
            for col in 0..len {
                let idx = Selection { row, col }.portrait_index();
                assert!(idx < PLAYER_SPRITES.len());
                assert!(!seen.contains(&idx));
                seen.push(idx);
            }
        }
        assert_eq!(seen.len(), PLAYER_SPRITES.len());
    }

    #[test]
    fn clicks_map_to_cells_with_strict_bands() {
        assert_eq!(cell_at(165.0, 200.0), Some(Selection { row: 0, col: 0 }));
        assert_eq!(cell_at(335.0, 200.0), Some(Selection { row: 0, col: 2 }));
        assert_eq!(cell_at(225.0, 300.0), Some(Selection { row: 1, col: 1 }));
        // Band edges and the space left of the grid miss.
        assert_eq!(cell_at(110.0, 200.0), None);
        assert_eq!(cell_at(165.0, 150.0), None);
        assert_eq!(cell_at(50.0, 200.0), None);
        // The second row has no third column.
        assert_eq!(cell_at(335.0, 300.0), None);
    }

    #[test]
    fn new_game_button_bounds_are_inclusive() {
        assert!(new_game_hit(150.0, 420.0));
        assert!(new_game_hit(350.0, 450.0));
        assert!(new_game_hit(250.0, 435.0));
        assert!(!new_game_hit(149.0, 435.0));
        assert!(!new_game_hit(250.0, 451.0));
    }

    #[test]
    fn end_messages_match_the_outcome() {
        assert_eq!(
            end_message(Outcome::Died, 30),
            "Game Over !! Your Score is 30"
        );
        assert_eq!(
            end_message(Outcome::TimeExpired, 120),
            "Time Out !! Your Score is 120"
        );
    }
}
