//! Bounding-box collision.
//!
//! Sprites are 101x171 images with generous transparent padding, so collision
//! works on per-edge insets that approximate each visible silhouette. The
//! inset values are hand-tuned to the sprite art; the test itself is a
//! standard strict-overlap check on the two inset rectangles.

/// Full sprite rectangle, shared by enemies and players.
pub const SPRITE_W: f64 = 101.0;
pub const SPRITE_H: f64 = 171.0;

/// Per-edge pixel margins subtracted from the full sprite rectangle.
#[derive(Clone, Copy, Debug)]
pub struct Insets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// The bug art bleeds to the left edge; only its right side carries padding.
pub const ENEMY_INSETS: Insets = Insets {
    left: 0.0,
    right: 40.0,
    top: 73.0,
    bottom: 28.0,
};

pub const PLAYER_INSETS: Insets = Insets {
    left: 35.0,
    right: 25.0,
    top: 63.0,
    bottom: 28.0,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Sprite rectangle with origin (x, y), shrunk by `insets`.
pub fn inset_rect(x: f64, y: f64, insets: Insets) -> Rect {
    Rect {
        left: x + insets.left,
        top: y + insets.top,
        right: x + SPRITE_W - insets.right,
        bottom: y + SPRITE_H - insets.bottom,
    }
}

/// Strict overlap on both axes. Touching edges do not collide.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.left < b.right && b.left < a.right && a.top < b.bottom && b.top < a.bottom
}

/// Does an enemy at (ex, ey) hit a player at (px, py)?
pub fn enemy_hits_player(ex: f64, ey: f64, px: f64, py: f64) -> bool {
    overlaps(
        inset_rect(ex, ey, ENEMY_INSETS),
        inset_rect(px, py, PLAYER_INSETS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_cell_collides() {
        assert!(enemy_hits_player(100.0, 65.0, 100.0, 75.0));
    }

    #[test]
    fn horizontal_separation_is_safe() {
        // Same lane, but the player stands three tiles to the right.
        assert!(!enemy_hits_player(100.0, 65.0, 300.0, 75.0));
    }

    #[test]
    fn vertical_separation_is_safe() {
        // Enemy in the top lane, player still on the grass start row.
        assert!(!enemy_hits_player(100.0, 65.0, 100.0, 435.0));
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect { left: 0.0, top: 0.0, right: 10.0, bottom: 10.0 };
        let b = Rect { left: 10.0, top: 0.0, right: 20.0, bottom: 10.0 };
        assert!(!overlaps(a, b));
    }

    #[test]
    fn inset_rect_applies_every_edge() {
        let r = inset_rect(10.0, 20.0, PLAYER_INSETS);
        assert_eq!(r.left, 45.0);
        assert_eq!(r.right, 10.0 + SPRITE_W - 25.0);
        assert_eq!(r.top, 83.0);
        assert_eq!(r.bottom, 20.0 + SPRITE_H - 28.0);
    }
}
