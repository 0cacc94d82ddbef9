//! Mapping between pointer pixels, the logical board and the on-screen grid.
//!
//! Display cells use the same [`Position`] type: `file` is the screen column
//! counted from the left, `rank` the screen row counted from the top.

use crate::game::{Position, Side};
use egui::{pos2, vec2, Pos2, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// White's first rank along the bottom edge.
    WhiteBottom,
    /// Board turned around for a human playing black.
    BlackBottom,
}

impl Orientation {
    pub fn for_side(human: Side) -> Self {
        match human {
            Side::White => Orientation::WhiteBottom,
            Side::Black => Orientation::BlackBottom,
        }
    }
}

/// Logical square to screen cell and back; applying it twice is the identity.
pub fn to_display(pos: Position, orientation: Orientation) -> Position {
    let (file, rank) = (pos.file() as i32, pos.rank() as i32);
    match orientation {
        Orientation::WhiteBottom => Position::clamped(file, 7 - rank),
        Orientation::BlackBottom => Position::clamped(7 - file, rank),
    }
}

/// Logical square under a pointer. Points off the board snap to the nearest edge cell.
pub fn to_logical(pixel: Pos2, board: Rect, orientation: Orientation) -> Position {
    let cell = board.width() / 8.0;
    if cell <= 0.0 {
        return to_display(Position::clamped(0, 0), orientation);
    }
    let col = ((pixel.x - board.min.x) / cell).floor();
    let row = ((pixel.y - board.min.y) / cell).floor();
    let display = Position::clamped(saturate(col), saturate(row));
    to_display(display, orientation)
}

/// Screen rectangle of a display cell.
pub fn cell_rect(display: Position, board: Rect) -> Rect {
    let cell = board.width() / 8.0;
    Rect::from_min_size(
        pos2(
            board.min.x + display.file() as f32 * cell,
            board.min.y + display.rank() as f32 * cell,
        ),
        vec2(cell, cell),
    )
}

fn saturate(v: f32) -> i32 {
    if v.is_nan() {
        0
    } else {
        v.clamp(-1.0, 8.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(480.0, 480.0))
    }

    #[test]
    fn test_display_mapping_is_self_inverse() {
        for orientation in [Orientation::WhiteBottom, Orientation::BlackBottom] {
            for pos in Position::all() {
                assert_eq!(to_display(to_display(pos, orientation), orientation), pos);
            }
        }
    }

    #[test]
    fn test_white_bottom_layout() {
        let a1: Position = "a1".parse().unwrap();
        assert_eq!(to_display(a1, Orientation::WhiteBottom), Position::new(0, 7).unwrap());
        assert_eq!(
            to_logical(pos2(10.0, 470.0), board(), Orientation::WhiteBottom),
            a1
        );
        assert_eq!(
            to_logical(pos2(470.0, 10.0), board(), Orientation::WhiteBottom),
            "h8".parse().unwrap()
        );
    }

    #[test]
    fn test_black_bottom_layout() {
        assert_eq!(
            to_logical(pos2(10.0, 470.0), board(), Orientation::BlackBottom),
            "h8".parse().unwrap()
        );
        assert_eq!(
            to_logical(pos2(10.0, 10.0), board(), Orientation::BlackBottom),
            "h1".parse().unwrap()
        );
    }

    #[test]
    fn test_pointer_outside_board_clamps() {
        let board = Rect::from_min_size(pos2(100.0, 50.0), vec2(400.0, 400.0));
        assert_eq!(
            to_logical(pos2(-500.0, 9000.0), board, Orientation::WhiteBottom),
            "a1".parse().unwrap()
        );
        assert_eq!(
            to_logical(pos2(1e9, -1e9), board, Orientation::WhiteBottom),
            "h8".parse().unwrap()
        );
        assert_eq!(
            to_logical(pos2(f32::NAN, 60.0), board, Orientation::WhiteBottom),
            "a8".parse().unwrap()
        );
    }

    #[test]
    fn test_cell_rect_round_trips_through_pointer() {
        for orientation in [Orientation::WhiteBottom, Orientation::BlackBottom] {
            for pos in Position::all() {
                let rect = cell_rect(to_display(pos, orientation), board());
                assert_eq!(to_logical(rect.center(), board(), orientation), pos);
            }
        }
    }
}
