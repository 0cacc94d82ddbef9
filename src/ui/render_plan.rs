use crate::game::{GameModel, Piece, Position};
use crate::session::{LastMove, Selection};
use crate::ui::coords::{to_display, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareCell {
    pub display: Position,
    pub light: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Rank,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordLabel {
    pub display: Position,
    pub kind: LabelKind,
    pub text: char,
    pub on_light: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteOp {
    pub display: Position,
    pub piece: Piece,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    LastMove(Position),
    Destination(Position),
    Selected(Position),
}

/// Everything one board repaint draws, in display cells and paint order.
/// Highlights come last and wait until every sprite has been painted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPlan {
    pub squares: Vec<SquareCell>,
    pub labels: Vec<CoordLabel>,
    pub sprites: Vec<SpriteOp>,
    pub highlights: Vec<Highlight>,
}

fn is_light(pos: Position) -> bool {
    (pos.file() + pos.rank()) % 2 == 1
}

pub fn plan_board<G: GameModel>(
    game: &G,
    selection: &Selection,
    last_move: Option<LastMove>,
    orientation: Orientation,
) -> RenderPlan {
    let mut plan = RenderPlan::default();

    for pos in Position::all() {
        let display = to_display(pos, orientation);
        let light = is_light(pos);
        plan.squares.push(SquareCell { display, light });

        if display.file() == 0 {
            plan.labels.push(CoordLabel {
                display,
                kind: LabelKind::Rank,
                text: (b'1' + pos.rank()) as char,
                on_light: light,
            });
        }
        if display.rank() == 7 {
            plan.labels.push(CoordLabel {
                display,
                kind: LabelKind::File,
                text: (b'a' + pos.file()) as char,
                on_light: light,
            });
        }

        if let Some(piece) = game.piece_at(pos) {
            plan.sprites.push(SpriteOp { display, piece });
        }
    }

    if let Some(last) = last_move {
        plan.highlights.push(Highlight::LastMove(to_display(last.from, orientation)));
        plan.highlights.push(Highlight::LastMove(to_display(last.to, orientation)));
    }
    if let Some(square) = selection.square() {
        for dest in selection.destinations() {
            plan.highlights.push(Highlight::Destination(to_display(*dest, orientation)));
        }
        plan.highlights.push(Highlight::Selected(to_display(square, orientation)));
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ChessGame, PieceKind, Side};

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn test_plan_covers_board() {
        let game = ChessGame::new();
        let plan = plan_board(&game, &Selection::Idle, None, Orientation::WhiteBottom);
        assert_eq!(plan.squares.len(), 64);
        assert_eq!(plan.sprites.len(), 32);
        assert_eq!(plan.labels.len(), 16);
        assert!(plan.highlights.is_empty());

        // a1 is dark and sits bottom-left.
        let a1 = plan
            .squares
            .iter()
            .find(|s| s.display == Position::new(0, 7).unwrap())
            .unwrap();
        assert!(!a1.light);
    }

    #[test]
    fn test_inverted_board_puts_black_at_bottom() {
        let game = ChessGame::new();
        let plan = plan_board(&game, &Selection::Idle, None, Orientation::BlackBottom);
        let bottom_left = plan
            .sprites
            .iter()
            .find(|s| s.display == Position::new(0, 7).unwrap())
            .unwrap();
        assert_eq!(bottom_left.piece, Piece { side: Side::Black, kind: PieceKind::Rook });

        let rank_labels: String = plan
            .labels
            .iter()
            .filter(|l| l.kind == LabelKind::Rank)
            .map(|l| l.text)
            .collect();
        assert_eq!(rank_labels, "12345678");
        let top_label = plan
            .labels
            .iter()
            .find(|l| l.kind == LabelKind::Rank && l.display.rank() == 0)
            .unwrap();
        assert_eq!(top_label.text, '1');
    }

    #[test]
    fn test_highlights_follow_selection_and_last_move() {
        let game = ChessGame::new();
        let mut selection = Selection::Idle;
        selection.release(pos("e2"), &game, Side::White);
        let last = LastMove { from: pos("d7"), to: pos("d5") };

        let plan = plan_board(&game, &selection, Some(last), Orientation::WhiteBottom);
        assert_eq!(
            plan.highlights,
            vec![
                Highlight::LastMove(to_display(pos("d7"), Orientation::WhiteBottom)),
                Highlight::LastMove(to_display(pos("d5"), Orientation::WhiteBottom)),
                Highlight::Destination(to_display(pos("e3"), Orientation::WhiteBottom)),
                Highlight::Destination(to_display(pos("e4"), Orientation::WhiteBottom)),
                Highlight::Selected(to_display(pos("e2"), Orientation::WhiteBottom)),
            ]
        );
    }
}
