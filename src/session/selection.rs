use crate::game::{GameModel, Position, Side};

/// Click-to-move selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Selected {
        square: Position,
        destinations: Vec<Position>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// A piece was picked up.
    Selected(Position),
    /// The release landed on a legal destination; the move should be played.
    Commit { from: Position, to: Position },
    /// A held selection was dropped without moving.
    Cleared,
    /// Nothing actionable; stays idle.
    Ignored,
}

impl Selection {
    pub fn square(&self) -> Option<Position> {
        match self {
            Selection::Idle => None,
            Selection::Selected { square, .. } => Some(*square),
        }
    }

    pub fn destinations(&self) -> &[Position] {
        match self {
            Selection::Idle => &[],
            Selection::Selected { destinations, .. } => destinations,
        }
    }

    pub fn clear(&mut self) {
        *self = Selection::Idle;
    }

    /// Feeds one pointer release at `at`.
    ///
    /// A release that is not a legal destination always drops the selection,
    /// even when it lands on another of the player's pieces; picking that piece
    /// up takes a second release.
    pub fn release<G: GameModel>(&mut self, at: Position, game: &G, human: Side) -> SelectionOutcome {
        match std::mem::take(self) {
            Selection::Idle => {
                let turn = game.turn();
                match game.piece_at(at) {
                    Some(piece) if piece.side == turn && turn == human => {
                        *self = Selection::Selected {
                            square: at,
                            destinations: game.valid_moves(at),
                        };
                        SelectionOutcome::Selected(at)
                    }
                    _ => SelectionOutcome::Ignored,
                }
            }
            Selection::Selected { square, destinations } => {
                if destinations.contains(&at) {
                    SelectionOutcome::Commit { from: square, to: at }
                } else {
                    SelectionOutcome::Cleared
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ChessGame;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn test_select_own_piece_on_own_turn() {
        let game = ChessGame::new();
        let mut selection = Selection::default();

        let outcome = selection.release(pos("e2"), &game, Side::White);
        assert_eq!(outcome, SelectionOutcome::Selected(pos("e2")));
        assert_eq!(selection.square(), Some(pos("e2")));
        assert_eq!(selection.destinations(), &[pos("e3"), pos("e4")]);
    }

    #[test]
    fn test_ignores_opponent_pieces_and_empty_squares() {
        let game = ChessGame::new();
        let mut selection = Selection::default();

        assert_eq!(selection.release(pos("e7"), &game, Side::White), SelectionOutcome::Ignored);
        assert_eq!(selection.release(pos("e4"), &game, Side::White), SelectionOutcome::Ignored);
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_ignores_input_when_not_humans_turn() {
        let game = ChessGame::new();
        let mut selection = Selection::default();

        // Human plays black; white is to move.
        assert_eq!(selection.release(pos("e2"), &game, Side::Black), SelectionOutcome::Ignored);
        assert_eq!(selection.release(pos("e7"), &game, Side::Black), SelectionOutcome::Ignored);
    }

    #[test]
    fn test_release_on_destination_commits() {
        let game = ChessGame::new();
        let mut selection = Selection::default();
        selection.release(pos("g1"), &game, Side::White);

        let outcome = selection.release(pos("f3"), &game, Side::White);
        assert_eq!(outcome, SelectionOutcome::Commit { from: pos("g1"), to: pos("f3") });
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_non_destination_clears_without_reselecting() {
        let game = ChessGame::new();
        let mut selection = Selection::default();
        selection.release(pos("e2"), &game, Side::White);

        // Another own piece: dropped, not re-selected.
        assert_eq!(selection.release(pos("d2"), &game, Side::White), SelectionOutcome::Cleared);
        assert_eq!(selection, Selection::Idle);

        // Same square twice.
        selection.release(pos("e2"), &game, Side::White);
        assert_eq!(selection.release(pos("e2"), &game, Side::White), SelectionOutcome::Cleared);

        // A second release starts the new selection.
        assert_eq!(
            selection.release(pos("d2"), &game, Side::White),
            SelectionOutcome::Selected(pos("d2"))
        );
    }
}
