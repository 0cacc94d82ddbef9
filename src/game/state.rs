use super::{GameError, GameModel, Piece, PieceKind, Position, Side};
use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, File, Move,
    Position as _, Rank, Role, Square,
};

impl From<Color> for Side {
    fn from(c: Color) -> Self {
        match c {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(s: Side) -> Self {
        match s {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

impl From<Role> for PieceKind {
    fn from(role: Role) -> Self {
        match role {
            Role::Pawn => PieceKind::Pawn,
            Role::Knight => PieceKind::Knight,
            Role::Bishop => PieceKind::Bishop,
            Role::Rook => PieceKind::Rook,
            Role::Queen => PieceKind::Queen,
            Role::King => PieceKind::King,
        }
    }
}

impl From<Position> for Square {
    fn from(pos: Position) -> Self {
        Square::from_coords(File::new(pos.file() as u32), Rank::new(pos.rank() as u32))
    }
}

impl From<Square> for Position {
    fn from(sq: Square) -> Self {
        let index = sq as u8;
        Position::clamped((index % 8) as i32, (index / 8) as i32)
    }
}

/// Standard chess backed by `shakmaty`.
///
/// The reported turn is tracked separately from the position so the model can
/// follow the move / next-turn protocol of [`GameModel`]: after `move_piece` the
/// position already belongs to the other side, but `turn()` only flips once
/// `next_turn` is called.
#[derive(Debug, Clone)]
pub struct ChessGame {
    position: Chess,
    turn: Side,
    undo_stack: Vec<Chess>,
    move_history: Vec<String>,
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessGame {
    pub fn new() -> Self {
        Self {
            position: Chess::default(),
            turn: Side::White,
            undo_stack: Vec::new(),
            move_history: Vec::new(),
        }
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    /// Board destination of a legal move, with castling reported as the king's
    /// landing square.
    fn endpoints(m: &Move) -> Option<(Square, Square)> {
        match UciMove::from_move(m.clone(), CastlingMode::Standard) {
            UciMove::Normal { from, to, .. } => Some((from, to)),
            UciMove::Put { .. } | UciMove::Null => None,
        }
    }

    fn find_legal(&self, from: Square, to: Square) -> Option<Move> {
        let mut candidates = self
            .position
            .legal_moves()
            .into_iter()
            .filter(|m| Self::endpoints(m) == Some((from, to)));

        // Several candidates only happen for promotions; always take the queen.
        let first = candidates.next()?;
        if first.promotion().is_none() || first.promotion() == Some(Role::Queen) {
            return Some(first);
        }
        candidates
            .find(|m| m.promotion() == Some(Role::Queen))
            .or(Some(first))
    }
}

impl GameModel for ChessGame {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn piece_at(&self, pos: Position) -> Option<Piece> {
        let piece = self.position.board().piece_at(pos.into())?;
        Some(Piece {
            side: piece.color.into(),
            kind: piece.role.into(),
        })
    }

    fn valid_moves(&self, pos: Position) -> Vec<Position> {
        let square: Square = pos.into();
        let mut destinations: Vec<Position> = self
            .position
            .legal_moves()
            .iter()
            .filter_map(Self::endpoints)
            .filter(|(from, _)| *from == square)
            .map(|(_, to)| to.into())
            .collect();
        destinations.sort();
        destinations.dedup();
        destinations
    }

    fn move_piece(&mut self, from: Position, to: Position) -> Result<(), GameError> {
        let m = self
            .find_legal(from.into(), to.into())
            .ok_or(GameError::IllegalMove { from, to })?;

        let san = SanPlus::from_move(self.position.clone(), m.clone());

        let next = self
            .position
            .clone()
            .play(m)
            .map_err(|_| GameError::IllegalMove { from, to })?;

        self.undo_stack.push(std::mem::replace(&mut self.position, next));
        self.move_history.push(san.to_string());
        tracing::debug!("Played {} ({} -> {})", san, from, to);
        Ok(())
    }

    fn next_turn(&mut self) {
        self.turn = self.turn.opponent();
    }

    fn turn(&self) -> Side {
        self.turn
    }

    fn is_check(&self, side: Side) -> bool {
        let color: Color = side.into();
        let board = self.position.board();
        match board.king_of(color) {
            Some(king) => !board.attacks_to(king, !color, board.occupied()).is_empty(),
            None => false,
        }
    }

    fn is_checkmate(&self, side: Side) -> bool {
        Side::from(self.position.turn()) == side && self.position.is_checkmate()
    }

    fn is_stalemate(&self, side: Side) -> bool {
        Side::from(self.position.turn()) == side && self.position.is_stalemate()
    }

    fn undo_move(&mut self) {
        if let Some(previous) = self.undo_stack.pop() {
            self.position = previous;
            self.move_history.pop();
        }
    }

    fn move_history(&self) -> Vec<String> {
        self.move_history.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn play(game: &mut ChessGame, from: &str, to: &str) {
        game.move_piece(pos(from), pos(to)).unwrap();
        game.next_turn();
    }

    #[test]
    fn test_new_game() {
        let game = ChessGame::new();
        assert_eq!(game.turn(), Side::White);
        assert!(!game.is_check(Side::White));
        assert!(game.move_history().is_empty());
        assert_eq!(
            game.piece_at(pos("e1")),
            Some(Piece { side: Side::White, kind: PieceKind::King })
        );
    }

    #[test]
    fn test_valid_moves_for_pawn() {
        let game = ChessGame::new();
        assert_eq!(game.valid_moves(pos("e2")), vec![pos("e3"), pos("e4")]);
        assert!(game.valid_moves(pos("e7")).is_empty());
        assert!(game.valid_moves(pos("e4")).is_empty());
    }

    #[test]
    fn test_move_does_not_flip_turn_until_next_turn() {
        let mut game = ChessGame::new();
        game.move_piece(pos("e2"), pos("e4")).unwrap();
        assert_eq!(game.turn(), Side::White);
        game.next_turn();
        assert_eq!(game.turn(), Side::Black);
        assert_eq!(game.move_history(), vec!["e4".to_string()]);
    }

    #[test]
    fn test_illegal_move_leaves_model_untouched() {
        let mut game = ChessGame::new();
        let before = game.fen();
        let err = game.move_piece(pos("e2"), pos("e5")).unwrap_err();
        assert_eq!(err, GameError::IllegalMove { from: pos("e2"), to: pos("e5") });
        assert_eq!(game.fen(), before);
        assert!(game.move_history().is_empty());
    }

    #[test]
    fn test_undo_restores_position() {
        let mut game = ChessGame::new();
        let start = game.fen();
        play(&mut game, "e2", "e4");
        play(&mut game, "e7", "e5");
        game.undo_move();
        game.next_turn();
        game.undo_move();
        game.next_turn();
        assert_eq!(game.fen(), start);
        assert_eq!(game.turn(), Side::White);
        assert!(game.move_history().is_empty());

        // Nothing left to undo.
        game.undo_move();
        assert_eq!(game.fen(), start);
    }

    #[test]
    fn test_castling_reports_king_destination() {
        let mut game = ChessGame::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "e7", "e5");
        play(&mut game, "g1", "f3");
        play(&mut game, "b8", "c6");
        play(&mut game, "f1", "c4");
        play(&mut game, "g8", "f6");
        assert!(game.valid_moves(pos("e1")).contains(&pos("g1")));
        play(&mut game, "e1", "g1");
        assert_eq!(game.move_history().last().map(String::as_str), Some("O-O"));
        assert_eq!(game.piece_at(pos("f1")).map(|p| p.kind), Some(PieceKind::Rook));
    }

    #[test]
    fn test_scholars_mate() {
        let mut game = ChessGame::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "e7", "e5");
        play(&mut game, "d1", "h5");
        play(&mut game, "b8", "c6");
        play(&mut game, "f1", "c4");
        play(&mut game, "g8", "f6");
        play(&mut game, "h5", "f7");

        assert_eq!(game.turn(), Side::Black);
        assert!(game.is_check(Side::Black));
        assert!(game.is_checkmate(Side::Black));
        assert!(!game.is_checkmate(Side::White));
        assert!(!game.is_stalemate(Side::Black));
        assert_eq!(game.move_history().last().map(String::as_str), Some("Qxf7#"));
    }

    #[test]
    fn test_promotion_auto_queens() {
        let mut game = ChessGame::new();
        for (from, to) in [
            ("h2", "h4"), ("g7", "g5"), ("h4", "g5"), ("g8", "f6"),
            ("g5", "g6"), ("f6", "e4"), ("g6", "g7"), ("e4", "f6"),
        ] {
            play(&mut game, from, to);
        }
        play(&mut game, "g7", "h8");
        assert_eq!(
            game.piece_at(pos("h8")),
            Some(Piece { side: Side::White, kind: PieceKind::Queen })
        );
    }
}
