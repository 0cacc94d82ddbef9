mod state;

pub use state::ChessGame;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal move: {from} -> {to}")]
    IllegalMove { from: Position, to: Position },
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::White => "WHITE",
            Side::Black => "BLACK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
}

/// A square on the logical board. `file` 0 is the a-file, `rank` 0 is rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    file: u8,
    rank: u8,
}

impl Position {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Snaps any pair of grid indices onto the board.
    pub fn clamped(file: i32, rank: i32) -> Self {
        Self {
            file: file.clamp(0, 7) as u8,
            rank: rank.clamp(0, 7) as u8,
        }
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Position { file, rank }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl FromStr for Position {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Ok(Position {
                file: file - b'a',
                rank: rank - b'1',
            }),
            _ => Err(GameError::InvalidSquare(s.to_string())),
        }
    }
}

/// Rules authority consumed by the match controller.
///
/// `move_piece` never changes whose turn it is; callers advance the turn with
/// `next_turn`. Likewise `undo_move` only restores the board and expects a
/// following `next_turn` to re-synchronise the side to move.
pub trait GameModel: Clone + Send + 'static {
    fn reset(&mut self);
    fn piece_at(&self, pos: Position) -> Option<Piece>;
    /// Destinations the piece on `pos` may legally reach, including check safety.
    fn valid_moves(&self, pos: Position) -> Vec<Position>;
    fn move_piece(&mut self, from: Position, to: Position) -> Result<(), GameError>;
    fn next_turn(&mut self);
    fn turn(&self) -> Side;
    fn is_check(&self, side: Side) -> bool;
    fn is_checkmate(&self, side: Side) -> bool;
    fn is_stalemate(&self, side: Side) -> bool;
    fn undo_move(&mut self);
    fn move_history(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parse_and_display() {
        let pos: Position = "e2".parse().unwrap();
        assert_eq!(pos.file(), 4);
        assert_eq!(pos.rank(), 1);
        assert_eq!(pos.to_string(), "e2");
        assert!("i9".parse::<Position>().is_err());
        assert!("e".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_clamps_out_of_range() {
        assert_eq!(Position::clamped(-3, 12), Position::new(0, 7).unwrap());
        assert_eq!(Position::clamped(9, -1), Position::new(7, 0).unwrap());
        assert!(Position::new(8, 0).is_none());
        assert_eq!(Position::all().count(), 64);
    }
}
