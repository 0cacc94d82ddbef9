mod actor;
mod difficulty;
mod random;
mod uci;

pub use actor::{EngineActor, EngineEvent, EngineLink};
pub use difficulty::DifficultyLevel;
pub use random::{RandomFloor, RandomMover};
pub use uci::UciEngine;

use crate::game::{GameModel, Position, Side};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No legal move available")]
    NoMove,
    #[error("Engine I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Engine protocol error: {0}")]
    Protocol(String),
    #[error("Engine is no longer running")]
    Terminated,
    #[error("Engine panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedMove {
    pub from: Position,
    pub to: Position,
}

/// Running count of positions examined by the current computation.
///
/// Clones share the same counter, so the UI can sample it while the engine
/// thread is busy.
#[derive(Debug, Clone, Default)]
pub struct MovesConsidered(Arc<AtomicU64>);

impl MovesConsidered {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    /// Raises the counter to `n`; never lowers it within one computation.
    pub fn raise_to(&self, n: u64) {
        self.0.fetch_max(n, Ordering::Relaxed);
    }
}

/// Highest integer engine level; level 0 is random play, the rest map onto
/// [`DifficultyLevel`].
pub fn max_engine_level() -> u32 {
    DifficultyLevel::max_level() + 1
}

pub fn level_label(level: u32) -> &'static str {
    match level.checked_sub(1) {
        Some(strength) => DifficultyLevel::from_level(strength).label(),
        None => "Random moves",
    }
}

/// Move generator driven by the engine actor thread.
pub trait MoveEngine<G: GameModel>: Send + 'static {
    fn set_level(&mut self, level: u32) -> Result<(), EngineError>;

    fn generate_move(
        &mut self,
        game: &G,
        side: Side,
        progress: &MovesConsidered,
    ) -> Result<PlannedMove, EngineError>;

    fn shutdown(&mut self) {}
}

/// Finds a Stockfish binary: `STOCKFISH_PATH` first, then common install locations.
pub fn locate_stockfish() -> Option<String> {
    if let Ok(path) = std::env::var("STOCKFISH_PATH") {
        let expanded = shellexpand::tilde(&path).to_string();
        if std::path::Path::new(&expanded).exists() {
            return Some(expanded);
        }
        tracing::warn!("STOCKFISH_PATH points at a missing file: {}", expanded);
    }

    [
        "./stockfish",
        "~/bin/stockfish",
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/usr/games/stockfish",
        "/opt/homebrew/bin/stockfish",
    ]
    .iter()
    .map(|p| shellexpand::tilde(p).to_string())
    .find(|p| std::path::Path::new(p).exists())
}
