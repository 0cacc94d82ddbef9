use super::{EngineError, MoveEngine, MovesConsidered, PlannedMove};
use crate::game::{GameModel, Position, Side};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Picks a uniformly random legal move. Used when no Stockfish binary is around.
pub struct RandomMover {
    rng: StdRng,
}

impl RandomMover {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GameModel> MoveEngine<G> for RandomMover {
    fn set_level(&mut self, level: u32) -> Result<(), EngineError> {
        tracing::debug!("Random mover ignores level {}", level);
        Ok(())
    }

    fn generate_move(
        &mut self,
        game: &G,
        side: Side,
        progress: &MovesConsidered,
    ) -> Result<PlannedMove, EngineError> {
        let candidates: Vec<PlannedMove> = Position::all()
            .filter(|&pos| game.piece_at(pos).map(|p| p.side) == Some(side))
            .flat_map(|from| {
                game.valid_moves(from)
                    .into_iter()
                    .map(move |to| PlannedMove { from, to })
            })
            .collect();
        progress.add(candidates.len() as u64);

        candidates.choose(&mut self.rng).copied().ok_or(EngineError::NoMove)
    }
}

/// Level 0 plays uniformly random moves; level `n > 0` drives `primary` at its
/// strength `n - 1`.
pub struct RandomFloor<E> {
    primary: E,
    random: RandomMover,
    level: u32,
}

impl<E> RandomFloor<E> {
    pub fn new(primary: E) -> Self {
        Self {
            primary,
            random: RandomMover::new(),
            level: 0,
        }
    }
}

impl<G: GameModel, E: MoveEngine<G>> MoveEngine<G> for RandomFloor<E> {
    fn set_level(&mut self, level: u32) -> Result<(), EngineError> {
        self.level = level;
        match level.checked_sub(1) {
            Some(strength) => self.primary.set_level(strength),
            None => Ok(()),
        }
    }

    fn generate_move(
        &mut self,
        game: &G,
        side: Side,
        progress: &MovesConsidered,
    ) -> Result<PlannedMove, EngineError> {
        if self.level == 0 {
            MoveEngine::<G>::generate_move(&mut self.random, game, side, progress)
        } else {
            self.primary.generate_move(game, side, progress)
        }
    }

    fn shutdown(&mut self) {
        self.primary.shutdown();
    }
}
