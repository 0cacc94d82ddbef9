//! Match controller: turn sequencing, selection handling and the opponent's
//! asynchronous move requests for one game against the engine.

mod sampler;
mod selection;
mod status;

pub use selection::{Selection, SelectionOutcome};
pub use status::{Reaction, FAILURE_STATUS};

use sampler::EngineComputationHandle;
use status::{history, status_text};

use crate::engine::{EngineError, EngineEvent, EngineLink, PlannedMove};
use crate::game::{GameError, GameModel, Position, Side};
use crate::ui::coords::Orientation;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Pause between a state change and the opponent's move request, so the new
/// position is painted first.
pub const OPPONENT_DELAY: Duration = Duration::from_millis(250);

/// How often the moves-considered readout refreshes while the opponent thinks.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("The opponent is still thinking")]
    OpponentThinking,
    #[error("It is not the human player's turn")]
    NotHumansTurn,
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SideChoice {
    #[default]
    White,
    Black,
    Random,
}

impl SideChoice {
    pub fn all() -> &'static [SideChoice] {
        &[SideChoice::White, SideChoice::Black, SideChoice::Random]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SideChoice::White => "White",
            SideChoice::Black => "Black",
            SideChoice::Random => "Random",
        }
    }

    pub fn resolve(self, rng: &mut impl Rng) -> Side {
        match self {
            SideChoice::White => Side::White,
            SideChoice::Black => Side::Black,
            SideChoice::Random => {
                if rng.gen_bool(0.5) {
                    Side::White
                } else {
                    Side::Black
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MatchConfig {
    pub engine_level: u32,
    pub side: SideChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    AwaitingHuman,
    AwaitingOpponent,
    Checkmate,
    Stalemate,
}

impl MatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchState::Checkmate | MatchState::Stalemate)
    }
}

/// Why `schedule_opponent_move` did or did not start a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Started,
    HumanToMove,
    GameOver,
    Busy,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub from: Position,
    pub to: Position,
}

/// One game between the human and the engine.
///
/// The session is the only writer of the game model. It is driven by the UI
/// event loop: pointer releases, button presses and a periodic [`tick`].
///
/// [`tick`]: MatchSession::tick
pub struct MatchSession<G: GameModel> {
    game: G,
    engine: EngineLink<G>,
    config: MatchConfig,
    human: Side,

    selection: Selection,
    last_move: Option<LastMove>,
    history: Vec<String>,
    status: String,
    status_override: Option<String>,
    reaction: Option<Reaction>,
    moves_considered: u64,

    opponent_due: Option<Instant>,
    thinking: Option<EngineComputationHandle>,
    next_request: u64,
    halted: bool,
    redraws: u64,
}

impl<G: GameModel> MatchSession<G> {
    pub fn new(game: G, engine: EngineLink<G>, config: MatchConfig, now: Instant) -> Self {
        let mut session = Self {
            game,
            engine,
            config,
            human: Side::White,
            selection: Selection::Idle,
            last_move: None,
            history: Vec::new(),
            status: String::new(),
            status_override: None,
            reaction: None,
            moves_considered: 0,
            opponent_due: None,
            thinking: None,
            next_request: 0,
            halted: false,
            redraws: 0,
        };
        session.reset(config, now);
        session
    }

    pub fn reset(&mut self, config: MatchConfig, now: Instant) {
        self.reset_with(config, now, &mut rand::thread_rng());
    }

    pub fn reset_with(&mut self, config: MatchConfig, now: Instant, rng: &mut impl Rng) {
        if let Some(handle) = self.thinking.take() {
            let request = handle.request();
            handle.finish(|| self.engine.moves_considered());
            tracing::info!("Reset abandons in-flight request {}", request);
        }

        self.config = config;
        self.human = config.side.resolve(rng);
        self.engine.set_level(config.engine_level);

        self.selection.clear();
        self.last_move = None;
        self.reaction = None;
        self.status_override = None;
        self.moves_considered = 0;
        self.halted = false;
        self.game.reset();

        tracing::info!(
            "New match: human plays {:?}, engine level {}",
            self.human,
            config.engine_level
        );
        self.refresh_reports();
        self.request_redraw();
        self.opponent_due = Some(now + OPPONENT_DELAY);
    }

    /// Applies the engine strength immediately, without waiting for a reset.
    pub fn set_engine_level(&mut self, level: u32) {
        self.config.engine_level = level;
        self.engine.set_level(level);
    }

    /// Handles one pointer release on the logical square `at`.
    pub fn pointer_release(&mut self, at: Position, now: Instant) -> SelectionOutcome {
        if self.thinking.is_some() {
            tracing::debug!("Ignoring release on {} while the opponent thinks", at);
            return SelectionOutcome::Ignored;
        }

        let outcome = self.selection.release(at, &self.game, self.human);
        tracing::debug!("Release on {}: {:?}", at, outcome);

        if let SelectionOutcome::Commit { from, to } = outcome {
            if let Err(e) = self.commit_human_move(from, to, now) {
                tracing::warn!("Selected move {} -> {} rejected: {}", from, to, e);
            }
        }
        self.request_redraw();
        outcome
    }

    pub fn commit_human_move(
        &mut self,
        from: Position,
        to: Position,
        now: Instant,
    ) -> Result<(), SessionError> {
        if self.thinking.is_some() {
            return Err(SessionError::OpponentThinking);
        }
        if self.game.turn() != self.human {
            return Err(SessionError::NotHumansTurn);
        }

        self.selection.clear();
        self.game.move_piece(from, to)?;
        self.last_move = Some(LastMove { from, to });
        self.game.next_turn();
        self.halted = false;
        self.status_override = None;

        self.refresh_reports();
        self.request_redraw();
        self.opponent_due = Some(now + OPPONENT_DELAY);
        Ok(())
    }

    /// Starts an opponent computation if one is due. Safe to call at any time.
    pub fn schedule_opponent_move(&mut self, now: Instant) -> ScheduleOutcome {
        if self.thinking.is_some() {
            return ScheduleOutcome::Busy;
        }
        match self.state() {
            state if state.is_terminal() => return ScheduleOutcome::GameOver,
            MatchState::AwaitingOpponent => {}
            _ => return ScheduleOutcome::HumanToMove,
        }
        if self.halted {
            return ScheduleOutcome::Halted;
        }

        let side = self.game.turn();
        let request = self.next_request;
        self.next_request += 1;

        let handle = EngineComputationHandle::new(request, side, now, SAMPLE_INTERVAL);
        if let Err(e) = self.engine.request_move(request, self.game.clone(), side) {
            handle.finish(|| self.engine.moves_considered());
            self.fail_opponent(e);
            return ScheduleOutcome::Halted;
        }

        tracing::info!("Request {}: engine to move for {:?}", request, side);
        self.thinking = Some(handle);
        self.moves_considered = 0;
        self.request_redraw();
        ScheduleOutcome::Started
    }

    /// Advances timers and collects engine answers. Call once per UI frame.
    pub fn tick(&mut self, now: Instant) {
        if let Some(due) = self.opponent_due {
            if now >= due {
                self.opponent_due = None;
                let outcome = self.schedule_opponent_move(now);
                tracing::trace!("Opponent timer fired: {:?}", outcome);
            }
        }

        if let Some(handle) = self.thinking.as_mut() {
            let engine = &self.engine;
            if let Some(n) = handle.sample(now, || engine.moves_considered()) {
                self.moves_considered = n;
                self.request_redraw();
            }
        }

        while let Some(event) = self.engine.try_event() {
            self.handle_engine_event(event);
        }
    }

    /// Blocks until the in-flight computation resolves or `timeout` passes.
    /// Returns `true` once nothing is in flight.
    pub fn wait_for_opponent(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.thinking.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.engine.wait_event(remaining) {
                Some(event) => self.handle_engine_event(event),
                None => return false,
            }
        }
        true
    }

    /// Takes back the last two plies (or the only one). Returns how many were reverted.
    pub fn undo(&mut self, now: Instant) -> Result<usize, SessionError> {
        if self.thinking.is_some() {
            tracing::warn!("Undo rejected while the opponent thinks");
            return Err(SessionError::OpponentThinking);
        }

        let mut reverted = 0;
        while reverted < 2 && !self.game.move_history().is_empty() {
            self.game.undo_move();
            self.game.next_turn();
            reverted += 1;
        }
        if reverted == 0 {
            return Ok(0);
        }

        tracing::info!("Undid {} plies", reverted);
        self.selection.clear();
        self.last_move = None;
        self.reaction = None;
        self.status_override = None;
        self.halted = false;
        self.refresh_reports();
        self.request_redraw();
        self.opponent_due = Some(now + OPPONENT_DELAY);
        Ok(reverted)
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Move { request, result } => {
                match &self.thinking {
                    Some(handle) if handle.request() == request => {}
                    _ => {
                        tracing::debug!("Discarding stale answer for request {}", request);
                        return;
                    }
                }
                if let Some(handle) = self.thinking.take() {
                    self.complete_opponent_move(handle, result);
                }
            }
            EngineEvent::Terminated => {
                if let Some(handle) = self.thinking.take() {
                    handle.finish(|| self.engine.moves_considered());
                    self.fail_opponent(EngineError::Terminated);
                }
            }
        }
    }

    fn complete_opponent_move(
        &mut self,
        handle: EngineComputationHandle,
        result: Result<PlannedMove, EngineError>,
    ) {
        let side = handle.side();
        let outcome = result
            .map_err(|e| e.to_string())
            .and_then(|mv| self.apply_opponent_move(side, mv).map(|()| mv));

        self.moves_considered = handle.finish(|| self.engine.moves_considered());

        match outcome {
            Ok(mv) => {
                tracing::info!("Opponent played {} -> {}", mv.from, mv.to);
                self.refresh_reports();
                self.request_redraw();
            }
            Err(reason) => self.fail_opponent(reason),
        }
    }

    /// Validates and plays an engine move; the model is untouched on error.
    fn apply_opponent_move(&mut self, side: Side, mv: PlannedMove) -> Result<(), String> {
        if self.game.turn() != side {
            return Err(format!("engine moved for {:?} out of turn", side));
        }
        match self.game.piece_at(mv.from) {
            Some(piece) if piece.side == side => {}
            _ => return Err(format!("engine moved from empty or foreign square {}", mv.from)),
        }
        if !self.game.valid_moves(mv.from).contains(&mv.to) {
            return Err(format!("engine proposed illegal move {} -> {}", mv.from, mv.to));
        }

        self.game.move_piece(mv.from, mv.to).map_err(|e| e.to_string())?;
        self.last_move = Some(LastMove { from: mv.from, to: mv.to });
        self.game.next_turn();
        Ok(())
    }

    fn fail_opponent(&mut self, reason: impl std::fmt::Display) {
        tracing::error!("Opponent move failed: {}", reason);
        self.selection.clear();
        self.last_move = None;
        self.halted = true;
        self.status_override = Some(FAILURE_STATUS.to_string());
        self.refresh_reports();
        self.request_redraw();
    }

    fn refresh_reports(&mut self) {
        self.status = status_text(&self.game, self.human, self.status_override.as_deref());
        self.history = history(&self.game);

        let turn = self.game.turn();
        if self.status_override.is_none() && self.reaction.is_none() && self.game.is_checkmate(turn) {
            let reaction = Reaction::random(&mut rand::thread_rng());
            tracing::info!("{:?} is checkmated (reaction {})", turn, reaction.variant());
            self.reaction = Some(reaction);
        }
    }

    fn request_redraw(&mut self) {
        self.redraws = self.redraws.wrapping_add(1);
    }

    pub fn state(&self) -> MatchState {
        let turn = self.game.turn();
        if self.game.is_checkmate(turn) {
            MatchState::Checkmate
        } else if self.game.is_stalemate(turn) {
            MatchState::Stalemate
        } else if turn == self.human {
            MatchState::AwaitingHuman
        } else {
            MatchState::AwaitingOpponent
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    pub fn human_side(&self) -> Side {
        self.human
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::for_side(self.human)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn reaction(&self) -> Option<Reaction> {
        self.reaction
    }

    pub fn moves_considered(&self) -> u64 {
        self.moves_considered
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking.is_some()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.opponent_due.is_some()
    }

    /// Bumped on every state change the board should repaint for.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}
