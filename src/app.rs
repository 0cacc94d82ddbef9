use crate::engine::{locate_stockfish, EngineActor, EngineLink, RandomFloor, RandomMover, UciEngine};
use crate::game::ChessGame;
use crate::session::{MatchConfig, MatchSession};
use crate::ui::render_plan::plan_board;
use crate::ui::{ChessBoard, ControlAction, ControlPanel, MoveList, PanelView, PieceRenderer, Theme};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How often the UI wakes while a timer or engine search is outstanding.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    config: MatchConfig,
    theme: Theme,
}

pub struct ChessApp {
    session: MatchSession<ChessGame>,
    state: AppState,
    piece_renderer: PieceRenderer,
    seen_redraws: u64,
}

/// Stockfish above level 0 when one can be found and started, otherwise the random mover.
fn spawn_engine() -> EngineLink<ChessGame> {
    match locate_stockfish() {
        Some(path) => match UciEngine::launch(&path) {
            Ok(engine) => return EngineActor::spawn(RandomFloor::new(engine)),
            Err(e) => tracing::warn!("Failed to start engine at {}: {:#}", path, e),
        },
        None => tracing::warn!("No Stockfish binary found; set STOCKFISH_PATH to use one"),
    }
    tracing::info!("Falling back to the random mover");
    EngineActor::spawn(RandomMover::new())
}

impl ChessApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let state: AppState = cc
            .storage
            .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
            .unwrap_or_default();

        let session = MatchSession::new(ChessGame::new(), spawn_engine(), state.config, Instant::now());

        Self {
            session,
            state,
            piece_renderer: PieceRenderer::new(),
            seen_redraws: 0,
        }
    }

    fn handle_control_action(&mut self, action: ControlAction) {
        let now = Instant::now();
        match action {
            ControlAction::Reset => self.session.reset(self.state.config, now),
            ControlAction::Undo => match self.session.undo(now) {
                Ok(n) => tracing::info!("Took back {} plies", n),
                Err(e) => tracing::warn!("Undo failed: {}", e),
            },
            ControlAction::SetEngineLevel(level) => self.session.set_engine_level(level),
            ControlAction::SetSideChoice(choice) => {
                tracing::info!("Side choice {:?} applies from the next reset", choice);
            }
            ControlAction::SetTheme(theme) => tracing::info!("Theme set to {:?}", theme),
        }
    }
}

impl eframe::App for ChessApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.tick(Instant::now());

        if self.session.redraws() != self.seen_redraws {
            self.seen_redraws = self.session.redraws();
            ctx.request_repaint();
        }
        if self.session.is_thinking() || self.session.has_pending_timer() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }

        egui::SidePanel::left("sidebar")
            .default_width(240.0)
            .show(ctx, |ui| {
                let view = PanelView {
                    status: self.session.status(),
                    moves_considered: self.session.moves_considered(),
                    reaction: self.session.reaction().map(|r| r.caption()),
                    thinking: self.session.is_thinking(),
                };
                if let Some(action) =
                    ControlPanel::show(ui, view, &mut self.state.config, &mut self.state.theme)
                {
                    self.handle_control_action(action);
                }
            });

        egui::TopBottomPanel::bottom("moves")
            .default_height(120.0)
            .show(ctx, |ui| {
                MoveList::show(ui, self.session.history());
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let plan = plan_board(
                self.session.game(),
                self.session.selection(),
                self.session.last_move(),
                self.session.orientation(),
            );
            let mut board = ChessBoard::new(
                self.state.theme,
                self.session.orientation(),
                &mut self.piece_renderer,
            );
            let response = board.show(ui, &plan);

            if let Some(square) = response.released {
                self.session.pointer_release(square, Instant::now());
            }
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        tracing::info!("Shutting down after {} plies", self.session.history().len());
    }
}
