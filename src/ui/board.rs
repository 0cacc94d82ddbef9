use crate::game::Position;
use crate::ui::coords::{cell_rect, to_logical, Orientation};
use crate::ui::render_plan::{Highlight, LabelKind, RenderPlan};
use crate::ui::{PieceRenderer, Theme};
use egui::{pos2, vec2, Color32, Rect, Sense, Stroke, Ui};
use std::time::Duration;

const SPRITE_RETRY: Duration = Duration::from_millis(30);

pub struct ChessBoard<'a> {
    theme: Theme,
    orientation: Orientation,
    piece_renderer: &'a mut PieceRenderer,
}

pub struct BoardResponse {
    /// Logical square under the pointer when it was released.
    pub released: Option<Position>,
}

impl<'a> ChessBoard<'a> {
    pub fn new(theme: Theme, orientation: Orientation, piece_renderer: &'a mut PieceRenderer) -> Self {
        Self {
            theme,
            orientation,
            piece_renderer,
        }
    }

    pub fn show(&mut self, ui: &mut Ui, plan: &RenderPlan) -> BoardResponse {
        let available_size = ui.available_size();
        let board_size = available_size.x.min(available_size.y).max(0.0);
        let square_size = board_size / 8.0;

        let (board_rect, response) = ui.allocate_exact_size(vec2(board_size, board_size), Sense::click_and_drag());
        let painter = ui.painter_at(board_rect);

        for cell in &plan.squares {
            let color = if cell.light {
                self.theme.light_square()
            } else {
                self.theme.dark_square()
            };
            painter.rect_filled(cell_rect(cell.display, board_rect), 0.0, color);
        }

        for label in &plan.labels {
            let rect = cell_rect(label.display, board_rect);
            let color = if label.on_light {
                self.theme.coordinate_color_light()
            } else {
                self.theme.coordinate_color_dark()
            };
            let (anchor, align) = match label.kind {
                LabelKind::Rank => (rect.left_top() + vec2(2.0, 2.0), egui::Align2::LEFT_TOP),
                LabelKind::File => (rect.right_bottom() - vec2(2.0, 2.0), egui::Align2::RIGHT_BOTTOM),
            };
            painter.text(
                anchor,
                align,
                label.text.to_string(),
                egui::FontId::proportional(square_size * 0.18),
                color,
            );
        }

        let piece_size = (square_size * 0.9) as u32;
        let mut pass = self.piece_renderer.begin_pass(ui.ctx(), piece_size.max(1));
        for op in &plan.sprites {
            if piece_size == 0 {
                break;
            }
            if let Some(texture) = pass.sprite(op.piece) {
                let rect = cell_rect(op.display, board_rect);
                painter.image(
                    texture,
                    Rect::from_center_size(rect.center(), vec2(square_size * 0.9, square_size * 0.9)),
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
        }
        let barrier = pass.barrier();

        if barrier.is_clear() {
            let outline = (square_size * 0.05).max(1.0);
            for highlight in &plan.highlights {
                match *highlight {
                    Highlight::LastMove(display) => {
                        painter.rect_stroke(
                            cell_rect(display, board_rect).shrink(outline / 2.0),
                            0.0,
                            Stroke::new(outline, self.theme.last_move_highlight()),
                            egui::StrokeKind::Inside,
                        );
                    }
                    Highlight::Destination(display) => {
                        painter.circle_filled(
                            cell_rect(display, board_rect).center(),
                            square_size * 0.15,
                            self.theme.legal_move_dot(),
                        );
                    }
                    Highlight::Selected(display) => {
                        painter.rect_stroke(
                            cell_rect(display, board_rect).shrink(outline / 2.0),
                            0.0,
                            Stroke::new(outline, self.theme.selected_square()),
                            egui::StrokeKind::Inside,
                        );
                    }
                }
            }
        } else {
            tracing::trace!("{} sprites loading, highlights deferred", barrier.pending());
            ui.ctx().request_repaint_after(SPRITE_RETRY);
        }

        // Any release counts, including one that ends a drag across squares.
        let released = if response.clicked() || response.drag_stopped() {
            response
                .interact_pointer_pos()
                .or_else(|| ui.input(|i| i.pointer.interact_pos()))
                .map(|pixel| to_logical(pixel, board_rect, self.orientation))
        } else {
            None
        };
        if let Some(square) = released {
            tracing::debug!("Board released on {}", square);
        }

        BoardResponse { released }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ChessGame;
    use crate::session::Selection;
    use crate::ui::render_plan::plan_board;
    use egui::{Event, Modifiers, PointerButton};
    use egui_kittest::Harness;

    #[derive(Default)]
    struct BoardState {
        game: ChessGame,
        pieces: PieceRenderer,
        released: Vec<Position>,
    }

    fn board_harness() -> Harness<'static, BoardState> {
        Harness::builder()
            .with_size(vec2(400.0, 400.0))
            .build_ui_state(
                |ui, state: &mut BoardState| {
                    let plan = plan_board(&state.game, &Selection::Idle, None, Orientation::WhiteBottom);
                    let mut board = ChessBoard::new(Theme::Classic, Orientation::WhiteBottom, &mut state.pieces);
                    if let Some(square) = board.show(ui, &plan).released {
                        state.released.push(square);
                    }
                },
                BoardState::default(),
            )
    }

    fn button(harness: &mut Harness<'static, BoardState>, at: egui::Pos2, pressed: bool) {
        harness.input_mut().events.push(Event::PointerButton {
            pos: at,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        });
        harness.step();
    }

    fn move_to(harness: &mut Harness<'static, BoardState>, at: egui::Pos2) {
        harness.input_mut().events.push(Event::PointerMoved(at));
        harness.step();
    }

    #[test]
    fn test_click_reports_square() {
        let mut harness = board_harness();
        harness.step();

        let a8 = pos2(40.0, 40.0);
        move_to(&mut harness, a8);
        button(&mut harness, a8, true);
        button(&mut harness, a8, false);
        harness.step();

        assert_eq!(harness.state().released, vec!["a8".parse::<Position>().unwrap()]);
    }

    #[test]
    fn test_release_after_drag_reports_square() {
        let mut harness = board_harness();
        harness.step();

        let a8 = pos2(40.0, 40.0);
        let a1 = pos2(40.0, 360.0);
        move_to(&mut harness, a8);
        button(&mut harness, a8, true);
        move_to(&mut harness, pos2(40.0, 200.0));
        move_to(&mut harness, a1);
        button(&mut harness, a1, false);
        harness.step();

        assert_eq!(harness.state().released, vec!["a1".parse::<Position>().unwrap()]);
    }
}
