use crate::engine::{level_label, max_engine_level};
use crate::session::{MatchConfig, SideChoice};
use crate::ui::Theme;
use egui::Ui;

pub struct ControlPanel;

/// Read-only session facts the panel displays.
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    pub status: &'a str,
    pub moves_considered: u64,
    pub reaction: Option<&'static str>,
    pub thinking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Reset,
    Undo,
    SetEngineLevel(u32),
    SetSideChoice(SideChoice),
    SetTheme(Theme),
}

impl ControlPanel {
    pub fn show(
        ui: &mut Ui,
        view: PanelView<'_>,
        config: &mut MatchConfig,
        theme: &mut Theme,
    ) -> Option<ControlAction> {
        let mut action = None;

        ui.vertical(|ui| {
            ui.heading("Chess Match");
            ui.separator();

            ui.horizontal(|ui| {
                if view.thinking {
                    ui.spinner();
                }
                ui.label(view.status);
            });
            ui.label(format!("Moves Considered: {}", view.moves_considered));

            if let Some(caption) = view.reaction {
                ui.colored_label(egui::Color32::GREEN, caption);
            }

            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    action = Some(ControlAction::Reset);
                }
                if ui.add_enabled(!view.thinking, egui::Button::new("Undo")).clicked() {
                    action = Some(ControlAction::Undo);
                }
            });

            ui.add_space(10.0);
            ui.separator();

            // Takes effect on the next reset.
            ui.label("Play as:");
            ui.horizontal(|ui| {
                for choice in SideChoice::all() {
                    if ui.selectable_label(config.side == *choice, choice.label()).clicked() {
                        config.side = *choice;
                        action = Some(ControlAction::SetSideChoice(*choice));
                    }
                }
            });

            ui.add_space(10.0);

            ui.label("Engine level:");
            egui::ComboBox::from_id_salt("engine_level")
                .selected_text(level_label(config.engine_level))
                .show_ui(ui, |ui| {
                    for level in 0..=max_engine_level() {
                        let label = level_label(level);
                        if ui.selectable_value(&mut config.engine_level, level, label).clicked() {
                            action = Some(ControlAction::SetEngineLevel(level));
                        }
                    }
                });

            ui.add_space(10.0);

            ui.label("Theme:");
            egui::ComboBox::from_id_salt("theme")
                .selected_text(theme.label())
                .show_ui(ui, |ui| {
                    for t in Theme::all() {
                        if ui.selectable_value(theme, *t, t.label()).clicked() {
                            action = Some(ControlAction::SetTheme(*t));
                        }
                    }
                });
        });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui_kittest::kittest::Queryable;
    use egui_kittest::Harness;

    #[derive(Default)]
    struct PanelState {
        config: MatchConfig,
        theme: Theme,
        actions: Vec<ControlAction>,
    }

    fn harness(status: &'static str, reaction: Option<&'static str>) -> Harness<'static, PanelState> {
        Harness::new_ui_state(
            move |ui, state: &mut PanelState| {
                let view = PanelView {
                    status,
                    moves_considered: 42,
                    reaction,
                    thinking: false,
                };
                if let Some(action) = ControlPanel::show(ui, view, &mut state.config, &mut state.theme) {
                    state.actions.push(action);
                }
            },
            PanelState::default(),
        )
    }

    #[test]
    fn test_panel_shows_status_and_counter() {
        let mut harness = harness("WHITE TURN", None);
        harness.run();
        harness.get_by_label("WHITE TURN");
        harness.get_by_label("Moves Considered: 42");
        assert!(harness.query_by_label("Oof.").is_none());
    }

    #[test]
    fn test_panel_shows_reaction() {
        let mut harness = harness("BLACK TURN: CHECKMATE", Some("Oof."));
        harness.run();
        harness.get_by_label("BLACK TURN: CHECKMATE");
        harness.get_by_label("Oof.");
    }

    #[test]
    fn test_buttons_report_actions() {
        let mut harness = harness("WHITE TURN", None);
        harness.run();

        harness.get_by_label("Reset").click();
        harness.run();
        harness.get_by_label("Random").click();
        harness.run();

        let state = harness.state();
        assert_eq!(
            state.actions,
            vec![
                ControlAction::Reset,
                ControlAction::SetSideChoice(SideChoice::Random)
            ]
        );
        assert_eq!(state.config.side, SideChoice::Random);
    }
}
