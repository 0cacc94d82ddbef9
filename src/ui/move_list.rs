use egui::{ScrollArea, Ui};

pub struct MoveList;

impl MoveList {
    pub fn show(ui: &mut Ui, moves: &[String]) {
        ui.vertical(|ui| {
            ui.heading("Moves");
            ui.separator();

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (num, white, black) in numbered_pairs(moves) {
                        ui.horizontal(|ui| {
                            ui.label(format!("{}.", num));
                            ui.monospace(white);
                            if let Some(black) = black {
                                ui.monospace(black);
                            }
                        });
                    }

                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                });
        });
    }
}

/// Groups plies into numbered (white, black) rows.
fn numbered_pairs(moves: &[String]) -> Vec<(usize, &str, Option<&str>)> {
    moves
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| (i + 1, pair[0].as_str(), pair.get(1).map(String::as_str)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_leave_trailing_white_move_open() {
        let moves: Vec<String> = ["e4", "e5", "Nf3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            numbered_pairs(&moves),
            vec![(1, "e4", Some("e5")), (2, "Nf3", None)]
        );
        assert!(numbered_pairs(&[]).is_empty());
    }
}
