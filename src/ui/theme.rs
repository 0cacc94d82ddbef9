use egui::Color32;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Classic,
    Lichess,
    ChessCom,
    Dark,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[Theme::Classic, Theme::Lichess, Theme::ChessCom, Theme::Dark]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Classic => "Classic",
            Theme::Lichess => "Lichess",
            Theme::ChessCom => "Chess.com",
            Theme::Dark => "Dark",
        }
    }

    pub fn light_square(&self) -> Color32 {
        match self {
            Theme::Classic => Color32::from_rgb(239, 216, 183),
            Theme::Lichess => Color32::from_rgb(240, 217, 181),
            Theme::ChessCom => Color32::from_rgb(238, 238, 210),
            Theme::Dark => Color32::from_rgb(100, 100, 100),
        }
    }

    pub fn dark_square(&self) -> Color32 {
        match self {
            Theme::Classic => Color32::from_rgb(180, 136, 102),
            Theme::Lichess => Color32::from_rgb(181, 136, 99),
            Theme::ChessCom => Color32::from_rgb(118, 150, 86),
            Theme::Dark => Color32::from_rgb(60, 60, 60),
        }
    }

    /// Outline around the square the human picked up.
    pub fn selected_square(&self) -> Color32 {
        match self {
            Theme::Classic => Color32::from_rgb(0, 0, 255),
            Theme::Lichess | Theme::ChessCom => Color32::from_rgb(186, 202, 68),
            Theme::Dark => Color32::from_rgb(130, 151, 105),
        }
    }

    /// Outline around both squares of the previous move.
    pub fn last_move_highlight(&self) -> Color32 {
        match self {
            Theme::Classic => Color32::from_rgb(0x00, 0x59, 0xff),
            Theme::Lichess => Color32::from_rgb(205, 210, 106),
            Theme::ChessCom => Color32::from_rgb(247, 247, 105),
            Theme::Dark => Color32::from_rgb(170, 162, 58),
        }
    }

    /// Fill of the destination markers.
    pub fn legal_move_dot(&self) -> Color32 {
        match self {
            Theme::Classic => Color32::from_rgba_unmultiplied(0, 160, 0, 170),
            _ => Color32::from_rgba_unmultiplied(0, 0, 0, 40),
        }
    }

    pub fn coordinate_color_light(&self) -> Color32 {
        self.dark_square()
    }

    pub fn coordinate_color_dark(&self) -> Color32 {
        self.light_square()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_contrast_with_their_square() {
        for theme in Theme::all() {
            assert_eq!(theme.coordinate_color_light(), theme.dark_square());
            assert_eq!(theme.coordinate_color_dark(), theme.light_square());
            assert_ne!(theme.light_square(), theme.dark_square());
        }
    }
}
