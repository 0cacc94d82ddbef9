pub mod coords;
pub mod render_plan;

mod board;
mod controls;
mod move_list;
mod pieces;
mod theme;

pub use board::ChessBoard;
pub use controls::{ControlAction, ControlPanel, PanelView};
pub use move_list::MoveList;
pub use pieces::PieceRenderer;
pub use theme::Theme;
