use crate::game::{GameModel, Side};
use rand::Rng;

pub const FAILURE_STATUS: &str = "Something went wrong! :(";

/// Status line for the side to move. `human` decides when "(thinking)" applies.
pub fn derive_status<G: GameModel>(game: &G, human: Side) -> String {
    let turn = game.turn();
    let prefix = format!("{} TURN", turn.label());

    if game.is_checkmate(turn) {
        format!("{}: CHECKMATE", prefix)
    } else if game.is_stalemate(turn) {
        format!("{}: STALEMATE", prefix)
    } else if game.is_check(turn) {
        format!("{}: CHECK", prefix)
    } else if turn != human {
        format!("{} (thinking)", prefix)
    } else {
        prefix
    }
}

/// Picks the override when one is supplied, otherwise derives from the game.
pub fn status_text<G: GameModel>(game: &G, human: Side, override_message: Option<&str>) -> String {
    match override_message {
        Some(message) => message.to_string(),
        None => derive_status(game, human),
    }
}

/// The notated move list, in game order.
pub fn history<G: GameModel>(game: &G) -> Vec<String> {
    game.move_history()
}

/// Cosmetic flourish shown once a checkmate lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction {
    variant: u8,
}

impl Reaction {
    pub const VARIANTS: u8 = 8;

    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            variant: rng.gen_range(1..=Self::VARIANTS),
        }
    }

    pub fn variant(&self) -> u8 {
        self.variant
    }

    pub fn caption(&self) -> &'static str {
        match self.variant {
            1 => "Oof.",
            2 => "That's the game.",
            3 => "Down goes the king!",
            4 => "No escape squares left.",
            5 => "Mate on the board.",
            6 => "The king has fallen.",
            7 => "Checkmate. Well, well.",
            _ => "Game over, man.",
        }
    }
}
