use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Novice,
    Beginner,
    Casual,
    Intermediate,
    Advanced,
    Expert,
    Maximum,
}

impl DifficultyLevel {
    pub fn all() -> &'static [DifficultyLevel] {
        &[
            DifficultyLevel::Novice,
            DifficultyLevel::Beginner,
            DifficultyLevel::Casual,
            DifficultyLevel::Intermediate,
            DifficultyLevel::Advanced,
            DifficultyLevel::Expert,
            DifficultyLevel::Maximum,
        ]
    }

    /// Maps an integer engine level onto a strength setting; levels past the
    /// strongest one clamp to it.
    pub fn from_level(level: u32) -> Self {
        let all = Self::all();
        all[(level as usize).min(all.len() - 1)]
    }

    pub fn max_level() -> u32 {
        (Self::all().len() - 1) as u32
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyLevel::Novice => "Novice (~1100)",
            DifficultyLevel::Beginner => "Beginner (~1350)",
            DifficultyLevel::Casual => "Casual (~1500)",
            DifficultyLevel::Intermediate => "Intermediate (~1800)",
            DifficultyLevel::Advanced => "Advanced (~2100)",
            DifficultyLevel::Expert => "Expert (~2500)",
            DifficultyLevel::Maximum => "Maximum Strength",
        }
    }

    /// Returns the UCI commands needed to configure Stockfish for this difficulty
    pub fn uci_commands(&self) -> Vec<String> {
        match self {
            DifficultyLevel::Novice => {
                // UCI_Elo minimum is 1320, so we use Skill Level for very weak play
                vec![
                    "setoption name UCI_LimitStrength value false".to_string(),
                    "setoption name Skill Level value 0".to_string(),
                ]
            }
            DifficultyLevel::Maximum => vec![
                "setoption name UCI_LimitStrength value false".to_string(),
                "setoption name Skill Level value 20".to_string(),
            ],
            other => vec![
                "setoption name UCI_LimitStrength value true".to_string(),
                format!("setoption name UCI_Elo value {}", other.approximate_elo()),
            ],
        }
    }

    pub fn approximate_elo(&self) -> u32 {
        match self {
            DifficultyLevel::Novice => 1100,
            DifficultyLevel::Beginner => 1350,
            DifficultyLevel::Casual => 1500,
            DifficultyLevel::Intermediate => 1800,
            DifficultyLevel::Advanced => 2100,
            DifficultyLevel::Expert => 2500,
            DifficultyLevel::Maximum => 3500,
        }
    }

    /// Think time per move; weaker settings answer faster.
    pub fn movetime_ms(&self) -> u64 {
        match self {
            DifficultyLevel::Novice | DifficultyLevel::Beginner => 300,
            DifficultyLevel::Casual | DifficultyLevel::Intermediate => 700,
            DifficultyLevel::Advanced | DifficultyLevel::Expert => 1000,
            DifficultyLevel::Maximum => 2000,
        }
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel::Novice
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
