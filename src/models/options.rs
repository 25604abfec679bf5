//! Per-tournament game configuration chosen in the creation wizard.

use serde::{Deserialize, Serialize};

/// Score a side must reach to win a match unless configured otherwise.
pub const DEFAULT_WINNING_SCORE: u32 = 5;

/// Visual theme handed to the game client. Has no effect on scoring.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Classic,
    Neon,
    Retro,
}

/// How brackets are shaped for a given participant count.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketLayout {
    /// Fixed table per count: leftover players are seeded into a later round.
    #[default]
    Seeded,
    /// Pad round 0 to a power of two; leftover players get a bye.
    Padded,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub theme: Theme,
    /// Long rallies score double (never past the winning score).
    pub score_bonus_enabled: bool,
    pub winning_score: u32,
    pub layout: BracketLayout,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Classic,
            score_bonus_enabled: false,
            winning_score: DEFAULT_WINNING_SCORE,
            layout: BracketLayout::Seeded,
        }
    }
}
