//! Match (game), slot values, and the downstream target a winner is written into.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match: `player1` or `player2`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Position of a match inside a bracket (round 0 first).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct MatchRef {
    pub round: usize,
    pub index: usize,
}

impl MatchRef {
    pub fn new(round: usize, index: usize) -> Self {
        Self { round, index }
    }
}

impl fmt::Display for MatchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {} match {}", self.round + 1, self.index + 1)
    }
}

/// The single slot in a later round that the winner of a match fills.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AdvanceTarget {
    pub round: usize,
    pub index: usize,
    pub side: Side,
}

/// How a bye is written in summaries and exports. Not allowed as a participant name.
pub const BYE_LABEL: &str = "BYE";

/// Content of one side of a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    /// A real participant.
    Concrete(String),
    /// Not known yet: filled by the winner of the referenced match.
    AwaitingWinnerOf(MatchRef),
    /// No opponent; the other side advances without playing.
    Bye,
}

impl SlotValue {
    pub fn concrete(name: impl Into<String>) -> Self {
        SlotValue::Concrete(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            SlotValue::Concrete(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        !matches!(self, SlotValue::Concrete(_))
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Concrete(name) => f.write_str(name),
            SlotValue::AwaitingWinnerOf(r) => write!(f, "Winner of {}", r),
            SlotValue::Bye => f.write_str(BYE_LABEL),
        }
    }
}

/// A single 1v1 contest within one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub player1: SlotValue,
    pub player2: SlotValue,
    /// Present only once the match has been played (byes carry no score).
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub done: bool,
    /// None if not yet resolved.
    pub winner: Option<Side>,
    /// Stamped at construction; None only for the final.
    pub advance_target: Option<AdvanceTarget>,
}

impl GameMatch {
    pub fn new(player1: SlotValue, player2: SlotValue) -> Self {
        Self {
            id: Uuid::new_v4(),
            player1,
            player2,
            score1: None,
            score2: None,
            done: false,
            winner: None,
            advance_target: None,
        }
    }

    pub fn slot(&self, side: Side) -> &SlotValue {
        match side {
            Side::One => &self.player1,
            Side::Two => &self.player2,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut SlotValue {
        match side {
            Side::One => &mut self.player1,
            Side::Two => &mut self.player2,
        }
    }

    /// Both sides hold real participants.
    pub fn is_playable(&self) -> bool {
        !self.player1.is_placeholder() && !self.player2.is_placeholder()
    }

    /// Exactly one real participant facing a `Bye`. Returns the side that advances.
    pub fn bye_side(&self) -> Option<Side> {
        match (&self.player1, &self.player2) {
            (SlotValue::Concrete(_), SlotValue::Bye) => Some(Side::One),
            (SlotValue::Bye, SlotValue::Concrete(_)) => Some(Side::Two),
            _ => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.bye_side().is_some()
    }

    /// Which side a participant name occupies, if any.
    pub fn side_of(&self, name: &str) -> Option<Side> {
        if self.player1.name() == Some(name) {
            Some(Side::One)
        } else if self.player2.name() == Some(name) {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.and_then(|side| self.slot(side).name())
    }

    /// Short human-readable label, e.g. "Alice vs Bob".
    pub fn label(&self) -> String {
        format!("{} vs {}", self.player1, self.player2)
    }
}
