//! Rounds and the bracket.

use crate::models::game::{GameMatch, MatchRef};
use serde::{Deserialize, Serialize};

/// Ordered matches of one round. Order is construction order.
pub type Round = Vec<GameMatch>;

/// Single-elimination bracket: rounds in play order, the last one holding only the final.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub rounds: Vec<Round>,
}

impl Bracket {
    pub fn new(rounds: Vec<Round>) -> Self {
        Self { rounds }
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn total_matches(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    pub fn match_at(&self, at: MatchRef) -> Option<&GameMatch> {
        self.rounds.get(at.round).and_then(|r| r.get(at.index))
    }

    pub fn match_at_mut(&mut self, at: MatchRef) -> Option<&mut GameMatch> {
        self.rounds.get_mut(at.round).and_then(|r| r.get_mut(at.index))
    }

    /// The single match of the last round.
    pub fn final_match(&self) -> Option<&GameMatch> {
        match self.rounds.last() {
            Some(last) if last.len() == 1 => last.first(),
            _ => None,
        }
    }

    /// All matches with their position, round by round.
    pub fn iter_matches(&self) -> impl Iterator<Item = (MatchRef, &GameMatch)> {
        self.rounds.iter().enumerate().flat_map(|(r, round)| {
            round
                .iter()
                .enumerate()
                .map(move |(i, m)| (MatchRef::new(r, i), m))
        })
    }
}
