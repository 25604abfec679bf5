//! Finalized, persistence-ready record of a completed tournament.

use crate::models::tournament::TournamentSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One match of the bracket as it ended.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub round: usize,
    #[serde(rename = "match")]
    pub match_index: usize,
    pub p1: String,
    pub p2: String,
    pub s1: Option<u32>,
    pub s2: Option<u32>,
    pub done: bool,
    pub winner: Option<String>,
}

impl HistoryEntry {
    /// Byes carry no score and are not stored as played matches.
    pub fn is_played(&self) -> bool {
        self.done && self.s1.is_some() && self.s2.is_some()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub total_matches: usize,
    pub winners: Vec<String>,
    pub champion: Option<String>,
    pub finished_at: DateTime<Utc>,
    pub history: Vec<HistoryEntry>,
}

impl TournamentSummary {
    /// Snapshot every match of the session's bracket, round by round.
    pub fn from_session(session: &TournamentSession, champion: Option<String>) -> Self {
        let history: Vec<HistoryEntry> = session
            .bracket
            .iter_matches()
            .map(|(at, m)| HistoryEntry {
                round: at.round,
                match_index: at.index,
                p1: m.player1.to_string(),
                p2: m.player2.to_string(),
                s1: m.score1,
                s2: m.score2,
                done: m.done,
                winner: m.winner_name().map(str::to_owned),
            })
            .collect();
        Self {
            total_matches: history.len(),
            winners: session.winners.clone(),
            champion,
            finished_at: Utc::now(),
            history,
        }
    }

    /// History as CSV, one row per match, with a header line.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for entry in &self.history {
            writer.serialize(entry)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Body handed to the persistence gateway on completion.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub summary: TournamentSummary,
}
