//! Persistence gateway: durable record of finished tournaments.

use crate::models::{FinalizeRequest, HistoryEntry};
use crate::services::accounts::{AccountDirectory, AccountId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PersistenceError {
    /// The summary cannot be stored as given; nothing was written.
    InvalidSummary(String),
    /// The store could not be reached or locked.
    Unavailable,
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::InvalidSummary(reason) => {
                write!(f, "Tournament could not be saved: {}", reason)
            }
            PersistenceError::Unavailable => write!(f, "Tournament storage is unavailable"),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Receives finished tournaments. Best effort and at most once: callers never retry.
pub trait PersistenceGateway: Send + Sync {
    fn record(&self, request: &FinalizeRequest) -> Result<(), PersistenceError>;
}

/// A participant as stored: linked to an account when the name matched one.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Participant {
    Account(AccountId),
    Alias(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round: usize,
    pub player1: Participant,
    pub player2: Participant,
    pub score1: u32,
    pub score2: u32,
    pub winner: Participant,
    pub played_at: DateTime<Utc>,
}

/// Aggregate statistics per account.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub wins: u32,
    pub losses: u32,
    pub high_score: u32,
    pub tournaments_won: u32,
}

#[derive(Clone, Debug, Default)]
struct Store {
    matches: Vec<MatchRecord>,
    stats: HashMap<AccountId, PlayerStats>,
    tournaments: usize,
}

/// In-memory gateway. Each `record` is all-or-nothing: changes are staged on a copy
/// and swapped in only when every entry was accepted.
pub struct InMemoryGateway {
    accounts: Arc<dyn AccountDirectory + Send + Sync>,
    store: RwLock<Store>,
}

impl InMemoryGateway {
    pub fn new(accounts: Arc<dyn AccountDirectory + Send + Sync>) -> Self {
        Self {
            accounts,
            store: RwLock::new(Store::default()),
        }
    }

    pub fn stats(&self, account: AccountId) -> Option<PlayerStats> {
        self.store.read().ok()?.stats.get(&account).cloned()
    }

    pub fn matches(&self) -> Vec<MatchRecord> {
        self.store
            .read()
            .map(|g| g.matches.clone())
            .unwrap_or_default()
    }

    pub fn tournament_count(&self) -> usize {
        self.store.read().map(|g| g.tournaments).unwrap_or(0)
    }

    fn resolve(&self, name: &str) -> Participant {
        match self.accounts.find_by_name(name) {
            Some(id) => Participant::Account(id),
            None => Participant::Alias(name.to_string()),
        }
    }

    fn stage_entry(
        &self,
        staged: &mut Store,
        tournament_id: Uuid,
        entry: &HistoryEntry,
        played_at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        let (Some(s1), Some(s2)) = (entry.s1, entry.s2) else {
            return Err(PersistenceError::InvalidSummary(format!(
                "round {} match {} has no score",
                entry.round, entry.match_index
            )));
        };
        let winner_name = entry.winner.as_deref().ok_or_else(|| {
            PersistenceError::InvalidSummary(format!(
                "round {} match {} has no winner",
                entry.round, entry.match_index
            ))
        })?;
        let loser_name = if winner_name == entry.p1 {
            &entry.p2
        } else if winner_name == entry.p2 {
            &entry.p1
        } else {
            return Err(PersistenceError::InvalidSummary(format!(
                "winner '{}' did not play in round {} match {}",
                winner_name, entry.round, entry.match_index
            )));
        };

        let winner = self.resolve(winner_name);
        let loser = self.resolve(loser_name);
        let winner_score = s1.max(s2);
        let loser_score = s1.min(s2);

        if let Participant::Account(id) = &winner {
            let stats = staged.stats.entry(*id).or_default();
            stats.wins += 1;
            stats.high_score = stats.high_score.max(winner_score);
        }
        if let Participant::Account(id) = &loser {
            let stats = staged.stats.entry(*id).or_default();
            stats.losses += 1;
            stats.high_score = stats.high_score.max(loser_score);
        }

        staged.matches.push(MatchRecord {
            id: Uuid::new_v4(),
            tournament_id,
            round: entry.round,
            player1: self.resolve(&entry.p1),
            player2: self.resolve(&entry.p2),
            score1: s1,
            score2: s2,
            winner,
            played_at,
        });
        Ok(())
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn record(&self, request: &FinalizeRequest) -> Result<(), PersistenceError> {
        let summary = &request.summary;
        let mut store = self.store.write().map_err(|_| PersistenceError::Unavailable)?;
        let mut staged = store.clone();
        let tournament_id = Uuid::new_v4();

        for entry in summary.history.iter().filter(|e| e.is_played()) {
            if let Err(e) = self.stage_entry(&mut staged, tournament_id, entry, summary.finished_at) {
                log::error!("Rolled back tournament save: {}", e);
                return Err(e);
            }
        }
        if let Some(Participant::Account(id)) = summary.champion.as_deref().map(|c| self.resolve(c)) {
            staged.stats.entry(id).or_default().tournaments_won += 1;
        }
        staged.tournaments += 1;

        *store = staged;
        log::info!(
            "Saved tournament {} ({} matches, champion {:?})",
            tournament_id,
            summary.total_matches,
            summary.champion
        );
        Ok(())
    }
}
