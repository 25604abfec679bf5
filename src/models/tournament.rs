//! Tournament session, cursor, and errors.

use crate::models::bracket::Bracket;
use crate::models::game::{GameMatch, MatchRef};
use crate::models::options::GameOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fewest participants a bracket can be built for.
pub const MIN_PLAYERS: usize = 2;
/// Most participants a bracket can be built for.
pub const MAX_PLAYERS: usize = 8;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Participant count outside 2..=8.
    WrongNumberOfPlayers { count: usize },
    /// A participant name is empty after trimming.
    EmptyPlayerName,
    /// Two participants share a name (case-insensitive).
    DuplicatePlayerName(String),
    /// The name is how byes are written in the summary.
    ReservedPlayerName(String),
    /// Controller is not in a state that allows this action.
    InvalidState,
    /// The tournament is complete; there is nothing left to play.
    NoCurrentMatch,
    /// The current match still has a placeholder slot.
    MatchNotPlayable,
    /// Declared winner is not one of the current match's players.
    UnknownWinner(String),
    /// Scores are tied or point to the other player.
    ScoreMismatch { score1: u32, score2: u32 },
    /// The match simulator failed; the session was discarded.
    SimulatorFailed(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::WrongNumberOfPlayers { count } => write!(
                f,
                "A tournament needs between {} and {} players (got {})",
                MIN_PLAYERS, MAX_PLAYERS, count
            ),
            TournamentError::EmptyPlayerName => write!(f, "Player names cannot be empty"),
            TournamentError::DuplicatePlayerName(name) => {
                write!(f, "Player name '{}' is used more than once", name)
            }
            TournamentError::ReservedPlayerName(name) => {
                write!(f, "'{}' is reserved and cannot be used as a player name", name)
            }
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::NoCurrentMatch => write!(f, "The tournament has no match left to play"),
            TournamentError::MatchNotPlayable => {
                write!(f, "The current match is still waiting for other results")
            }
            TournamentError::UnknownWinner(name) => {
                write!(f, "'{}' is not playing in the current match", name)
            }
            TournamentError::ScoreMismatch { score1, score2 } => {
                write!(f, "Score {}-{} does not match the declared winner", score1, score2)
            }
            TournamentError::SimulatorFailed(reason) => write!(f, "The game failed: {}", reason),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament session.
pub type TournamentId = Uuid;

/// Next match to attempt. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Cursor {
    pub round: usize,
    pub index: usize,
}

impl Cursor {
    pub fn position(&self) -> MatchRef {
        MatchRef::new(self.round, self.index)
    }
}

/// One running tournament: fixed participants, a bracket mutated in place, and the cursor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentSession {
    pub id: TournamentId,
    /// Participants in the order they were entered (player 1 is the organiser).
    pub players: Vec<String>,
    pub bracket: Bracket,
    pub cursor: Cursor,
    /// Winner of every resolved match, in resolution order (byes included).
    pub winners: Vec<String>,
    /// Winner argument of the most recent `advance`.
    pub last_winner: Option<String>,
    pub options: GameOptions,
    pub created_at: DateTime<Utc>,
}

impl TournamentSession {
    pub fn new(players: Vec<String>, bracket: Bracket, options: GameOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            players,
            bracket,
            cursor: Cursor::default(),
            winners: Vec::new(),
            last_winner: None,
            options,
            created_at: Utc::now(),
        }
    }

    pub fn match_at_cursor(&self) -> Option<&GameMatch> {
        self.bracket.match_at(self.cursor.position())
    }
}
