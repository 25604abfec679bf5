//! Data structures for the pong tournament: slots, matches, bracket, session, summary.

mod bracket;
mod game;
mod options;
mod summary;
mod tournament;

pub use bracket::{Bracket, Round};
pub use game::{AdvanceTarget, GameMatch, MatchId, MatchRef, Side, SlotValue, BYE_LABEL};
pub use options::{BracketLayout, GameOptions, Theme, DEFAULT_WINNING_SCORE};
pub use summary::{FinalizeRequest, HistoryEntry, TournamentSummary};
pub use tournament::{
    Cursor, TournamentError, TournamentId, TournamentSession, MAX_PLAYERS, MIN_PLAYERS,
};
