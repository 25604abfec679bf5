//! Pong tournament web app: library with models, bracket engine and collaborator services.

pub mod logic;
pub mod models;
pub mod services;

pub use logic::{
    advance, build_bracket, build_bracket_with_rng, champion, current_match, is_complete,
    is_playable, resolve_byes, rounds_for, shape_for, validate_players, Advancement, Announcement,
    ControllerState, MatchConfig, MatchResult, MatchSimulator, PongSimulator, SimulatorError,
    TournamentController,
};
pub use models::{
    AdvanceTarget, Bracket, BracketLayout, Cursor, FinalizeRequest, GameMatch, GameOptions,
    HistoryEntry, MatchId, MatchRef, Round, Side, SlotValue, Theme, TournamentError, TournamentId,
    TournamentSession, TournamentSummary, BYE_LABEL, DEFAULT_WINNING_SCORE, MAX_PLAYERS,
    MIN_PLAYERS,
};
pub use services::{
    AccountDirectory, AccountId, Credential, InMemoryAccounts, InMemoryGateway, MatchRecord,
    Participant, PersistenceError, PersistenceGateway, PlayerStats,
};
