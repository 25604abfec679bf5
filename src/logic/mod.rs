//! Tournament business logic: bracket building, progression, match simulation, session control.

pub mod builder;
pub mod controller;
pub mod progression;
pub mod simulator;

pub use builder::{build_bracket, build_bracket_with_rng, rounds_for, shape_for, validate_players};
pub use controller::{Announcement, ControllerState, TournamentController};
pub use progression::{advance, champion, current_match, is_complete, is_playable, resolve_byes, Advancement};
pub use simulator::{MatchConfig, MatchResult, MatchSimulator, PongSimulator, SimulatorError};
