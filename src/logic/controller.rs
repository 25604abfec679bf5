//! Tournament session controller: create, play every match in order, finalize.
//!
//! Commands drive an explicit state machine; the UI only calls them and renders
//! `state()`, `session()` and `announcements()`.

use crate::logic::builder::{build_bracket, validate_players};
use crate::logic::progression::{self, Advancement};
use crate::logic::simulator::{MatchConfig, MatchResult, MatchSimulator, SimulatorError};
use crate::models::{
    Cursor, FinalizeRequest, GameOptions, TournamentError, TournamentId, TournamentSession,
    TournamentSummary,
};
use crate::services::PersistenceGateway;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the controller is in a tournament's lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "cursor", rename_all = "snake_case")]
pub enum ControllerState {
    /// No tournament.
    #[default]
    Idle,
    /// The match at the cursor can be started.
    AwaitingInput(Cursor),
    /// The match at the cursor is being played.
    InProgress(Cursor),
    /// The match at the cursor still has a placeholder. Display state only: with one
    /// controller playing every match in order it never outlasts a single command.
    WaitingOnOtherResults(Cursor),
    /// Every match resolved; terminal until the next tournament is created.
    Complete,
}

/// One line of the human-readable tournament log.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub at: DateTime<Utc>,
    pub message: String,
}

pub struct TournamentController {
    state: ControllerState,
    session: Option<TournamentSession>,
    announcements: Vec<Announcement>,
    summary: Option<TournamentSummary>,
    champion: Option<String>,
    persistence_warning: Option<String>,
    gateway: Arc<dyn PersistenceGateway>,
}

impl TournamentController {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            state: ControllerState::Idle,
            session: None,
            announcements: Vec::new(),
            summary: None,
            champion: None,
            persistence_warning: None,
            gateway,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn session(&self) -> Option<&TournamentSession> {
        self.session.as_ref()
    }

    pub fn announcements(&self) -> &[Announcement] {
        &self.announcements
    }

    /// Summary of the last completed tournament.
    pub fn summary(&self) -> Option<&TournamentSummary> {
        self.summary.as_ref()
    }

    pub fn champion(&self) -> Option<&str> {
        self.champion.as_deref()
    }

    /// Set when the finished tournament could not be saved.
    pub fn persistence_warning(&self) -> Option<&str> {
        self.persistence_warning.as_deref()
    }

    /// Validate participants, build the bracket and move to the first match.
    ///
    /// Allowed from `Idle` or `Complete`. On a validation error nothing changes.
    pub fn create_with_players<S: AsRef<str>>(
        &mut self,
        players: &[S],
        options: GameOptions,
    ) -> Result<ControllerState, TournamentError> {
        if !matches!(self.state, ControllerState::Idle | ControllerState::Complete) {
            return Err(TournamentError::InvalidState);
        }
        let players = validate_players(players)?;
        let bracket = build_bracket(&players, options.layout)?;

        self.reset();
        let session = TournamentSession::new(players, bracket, options);
        log::info!(
            "Created tournament {} with {} players ({} rounds)",
            session.id,
            session.players.len(),
            session.bracket.round_count()
        );
        self.announce(format!(
            "Tournament started with {}",
            session.players.join(", ")
        ));
        self.session = Some(session);
        self.settle()
    }

    /// True while the match at `cursor` of tournament `id` is the one in progress.
    pub fn is_playing(&self, id: TournamentId, cursor: Cursor) -> bool {
        self.state == ControllerState::InProgress(cursor)
            && self.session.as_ref().map(|s| s.id) == Some(id)
    }

    /// Begin the current match. Returns the configuration for the game.
    ///
    /// A cursor left waiting on a placeholder is settled again first, so it moves on to
    /// `AwaitingInput` once the missing result is in.
    pub fn start_current_match(&mut self) -> Result<MatchConfig, TournamentError> {
        if let ControllerState::WaitingOnOtherResults(_) = self.state {
            self.settle()?;
        }
        let ControllerState::AwaitingInput(cursor) = self.state else {
            return Err(TournamentError::InvalidState);
        };
        let session = self.session.as_ref().ok_or(TournamentError::InvalidState)?;
        let current = progression::current_match(session).ok_or(TournamentError::NoCurrentMatch)?;
        if !progression::is_playable(current) {
            return Err(TournamentError::MatchNotPlayable);
        }
        let (Some(p1), Some(p2)) = (current.player1.name(), current.player2.name()) else {
            return Err(TournamentError::MatchNotPlayable);
        };
        let config = MatchConfig::new(p1, p2, &session.options);
        self.state = ControllerState::InProgress(cursor);
        self.announce(format!(
            "Round {}, match {}: {} vs {}",
            cursor.round + 1,
            cursor.index + 1,
            config.player1,
            config.player2
        ));
        Ok(config)
    }

    /// Feed the result of the running match back into the bracket.
    ///
    /// A result that does not fit the match (unknown winner, tie, scores pointing at the
    /// other player) is rejected and the match stays in progress.
    pub fn simulator_resolved(
        &mut self,
        result: &MatchResult,
    ) -> Result<ControllerState, TournamentError> {
        let ControllerState::InProgress(_) = self.state else {
            return Err(TournamentError::InvalidState);
        };
        let session = self.session.as_mut().ok_or(TournamentError::InvalidState)?;
        let adv = progression::advance(
            session,
            &result.winner,
            Some((result.score1, result.score2)),
        )?;
        self.announce(format!(
            "{} wins {}-{}",
            adv.winner,
            result.score1.max(result.score2),
            result.score1.min(result.score2)
        ));
        self.announce_filled(&adv);
        self.settle()
    }

    /// Like `simulator_resolved`, for a result that was computed without holding the
    /// controller: it only applies if match `cursor` of tournament `id` is still running.
    pub fn simulator_resolved_at(
        &mut self,
        id: TournamentId,
        cursor: Cursor,
        result: &MatchResult,
    ) -> Result<ControllerState, TournamentError> {
        if !self.is_playing(id, cursor) {
            log::warn!(
                "Dropping stale result for tournament {} round {} match {}",
                id,
                cursor.round + 1,
                cursor.index + 1
            );
            return Err(TournamentError::InvalidState);
        }
        self.simulator_resolved(result)
    }

    /// The game could not be played: the session is discarded.
    pub fn simulator_failed(&mut self, error: &SimulatorError) -> TournamentError {
        log::error!("Match simulator failed: {}", error);
        self.session = None;
        self.state = ControllerState::Idle;
        self.announce(format!("The game failed ({}); tournament abandoned", error));
        TournamentError::SimulatorFailed(error.to_string())
    }

    /// Start the current match, run it on `simulator` and resolve it.
    pub fn play_current_match<M: MatchSimulator + ?Sized>(
        &mut self,
        simulator: &mut M,
    ) -> Result<ControllerState, TournamentError> {
        let config = self.start_current_match()?;
        match simulator.run(&config) {
            Ok(result) => self.simulator_resolved(&result),
            Err(e) => Err(self.simulator_failed(&e)),
        }
    }

    /// Discard the session (any state). The match in progress, if any, is not recorded.
    pub fn cancel(&mut self) {
        if let Some(session) = &self.session {
            log::info!("Tournament {} cancelled", session.id);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state = ControllerState::Idle;
        self.session = None;
        self.announcements.clear();
        self.summary = None;
        self.champion = None;
        self.persistence_warning = None;
    }

    /// Resolve byes at the cursor, then pick the state for whatever is current.
    fn settle(&mut self) -> Result<ControllerState, TournamentError> {
        let session = self.session.as_mut().ok_or(TournamentError::InvalidState)?;
        let byes = progression::resolve_byes(session);
        for adv in &byes {
            self.announce(format!("{} advances on a bye", adv.winner));
            self.announce_filled(adv);
        }

        let session = self.session.as_ref().ok_or(TournamentError::InvalidState)?;
        let next = progression::current_match(session)
            .map(|m| (progression::is_playable(m), session.cursor));
        self.state = match next {
            None => return Ok(self.finalize()),
            Some((true, cursor)) => ControllerState::AwaitingInput(cursor),
            Some((false, cursor)) => ControllerState::WaitingOnOtherResults(cursor),
        };
        if let ControllerState::WaitingOnOtherResults(cursor) = self.state {
            log::warn!(
                "Match at round {} index {} is waiting for other results",
                cursor.round,
                cursor.index
            );
            self.announce("Waiting for other results".to_string());
        }
        Ok(self.state)
    }

    /// Build the summary, hand it to the gateway, and discard the session.
    fn finalize(&mut self) -> ControllerState {
        self.state = ControllerState::Complete;
        let Some(session) = self.session.take() else {
            return self.state;
        };
        let champion = progression::champion(&session);
        let summary = TournamentSummary::from_session(&session, champion.clone());
        match &champion {
            Some(name) => self.announce(format!("{} wins the tournament!", name)),
            None => log::error!("Tournament {} finished without a champion", session.id),
        }

        let request = FinalizeRequest {
            summary: summary.clone(),
        };
        if let Err(e) = self.gateway.record(&request) {
            log::warn!("Could not save tournament {}: {}", session.id, e);
            self.persistence_warning = Some(e.to_string());
        }
        self.champion = champion;
        self.summary = Some(summary);
        self.state
    }

    fn announce_filled(&mut self, adv: &Advancement) {
        if let Some(target) = adv.filled {
            self.announce(format!("{} moves on to {}", adv.winner, target));
        }
    }

    fn announce(&mut self, message: String) {
        log::info!("{}", message);
        self.announcements.push(Announcement {
            at: Utc::now(),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bracket, GameMatch, MatchRef, SlotValue};
    use crate::services::PersistenceError;

    struct NoStorage;

    impl PersistenceGateway for NoStorage {
        fn record(&self, _: &FinalizeRequest) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    #[test]
    fn waiting_cursor_becomes_playable_once_the_slot_is_filled() {
        let bracket = Bracket::new(vec![vec![GameMatch::new(
            SlotValue::concrete("A"),
            SlotValue::AwaitingWinnerOf(MatchRef::new(0, 1)),
        )]]);
        let mut c = TournamentController::new(Arc::new(NoStorage));
        c.session = Some(TournamentSession::new(
            vec!["A".into(), "B".into()],
            bracket,
            GameOptions::default(),
        ));
        assert_eq!(
            c.settle(),
            Ok(ControllerState::WaitingOnOtherResults(Cursor::default()))
        );
        assert_eq!(c.start_current_match(), Err(TournamentError::InvalidState));
        assert_eq!(
            c.state(),
            ControllerState::WaitingOnOtherResults(Cursor::default())
        );

        if let Some(session) = c.session.as_mut() {
            session.bracket.rounds[0][0].player2 = SlotValue::concrete("B");
        }
        let config = c.start_current_match().unwrap();
        assert_eq!((config.player1.as_str(), config.player2.as_str()), ("A", "B"));
        assert_eq!(c.state(), ControllerState::InProgress(Cursor::default()));
    }
}
