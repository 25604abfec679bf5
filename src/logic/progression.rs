//! Bracket progression: which match is next, writing winners downstream, completion.

use crate::models::{
    Cursor, GameMatch, MatchRef, Side, SlotValue, TournamentError, TournamentSession,
};

/// What `advance` did, for the controller's announcement log.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Advancement {
    pub resolved: MatchRef,
    pub winner: String,
    /// Slot the winner was written into; None after the final.
    pub filled: Option<MatchRef>,
}

/// Match at the cursor, or None once the cursor has moved past the last round.
pub fn current_match(session: &TournamentSession) -> Option<&GameMatch> {
    session.match_at_cursor()
}

/// True iff neither slot is a placeholder.
pub fn is_playable(m: &GameMatch) -> bool {
    m.is_playable()
}

pub fn is_complete(session: &TournamentSession) -> bool {
    session.cursor.round >= session.bracket.round_count()
}

/// Record the result of the current match and move the winner and the cursor forward.
///
/// `scores` is None only for a bye. For a played match the winner must be one of the two
/// players and agree with the scores. Calling this with no current match, or with a
/// placeholder still in the current match, is a caller bug: it trips a debug assertion
/// and returns an error in release builds.
pub fn advance(
    session: &mut TournamentSession,
    winner: &str,
    scores: Option<(u32, u32)>,
) -> Result<Advancement, TournamentError> {
    let at = session.cursor.position();
    let Some(current) = session.bracket.match_at(at) else {
        debug_assert!(false, "advance called on a completed tournament");
        return Err(TournamentError::NoCurrentMatch);
    };

    let side = match (scores, current.bye_side()) {
        (None, Some(side)) => side,
        (Some(_), _) | (None, None) if !current.is_playable() => {
            debug_assert!(false, "advance called on a match that is not playable");
            return Err(TournamentError::MatchNotPlayable);
        }
        (None, None) => {
            debug_assert!(false, "played match advanced without scores");
            return Err(TournamentError::MatchNotPlayable);
        }
        (Some((score1, score2)), _) => {
            let side = current
                .side_of(winner)
                .ok_or_else(|| TournamentError::UnknownWinner(winner.to_string()))?;
            let by_score = match score1.cmp(&score2) {
                std::cmp::Ordering::Greater => Side::One,
                std::cmp::Ordering::Less => Side::Two,
                std::cmp::Ordering::Equal => {
                    return Err(TournamentError::ScoreMismatch { score1, score2 })
                }
            };
            if by_score != side {
                return Err(TournamentError::ScoreMismatch { score1, score2 });
            }
            side
        }
    };

    let winner_name = current.slot(side).name().unwrap_or(winner).to_string();
    if winner_name != winner {
        return Err(TournamentError::UnknownWinner(winner.to_string()));
    }

    let rounds = &mut session.bracket.rounds;
    let this_round_len = rounds[at.round].len();
    let current = &mut rounds[at.round][at.index];
    current.done = true;
    current.winner = Some(side);
    if let Some((s1, s2)) = scores {
        current.score1 = Some(s1);
        current.score2 = Some(s2);
    }
    let stamped = current.advance_target;

    let filled = if at.round + 1 < rounds.len() {
        let target = match stamped {
            Some(t) => (MatchRef::new(t.round, t.index), Some(t.side)),
            None => {
                let next_len = rounds[at.round + 1].len();
                let index = if next_len == this_round_len {
                    at.index
                } else {
                    at.index / 2
                };
                (MatchRef::new(at.round + 1, index), None)
            }
        };
        write_winner(session, target.0, target.1, &winner_name);
        Some(target.0)
    } else {
        None
    };

    session.winners.push(winner_name.clone());
    session.last_winner = Some(winner_name.clone());
    session.cursor = next_cursor(session, session.cursor);

    Ok(Advancement {
        resolved: at,
        winner: winner_name,
        filled,
    })
}

/// Auto-resolve every bye sitting at the cursor. Returns the byes that were resolved.
pub fn resolve_byes(session: &mut TournamentSession) -> Vec<Advancement> {
    let mut resolved = Vec::new();
    while let Some(m) = current_match(session) {
        let Some(name) = m.bye_side().and_then(|s| m.slot(s).name()).map(str::to_owned) else {
            break;
        };
        match advance(session, &name, None) {
            Ok(adv) => {
                log::info!("{} advances on a bye ({})", adv.winner, adv.resolved);
                resolved.push(adv);
            }
            Err(e) => {
                log::error!("Could not resolve bye for {}: {}", name, e);
                break;
            }
        }
    }
    resolved
}

/// Champion of a fully resolved bracket, read off the final's scores.
///
/// Logs a defect if it disagrees with the winner passed to the last `advance`.
pub fn champion(session: &TournamentSession) -> Option<String> {
    if !is_complete(session) {
        return None;
    }
    let last = session.bracket.final_match()?;
    if !last.done {
        return None;
    }
    let side = match (last.score1, last.score2) {
        (Some(s1), Some(s2)) if s1 > s2 => Side::One,
        (Some(s1), Some(s2)) if s2 > s1 => Side::Two,
        _ => last.winner?,
    };
    let name = last.slot(side).name()?.to_string();
    if session.last_winner.as_deref() != Some(name.as_str()) {
        log::error!(
            "Champion from final scores ({}) disagrees with last declared winner ({:?})",
            name,
            session.last_winner
        );
    }
    Some(name)
}

fn next_cursor(session: &TournamentSession, cursor: Cursor) -> Cursor {
    let round_len = session
        .bracket
        .rounds
        .get(cursor.round)
        .map_or(0, Vec::len);
    if cursor.index + 1 < round_len {
        Cursor {
            round: cursor.round,
            index: cursor.index + 1,
        }
    } else {
        Cursor {
            round: cursor.round + 1,
            index: 0,
        }
    }
}

/// Write `winner` into the target match: the stamped side if it is still a placeholder,
/// otherwise the first placeholder (player1 first). A target with no placeholder left is a
/// construction defect; player2 is overwritten so play can continue.
fn write_winner(session: &mut TournamentSession, at: MatchRef, side: Option<Side>, winner: &str) {
    let Some(target) = session.bracket.match_at_mut(at) else {
        log::error!("Advance target {} does not exist; {} not placed", at, winner);
        return;
    };
    let chosen = side
        .filter(|s| target.slot(*s).is_placeholder())
        .or_else(|| {
            [Side::One, Side::Two]
                .into_iter()
                .find(|s| target.slot(*s).is_placeholder())
        });
    match chosen {
        Some(s) => *target.slot_mut(s) = SlotValue::Concrete(winner.to_string()),
        None => {
            log::error!(
                "Bracket defect: both slots of {} already filled ({}); overwriting player2 with {}",
                at,
                target.label(),
                winner
            );
            target.player2 = SlotValue::Concrete(winner.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdvanceTarget, Bracket, GameOptions};

    fn session_from(rounds: Vec<Vec<GameMatch>>) -> TournamentSession {
        TournamentSession::new(Vec::new(), Bracket::new(rounds), GameOptions::default())
    }

    fn concrete(a: &str, b: &str) -> GameMatch {
        GameMatch::new(SlotValue::concrete(a), SlotValue::concrete(b))
    }

    fn waiting(r: usize) -> GameMatch {
        GameMatch::new(
            SlotValue::AwaitingWinnerOf(MatchRef::new(r, 0)),
            SlotValue::AwaitingWinnerOf(MatchRef::new(r, 1)),
        )
    }

    #[test]
    fn fallback_halves_index_when_next_round_is_narrower() {
        let mut s = session_from(vec![
            vec![concrete("A", "B"), concrete("C", "D")],
            vec![waiting(0)],
        ]);
        advance(&mut s, "A", Some((3, 1))).unwrap();
        advance(&mut s, "D", Some((0, 3))).unwrap();
        let last = &s.bracket.rounds[1][0];
        assert_eq!(last.player1, SlotValue::concrete("A"));
        assert_eq!(last.player2, SlotValue::concrete("D"));
        assert_eq!(s.cursor, Cursor { round: 1, index: 0 });
    }

    #[test]
    fn fallback_keeps_index_when_rounds_are_equal_width() {
        let mut s = session_from(vec![
            vec![concrete("A", "B"), concrete("C", "D")],
            vec![
                GameMatch::new(
                    SlotValue::AwaitingWinnerOf(MatchRef::new(0, 0)),
                    SlotValue::concrete("E"),
                ),
                GameMatch::new(
                    SlotValue::AwaitingWinnerOf(MatchRef::new(0, 1)),
                    SlotValue::concrete("F"),
                ),
            ],
            vec![waiting(1)],
        ]);
        advance(&mut s, "B", Some((1, 5))).unwrap();
        advance(&mut s, "C", Some((5, 4))).unwrap();
        assert_eq!(s.bracket.rounds[1][0].player1, SlotValue::concrete("B"));
        assert_eq!(s.bracket.rounds[1][1].player1, SlotValue::concrete("C"));
        assert_eq!(s.bracket.rounds[1][1].player2, SlotValue::concrete("F"));
    }

    #[test]
    fn stamped_target_that_is_already_filled_overwrites_player2() {
        let mut feeder = concrete("A", "B");
        feeder.advance_target = Some(AdvanceTarget {
            round: 1,
            index: 0,
            side: Side::One,
        });
        let mut s = session_from(vec![vec![feeder], vec![concrete("X", "Y")]]);
        advance(&mut s, "A", Some((2, 0))).unwrap();
        let last = &s.bracket.rounds[1][0];
        assert_eq!(last.player1, SlotValue::concrete("X"));
        assert_eq!(last.player2, SlotValue::concrete("A"));
    }

    #[test]
    fn tied_scores_are_rejected_without_mutation() {
        let mut s = session_from(vec![vec![concrete("A", "B")]]);
        let err = advance(&mut s, "A", Some((2, 2))).unwrap_err();
        assert_eq!(err, TournamentError::ScoreMismatch { score1: 2, score2: 2 });
        assert!(!s.bracket.rounds[0][0].done);
        assert_eq!(s.cursor, Cursor::default());
    }
}
