//! Bracket construction: validate participants, pick a shape for the count, instantiate it.
//!
//! Shapes are data. Each is a list of rounds whose matches name their two slots as
//! either a shuffled participant, the winner of an earlier match, or a bye. One
//! routine turns any shape into a [`Bracket`] and stamps the `advance_target` of every
//! match that feeds a later one, so winners never land on a seeded slot.

use crate::models::{
    AdvanceTarget, Bracket, BracketLayout, GameMatch, MatchRef, Side, SlotValue, TournamentError,
    BYE_LABEL, MAX_PLAYERS, MIN_PLAYERS,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// One side of a match in a shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotSpec {
    /// Index into the shuffled participant list.
    Player(usize),
    /// Winner of the match at (round, index).
    WinnerOf(usize, usize),
    Bye,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchSpec {
    pub p1: SlotSpec,
    pub p2: SlotSpec,
}

/// Declarative bracket shape: rounds of match specs.
pub type Shape = Vec<Vec<MatchSpec>>;

use SlotSpec::{Bye, Player as P, WinnerOf as W};

const fn m(p1: SlotSpec, p2: SlotSpec) -> MatchSpec {
    MatchSpec { p1, p2 }
}

const SHAPE_2: &[&[MatchSpec]] = &[&[m(P(0), P(1))]];

const SHAPE_3: &[&[MatchSpec]] = &[&[m(P(0), P(1))], &[m(P(2), W(0, 0))]];

const SHAPE_4: &[&[MatchSpec]] = &[
    &[m(P(0), P(1)), m(P(2), P(3))],
    &[m(W(0, 0), W(0, 1))],
];

const SHAPE_5: &[&[MatchSpec]] = &[
    &[m(P(0), P(1))],
    &[m(W(0, 0), P(2)), m(P(3), P(4))],
    &[m(W(1, 0), W(1, 1))],
];

const SHAPE_6: &[&[MatchSpec]] = &[
    &[m(P(0), P(1)), m(P(2), P(3))],
    &[m(W(0, 0), P(4)), m(W(0, 1), P(5))],
    &[m(W(1, 0), W(1, 1))],
];

const SHAPE_7: &[&[MatchSpec]] = &[
    &[m(P(0), P(1)), m(P(2), P(3)), m(P(4), P(5))],
    &[m(P(6), W(0, 0)), m(W(0, 1), W(0, 2))],
    &[m(W(1, 0), W(1, 1))],
];

const SHAPE_8: &[&[MatchSpec]] = &[
    &[m(P(0), P(1)), m(P(2), P(3)), m(P(4), P(5)), m(P(6), P(7))],
    &[m(W(0, 0), W(0, 1)), m(W(0, 2), W(0, 3))],
    &[m(W(1, 0), W(1, 1))],
];

/// Number of rounds the seeded table produces for `n` participants.
pub fn rounds_for(n: usize) -> Option<usize> {
    seeded_table(n).map(<[_]>::len)
}

fn seeded_table(n: usize) -> Option<&'static [&'static [MatchSpec]]> {
    match n {
        2 => Some(SHAPE_2),
        3 => Some(SHAPE_3),
        4 => Some(SHAPE_4),
        5 => Some(SHAPE_5),
        6 => Some(SHAPE_6),
        7 => Some(SHAPE_7),
        8 => Some(SHAPE_8),
        _ => None,
    }
}

/// Round 0 padded to the next power of two. The first `size - n` matches pair a
/// player with a bye, later rounds halve down to the final.
fn padded_shape(n: usize) -> Shape {
    let size = n.next_power_of_two();
    let byes = size - n;
    let mut rounds: Shape = Vec::new();

    let mut next_player = 0;
    let mut first = Vec::with_capacity(size / 2);
    for i in 0..size / 2 {
        let p1 = P(next_player);
        next_player += 1;
        let p2 = if i < byes {
            Bye
        } else {
            next_player += 1;
            P(next_player - 1)
        };
        first.push(m(p1, p2));
    }
    rounds.push(first);

    while rounds.last().map_or(0, Vec::len) > 1 {
        let prev = rounds.len() - 1;
        let width = rounds[prev].len() / 2;
        rounds.push((0..width).map(|i| m(W(prev, 2 * i), W(prev, 2 * i + 1))).collect());
    }
    rounds
}

/// Shape for `n` participants under `layout`, or None if `n` is out of range.
pub fn shape_for(n: usize, layout: BracketLayout) -> Option<Shape> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
        return None;
    }
    match layout {
        BracketLayout::Seeded => {
            seeded_table(n).map(|rounds| rounds.iter().map(|r| r.to_vec()).collect())
        }
        BracketLayout::Padded => Some(padded_shape(n)),
    }
}

/// Trim names and reject empty or reserved names, counts outside 2..=8 and
/// case-insensitive duplicates.
pub fn validate_players<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>, TournamentError> {
    let trimmed: Vec<String> = names.iter().map(|n| n.as_ref().trim().to_string()).collect();
    if trimmed.iter().any(String::is_empty) {
        return Err(TournamentError::EmptyPlayerName);
    }
    if let Some(name) = trimmed.iter().find(|n| n.eq_ignore_ascii_case(BYE_LABEL)) {
        return Err(TournamentError::ReservedPlayerName(name.clone()));
    }
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&trimmed.len()) {
        return Err(TournamentError::WrongNumberOfPlayers {
            count: trimmed.len(),
        });
    }
    for (i, name) in trimmed.iter().enumerate() {
        if trimmed[..i].iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return Err(TournamentError::DuplicatePlayerName(name.clone()));
        }
    }
    Ok(trimmed)
}

/// Build a bracket from a shuffled copy of `players` (fresh random order every call).
pub fn build_bracket(players: &[String], layout: BracketLayout) -> Result<Bracket, TournamentError> {
    build_bracket_with_rng(players, layout, &mut rand::thread_rng())
}

pub fn build_bracket_with_rng<R: Rng + ?Sized>(
    players: &[String],
    layout: BracketLayout,
    rng: &mut R,
) -> Result<Bracket, TournamentError> {
    let shape = shape_for(players.len(), layout).ok_or(TournamentError::WrongNumberOfPlayers {
        count: players.len(),
    })?;
    let mut shuffled = players.to_vec();
    shuffled.shuffle(rng);
    Ok(instantiate(&shape, &shuffled))
}

/// Turn a shape into matches and stamp advance targets from every `WinnerOf` slot.
fn instantiate(shape: &Shape, players: &[String]) -> Bracket {
    let resolve = |spec: SlotSpec| match spec {
        SlotSpec::Player(i) => SlotValue::Concrete(players[i].clone()),
        SlotSpec::WinnerOf(round, index) => SlotValue::AwaitingWinnerOf(MatchRef::new(round, index)),
        SlotSpec::Bye => SlotValue::Bye,
    };

    let mut bracket = Bracket::new(
        shape
            .iter()
            .map(|round| {
                round
                    .iter()
                    .map(|spec| GameMatch::new(resolve(spec.p1), resolve(spec.p2)))
                    .collect()
            })
            .collect(),
    );

    for (round, matches) in shape.iter().enumerate() {
        for (index, spec) in matches.iter().enumerate() {
            for (slot, side) in [(spec.p1, Side::One), (spec.p2, Side::Two)] {
                if let SlotSpec::WinnerOf(r, i) = slot {
                    if let Some(feeder) = bracket.match_at_mut(MatchRef::new(r, i)) {
                        feeder.advance_target = Some(AdvanceTarget { round, index, side });
                    }
                }
            }
        }
    }
    bracket
}
