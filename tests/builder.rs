//! Integration tests for bracket construction: shapes, seeds, advance targets, validation.

use pong_tournament_web::{
    build_bracket, rounds_for, validate_players, Bracket, BracketLayout, MatchRef, SlotValue,
    TournamentError, BYE_LABEL, MAX_PLAYERS, MIN_PLAYERS,
};

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("P{i}")).collect()
}

fn concrete_names(bracket: &Bracket) -> Vec<String> {
    bracket
        .iter_matches()
        .flat_map(|(_, m)| [m.player1.clone(), m.player2.clone()])
        .filter_map(|s| s.name().map(str::to_owned))
        .collect()
}

#[test]
fn seeded_round_counts_match_the_table() {
    let expected = [(2, 1), (3, 2), (4, 2), (5, 3), (6, 3), (7, 3), (8, 3)];
    for (n, rounds) in expected {
        assert_eq!(rounds_for(n), Some(rounds));
        for _ in 0..20 {
            let b = build_bracket(&names(n), BracketLayout::Seeded).unwrap();
            assert_eq!(b.round_count(), rounds, "n={n}");
            assert_eq!(b.rounds.last().unwrap().len(), 1, "n={n}");
        }
    }
}

#[test]
fn every_player_appears_exactly_once() {
    for layout in [BracketLayout::Seeded, BracketLayout::Padded] {
        for n in MIN_PLAYERS..=MAX_PLAYERS {
            let players = names(n);
            for _ in 0..20 {
                let b = build_bracket(&players, layout).unwrap();
                let mut found = concrete_names(&b);
                found.sort();
                let mut want = players.clone();
                want.sort();
                assert_eq!(found, want, "n={n} {layout:?}");
            }
        }
    }
}

#[test]
fn seeds_sit_in_later_rounds_for_odd_shapes() {
    let seeds = [(2, 0), (3, 1), (4, 0), (5, 3), (6, 2), (7, 1), (8, 0)];
    for (n, expected) in seeds {
        let b = build_bracket(&names(n), BracketLayout::Seeded).unwrap();
        let later: usize = b.rounds[1..]
            .iter()
            .flatten()
            .flat_map(|m| [&m.player1, &m.player2])
            .filter(|s| matches!(s, SlotValue::Concrete(_)))
            .count();
        assert_eq!(later, expected, "n={n}");
    }
}

/// `P` for a seeded player, `W` for a winner placeholder, `B` for a bye.
fn slot_kinds(bracket: &Bracket) -> Vec<Vec<String>> {
    let kind = |s: &SlotValue| match s {
        SlotValue::Concrete(_) => 'P',
        SlotValue::AwaitingWinnerOf(_) => 'W',
        SlotValue::Bye => 'B',
    };
    bracket
        .rounds
        .iter()
        .map(|round| {
            round
                .iter()
                .map(|m| [kind(&m.player1), kind(&m.player2)].iter().collect())
                .collect()
        })
        .collect()
}

#[test]
fn odd_shapes_follow_the_table_match_by_match() {
    let table: [(usize, &[&[&str]]); 3] = [
        (5, &[&["PP"], &["WP", "PP"], &["WW"]]),
        (6, &[&["PP", "PP"], &["WP", "WP"], &["WW"]]),
        (7, &[&["PP", "PP", "PP"], &["PW", "WW"], &["WW"]]),
    ];
    for (n, rows) in table {
        let b = build_bracket(&names(n), BracketLayout::Seeded).unwrap();
        let want: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|k| k.to_string()).collect())
            .collect();
        assert_eq!(slot_kinds(&b), want, "n={n}");
    }
}

#[test]
fn five_players_semis_wait_on_the_qualifier_only() {
    let b = build_bracket(&names(5), BracketLayout::Seeded).unwrap();
    assert_eq!(
        b.rounds[1][0].player1,
        SlotValue::AwaitingWinnerOf(MatchRef::new(0, 0))
    );
    assert!(b.rounds[1][1].is_playable());
    assert_eq!(
        b.rounds[2][0].player2,
        SlotValue::AwaitingWinnerOf(MatchRef::new(1, 1))
    );
}

#[test]
fn every_feeding_match_targets_its_own_placeholder() {
    for layout in [BracketLayout::Seeded, BracketLayout::Padded] {
        for n in MIN_PLAYERS..=MAX_PLAYERS {
            let b = build_bracket(&names(n), layout).unwrap();
            let last = b.round_count() - 1;
            for (at, m) in b.iter_matches() {
                if at.round == last {
                    assert!(m.advance_target.is_none());
                    continue;
                }
                let t = m.advance_target.expect("feeding match without a target");
                let target = b.match_at(MatchRef::new(t.round, t.index)).unwrap();
                assert_eq!(*target.slot(t.side), SlotValue::AwaitingWinnerOf(at));
            }
        }
    }
}

#[test]
fn three_players_qualifier_then_final_against_seed() {
    let b = build_bracket(&names(3), BracketLayout::Seeded).unwrap();
    assert_eq!(b.rounds[0].len(), 1);
    assert!(b.rounds[0][0].is_playable());
    let last = &b.rounds[1][0];
    assert!(matches!(last.player1, SlotValue::Concrete(_)));
    assert_eq!(last.player2, SlotValue::AwaitingWinnerOf(MatchRef::new(0, 0)));
}

#[test]
fn padded_layout_gives_leftover_players_a_bye() {
    let b = build_bracket(&names(5), BracketLayout::Padded).unwrap();
    assert_eq!(b.rounds.len(), 3);
    assert_eq!(b.rounds[0].len(), 4);
    assert_eq!(b.rounds[0].iter().filter(|m| m.is_bye()).count(), 3);
}

#[test]
fn build_rejects_out_of_range_counts() {
    assert_eq!(
        build_bracket(&names(1), BracketLayout::Seeded),
        Err(TournamentError::WrongNumberOfPlayers { count: 1 })
    );
    assert_eq!(
        build_bracket(&names(9), BracketLayout::Padded),
        Err(TournamentError::WrongNumberOfPlayers { count: 9 })
    );
}

#[test]
fn validation_rejects_duplicates_and_bad_counts() {
    assert_eq!(
        validate_players(&["A", "A"]),
        Err(TournamentError::DuplicatePlayerName("A".into()))
    );
    assert_eq!(
        validate_players(&["Alice", "bob", "ALICE"]),
        Err(TournamentError::DuplicatePlayerName("ALICE".into()))
    );
    assert_eq!(
        validate_players(&["Solo"]),
        Err(TournamentError::WrongNumberOfPlayers { count: 1 })
    );
    assert_eq!(
        validate_players(&["A", "  "]),
        Err(TournamentError::EmptyPlayerName)
    );
    assert_eq!(
        validate_players(&names(9)),
        Err(TournamentError::WrongNumberOfPlayers { count: 9 })
    );
}

#[test]
fn bye_label_is_not_a_player_name() {
    assert_eq!(
        validate_players(&["Alice", " bye "]),
        Err(TournamentError::ReservedPlayerName("bye".into()))
    );
    assert_eq!(
        validate_players(&[BYE_LABEL, "Bob"]),
        Err(TournamentError::ReservedPlayerName(BYE_LABEL.into()))
    );
    assert!(validate_players(&["Byers", "Bob"]).is_ok());
}

#[test]
fn validation_trims_names() {
    assert_eq!(
        validate_players(&[" Alice ", "Bob"]).unwrap(),
        vec!["Alice".to_string(), "Bob".to_string()]
    );
}
