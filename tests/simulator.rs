//! Integration tests for the headless pong simulator.

use pong_tournament_web::{
    GameOptions, MatchConfig, MatchSimulator, PongSimulator, SimulatorError,
};

fn config(options: &GameOptions) -> MatchConfig {
    MatchConfig::new("Left", "Right", options)
}

#[test]
fn exactly_one_side_reaches_the_winning_score() {
    for bonus in [false, true] {
        let options = GameOptions {
            score_bonus_enabled: bonus,
            ..GameOptions::default()
        };
        let cfg = config(&options);
        for seed in 0..25 {
            let r = PongSimulator::with_seed(seed).run(&cfg).unwrap();
            let target = cfg.winning_score;
            assert!(
                (r.score1 == target) != (r.score2 == target),
                "seed {seed}: {}-{}",
                r.score1,
                r.score2
            );
            assert!(r.score1 <= target && r.score2 <= target);
            let expected = if r.score1 == target { "Left" } else { "Right" };
            assert_eq!(r.winner, expected);
        }
    }
}

#[test]
fn same_seed_same_result() {
    let cfg = config(&GameOptions::default());
    let a = PongSimulator::with_seed(42).run(&cfg).unwrap();
    let b = PongSimulator::with_seed(42).run(&cfg).unwrap();
    assert_eq!(a, b);
}

#[test]
fn single_point_match() {
    let options = GameOptions {
        winning_score: 1,
        ..GameOptions::default()
    };
    let r = PongSimulator::with_seed(3).run(&config(&options)).unwrap();
    assert_eq!(r.score1 + r.score2, 1);
}

#[test]
fn tick_budget_exhaustion_is_an_error() {
    let cfg = config(&GameOptions::default());
    let err = PongSimulator::with_seed(1)
        .with_max_ticks(10)
        .run(&cfg)
        .unwrap_err();
    assert_eq!(err, SimulatorError::Stalled { ticks: 10 });
}

#[test]
fn a_player_cannot_face_themselves() {
    let cfg = MatchConfig::new("Solo", "Solo", &GameOptions::default());
    assert!(matches!(
        PongSimulator::with_seed(0).run(&cfg),
        Err(SimulatorError::InvalidConfig(_))
    ));
}
