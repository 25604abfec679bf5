//! Integration tests for the persistence gateway and summary export.

use chrono::Utc;
use pong_tournament_web::{
    AccountDirectory, FinalizeRequest, HistoryEntry, InMemoryAccounts, InMemoryGateway,
    Participant, PersistenceError, PersistenceGateway, TournamentSummary,
};
use std::sync::Arc;

fn entry(round: usize, index: usize, p1: &str, p2: &str, s: Option<(u32, u32)>, winner: Option<&str>) -> HistoryEntry {
    HistoryEntry {
        round,
        match_index: index,
        p1: p1.into(),
        p2: p2.into(),
        s1: s.map(|x| x.0),
        s2: s.map(|x| x.1),
        done: winner.is_some(),
        winner: winner.map(str::to_owned),
    }
}

fn request(history: Vec<HistoryEntry>, champion: &str) -> FinalizeRequest {
    FinalizeRequest {
        summary: TournamentSummary {
            total_matches: history.len(),
            winners: history.iter().filter_map(|h| h.winner.clone()).collect(),
            champion: Some(champion.into()),
            finished_at: Utc::now(),
            history,
        },
    }
}

fn setup() -> (Arc<InMemoryAccounts>, InMemoryGateway) {
    let accounts = Arc::new(InMemoryAccounts::new());
    accounts.login("Alice").unwrap();
    accounts.login("Bob").unwrap();
    let gateway = InMemoryGateway::new(accounts.clone());
    (accounts, gateway)
}

#[test]
fn records_matches_and_updates_account_stats() {
    let (accounts, gateway) = setup();
    let req = request(
        vec![
            entry(0, 0, "Alice", "Guest", Some((5, 3)), Some("Alice")),
            entry(0, 1, "Bob", "BYE", None, Some("Bob")),
            entry(1, 0, "Alice", "Bob", Some((4, 5)), Some("Bob")),
        ],
        "Bob",
    );
    gateway.record(&req).unwrap();

    let alice = accounts.find_by_name("Alice").unwrap();
    let bob = accounts.find_by_name("Bob").unwrap();
    let a = gateway.stats(alice).unwrap();
    assert_eq!((a.wins, a.losses, a.high_score, a.tournaments_won), (1, 1, 5, 0));
    let b = gateway.stats(bob).unwrap();
    assert_eq!((b.wins, b.losses, b.high_score, b.tournaments_won), (1, 0, 5, 1));

    let matches = gateway.matches();
    assert_eq!(matches.len(), 2, "byes are not stored as matches");
    assert_eq!(matches[0].player2, Participant::Alias("Guest".into()));
    assert_eq!(matches[0].winner, Participant::Account(alice));
    assert_eq!(gateway.tournament_count(), 1);
}

#[test]
fn invalid_entry_rolls_back_everything() {
    let (accounts, gateway) = setup();
    let req = request(
        vec![
            entry(0, 0, "Alice", "Bob", Some((5, 1)), Some("Alice")),
            entry(1, 0, "Alice", "Carol", Some((5, 2)), Some("Mallory")),
        ],
        "Alice",
    );
    let err = gateway.record(&req).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidSummary(_)));

    let alice = accounts.find_by_name("Alice").unwrap();
    assert!(gateway.stats(alice).is_none());
    assert!(gateway.matches().is_empty());
    assert_eq!(gateway.tournament_count(), 0);
}

#[test]
fn whoami_follows_login_and_logout() {
    let accounts = InMemoryAccounts::new();
    assert!(accounts.login("   ").is_none());
    let credential = accounts.login(" Alice ").unwrap();
    assert_eq!(accounts.whoami(credential).as_deref(), Some("Alice"));
    accounts.logout(credential);
    assert!(accounts.whoami(credential).is_none());
}

#[test]
fn repeated_logins_share_one_credential() {
    let accounts = InMemoryAccounts::new();
    let first = accounts.login("Alice").unwrap();
    assert_eq!(accounts.login("Alice"), Some(first));
    assert_ne!(accounts.login("Bob"), Some(first));

    accounts.logout(first);
    let second = accounts.login("Alice").unwrap();
    assert_ne!(second, first);
    assert!(accounts.whoami(first).is_none());
    assert_eq!(accounts.whoami(second).as_deref(), Some("Alice"));
}

#[test]
fn summary_exports_as_csv() {
    let req = request(
        vec![
            entry(0, 0, "Alice", "BYE", None, Some("Alice")),
            entry(1, 0, "Alice", "Bob", Some((5, 2)), Some("Alice")),
        ],
        "Alice",
    );
    let csv = req.summary.to_csv().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "round,match,p1,p2,s1,s2,done,winner");
    assert_eq!(lines[1], "0,0,Alice,BYE,,,true,Alice");
    assert_eq!(lines[2], "1,0,Alice,Bob,5,2,true,Alice");
}

#[test]
fn finalize_request_uses_camel_case_summary() {
    let req = request(vec![entry(0, 0, "A", "B", Some((5, 0)), Some("A"))], "A");
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["summary"]["totalMatches"], 1);
    assert_eq!(json["summary"]["history"][0]["match"], 0);
    assert_eq!(json["summary"]["history"][0]["s1"], 5);
}
