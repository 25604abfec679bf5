//! External collaborators the bracket engine talks to: accounts and persistence.

mod accounts;
mod persistence;

pub use accounts::{AccountDirectory, AccountId, Credential, InMemoryAccounts};
pub use persistence::{
    InMemoryGateway, MatchRecord, Participant, PersistenceError, PersistenceGateway, PlayerStats,
};
