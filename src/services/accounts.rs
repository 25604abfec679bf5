//! Account collaborator: who-am-i lookup by session credential and name resolution.

use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Unique identifier for a durable account.
pub type AccountId = Uuid;

/// Opaque credential stored in the caller's session cookie.
pub type Credential = Uuid;

/// Read side of the account service that the tournament flow depends on.
pub trait AccountDirectory {
    /// Display name of the account behind `credential`, if the credential is valid.
    fn whoami(&self, credential: Credential) -> Option<String>;

    /// Account with exactly this display name.
    fn find_by_name(&self, name: &str) -> Option<AccountId>;
}

#[derive(Debug, Default)]
struct Accounts {
    by_name: HashMap<String, AccountId>,
    names: HashMap<AccountId, String>,
    credentials: HashMap<Credential, AccountId>,
    /// Live credential of each logged-in account.
    issued: HashMap<AccountId, Credential>,
}

/// In-memory account store (stand-in for the real account service).
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    inner: RwLock<Accounts>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the account if needed and return its credential. An account holds at most
    /// one live credential; a fresh one is issued only after logout. Returns None for an
    /// empty name.
    pub fn login(&self, display_name: &str) -> Option<Credential> {
        let name = display_name.trim();
        if name.is_empty() {
            return None;
        }
        let mut g = self.inner.write().ok()?;
        let id = match g.by_name.get(name) {
            Some(id) => *id,
            None => {
                let id = Uuid::new_v4();
                g.by_name.insert(name.to_string(), id);
                g.names.insert(id, name.to_string());
                log::info!("Registered account '{}'", name);
                id
            }
        };
        if let Some(credential) = g.issued.get(&id) {
            return Some(*credential);
        }
        let credential = Uuid::new_v4();
        g.credentials.insert(credential, id);
        g.issued.insert(id, credential);
        Some(credential)
    }

    /// Invalidate a credential.
    pub fn logout(&self, credential: Credential) {
        if let Ok(mut g) = self.inner.write() {
            if let Some(id) = g.credentials.remove(&credential) {
                g.issued.remove(&id);
            }
        }
    }
}

impl AccountDirectory for InMemoryAccounts {
    fn whoami(&self, credential: Credential) -> Option<String> {
        let g = self.inner.read().ok()?;
        let id = g.credentials.get(&credential)?;
        g.names.get(id).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<AccountId> {
        self.inner.read().ok()?.by_name.get(name).copied()
    }
}
