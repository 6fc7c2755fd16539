use serde::{Deserialize, Serialize};
use std::rc::Rc;
use thiserror::Error;

use super::credentials::{CredentialStore, Role};
use super::storage::{clear_record, load_record, save_record, KeyValueStore, Loaded, SESSION_KEY};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct SessionRecord {
    authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("not logged in")]
    NotAuthenticated,
    #[error("administrator role required (current role: {0})")]
    NotAdmin(Role),
}

/// Session gate over the credential store. Sessions never expire; only
/// [`AuthGate::logout`] or clearing storage ends one.
pub struct AuthGate {
    storage: Rc<dyn KeyValueStore>,
    credentials: CredentialStore,
    state: SessionState,
}

impl AuthGate {
    pub fn open(storage: Rc<dyn KeyValueStore>) -> Self {
        let credentials = CredentialStore::open(storage.clone());
        let state = restore_session(storage.as_ref());
        Self {
            storage,
            credentials,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn role(&self) -> Option<Role> {
        match self.state {
            SessionState::Authenticated(role) => Some(role),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn require_admin(&self) -> Result<Role, AccessDenied> {
        match self.state {
            SessionState::Authenticated(Role::Admin) => Ok(Role::Admin),
            SessionState::Authenticated(role) => Err(AccessDenied::NotAdmin(role)),
            SessionState::Anonymous => Err(AccessDenied::NotAuthenticated),
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn credentials_mut(&mut self) -> &mut CredentialStore {
        &mut self.credentials
    }

    /// A failed attempt leaves both the current state and the persisted
    /// session untouched.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        let Some(role) = self.credentials.authenticate(username, password) else {
            tracing::info!(username, "login rejected");
            return false;
        };
        let record = SessionRecord {
            authenticated: true,
            role: Some(role),
        };
        save_record(self.storage.as_ref(), SESSION_KEY, &record);
        self.state = SessionState::Authenticated(role);
        tracing::info!(username, %role, "login accepted");
        true
    }

    pub fn logout(&mut self) {
        clear_record(self.storage.as_ref(), SESSION_KEY);
        self.state = SessionState::Anonymous;
        tracing::info!("logged out");
    }
}

fn restore_session(storage: &dyn KeyValueStore) -> SessionState {
    match load_record::<SessionRecord>(storage, SESSION_KEY) {
        Loaded::Found(SessionRecord {
            authenticated: true,
            role: Some(role),
        }) => {
            tracing::debug!(%role, "session restored");
            SessionState::Authenticated(role)
        }
        Loaded::Missing => SessionState::Anonymous,
        Loaded::Found(_) | Loaded::Corrupt => {
            tracing::warn!("discarding malformed session record");
            clear_record(storage, SESSION_KEY);
            SessionState::Anonymous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    fn fresh() -> (Rc<MemoryStore>, AuthGate) {
        let storage = Rc::new(MemoryStore::new());
        let gate = AuthGate::open(storage.clone());
        (storage, gate)
    }

    #[test]
    fn starts_anonymous() {
        let (_, gate) = fresh();
        assert_eq!(gate.state(), SessionState::Anonymous);
        assert_eq!(gate.require_admin(), Err(AccessDenied::NotAuthenticated));
    }

    #[test]
    fn login_and_reload_keeps_session() {
        let (storage, mut gate) = fresh();
        assert!(gate.login("admin", "admin123"));
        assert_eq!(gate.state(), SessionState::Authenticated(Role::Admin));

        let reloaded = AuthGate::open(storage);
        assert_eq!(reloaded.state(), SessionState::Authenticated(Role::Admin));
        assert!(reloaded.is_admin());
    }

    #[test]
    fn failed_login_changes_nothing() {
        let (storage, mut gate) = fresh();
        assert!(!gate.login("admin", "wrong"));
        assert_eq!(gate.state(), SessionState::Anonymous);
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);

        assert!(gate.login("user", "user123"));
        assert!(!gate.login("admin", "nope"));
        assert_eq!(gate.state(), SessionState::Authenticated(Role::User));
        assert_eq!(AuthGate::open(storage).role(), Some(Role::User));
    }

    #[test]
    fn logout_clears_persisted_session() {
        let (storage, mut gate) = fresh();
        gate.login("user", "user123");
        gate.logout();
        assert_eq!(gate.state(), SessionState::Anonymous);
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
        assert_eq!(AuthGate::open(storage).state(), SessionState::Anonymous);
    }

    #[test]
    fn logout_when_anonymous_is_harmless() {
        let (_, mut gate) = fresh();
        gate.logout();
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn session_record_shape() {
        let (storage, mut gate) = fresh();
        gate.login("admin", "admin123");
        let raw = storage.get(SESSION_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({"authenticated": true, "role": "admin"}));
    }

    #[test]
    fn malformed_sessions_start_anonymous() {
        for raw in [
            "garbage",
            r#"{"authenticated": true}"#,
            r#"{"authenticated": true, "role": "root"}"#,
            r#"{"authenticated": false, "role": "admin"}"#,
        ] {
            let storage = Rc::new(MemoryStore::new());
            storage.set(SESSION_KEY, raw).unwrap();
            let gate = AuthGate::open(storage.clone());
            assert_eq!(gate.state(), SessionState::Anonymous, "record {raw}");
            assert_eq!(storage.get(SESSION_KEY).unwrap(), None, "record {raw}");
        }
    }

    #[test]
    fn users_added_through_gate_can_log_in() {
        let (_, mut gate) = fresh();
        gate.credentials_mut().upsert_user("frank", "Pa55", Role::User);
        assert!(!gate.login("frank", "pa55"));
        assert!(gate.login("frank", "Pa55"));
        assert_eq!(gate.require_admin(), Err(AccessDenied::NotAdmin(Role::User)));
    }
}
