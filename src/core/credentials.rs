use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

use super::storage::{load_record, save_record, KeyValueStore, Loaded, CREDENTIALS_KEY};

// ── Role ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role {0:?} (expected \"admin\" or \"user\")")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

// Passwords are stored and compared as plaintext; a real deployment needs a
// salted hash here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct UserRecord {
    username: String,
    password: String,
    role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CredentialsRecord {
    users: Vec<UserRecord>,
}

fn default_credentials() -> CredentialsRecord {
    CredentialsRecord {
        users: vec![
            UserRecord {
                username: "admin".into(),
                password: "admin123".into(),
                role: Role::Admin,
            },
            UserRecord {
                username: "user".into(),
                password: "user123".into(),
                role: Role::User,
            },
        ],
    }
}

/// Public view of an account; never carries the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

// ── Store ─────────────────────────────────────────────────────────────────────

pub struct CredentialStore {
    storage: Rc<dyn KeyValueStore>,
    record: CredentialsRecord,
}

impl CredentialStore {
    /// Loads the persisted accounts, seeding the two default accounts when
    /// the record is missing or unreadable.
    pub fn open(storage: Rc<dyn KeyValueStore>) -> Self {
        let record = match load_record::<CredentialsRecord>(storage.as_ref(), CREDENTIALS_KEY) {
            Loaded::Found(mut record) => {
                dedup_usernames(&mut record.users);
                record
            }
            Loaded::Missing | Loaded::Corrupt => {
                tracing::info!("seeding default accounts");
                let record = default_credentials();
                save_record(storage.as_ref(), CREDENTIALS_KEY, &record);
                record
            }
        };
        Self { storage, record }
    }

    fn persist(&self) {
        save_record(self.storage.as_ref(), CREDENTIALS_KEY, &self.record);
    }

    /// Exact, case-sensitive match on both username and password.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Role> {
        self.record
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .map(|u| u.role)
    }

    pub fn upsert_user(&mut self, username: &str, password: &str, role: Role) -> Upsert {
        let outcome = match self.record.users.iter_mut().find(|u| u.username == username) {
            Some(existing) => {
                existing.password = password.to_string();
                existing.role = role;
                Upsert::Updated
            }
            None => {
                self.record.users.push(UserRecord {
                    username: username.to_string(),
                    password: password.to_string(),
                    role,
                });
                Upsert::Created
            }
        };
        self.persist();
        tracing::info!(username, %role, ?outcome, "account saved");
        outcome
    }

    pub fn remove_user(&mut self, username: &str) -> bool {
        let before = self.record.users.len();
        self.record.users.retain(|u| u.username != username);
        if self.record.users.len() == before {
            return false;
        }
        self.persist();
        tracing::info!(username, "account removed");
        true
    }

    pub fn list_users(&self) -> Vec<UserSummary> {
        self.record
            .users
            .iter()
            .map(|u| UserSummary {
                username: u.username.clone(),
                role: u.role,
            })
            .collect()
    }
}

fn dedup_usernames(users: &mut Vec<UserRecord>) {
    let mut seen = std::collections::HashSet::new();
    users.retain(|u| {
        let fresh = seen.insert(u.username.clone());
        if !fresh {
            tracing::warn!(username = %u.username, "dropping duplicate account");
        }
        fresh
    });
}
