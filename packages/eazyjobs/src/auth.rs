//! Session state for the dashboard.
//!
//! Authentication is a placeholder: any non-empty email/password pair is
//! accepted and nothing is verified against an authority. The session record
//! is persisted so a later process starts out logged in.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, Result, AUTH_KEY};

/// Role assigned to every account.
pub const DEFAULT_ROLE: &str = "Job Scraper";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub role: String,
}

impl User {
    /// Display name is the part of the email before the first `@`.
    pub fn from_email(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            email: email.to_string(),
            name,
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

/// Persisted form of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    pub is_authenticated: bool,
    pub user: User,
}

pub struct AuthSession {
    store: Arc<dyn KeyValueStore>,
    user: Option<User>,
}

impl AuthSession {
    /// Hydrate from the persisted record, if any.
    ///
    /// A record that fails to parse is returned as an error; it is left on
    /// disk untouched.
    pub fn init(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let record: Option<AuthRecord> = store.get_json(AUTH_KEY)?;
        let user = record.map(|r| r.user);
        if let Some(user) = &user {
            tracing::debug!(email = %user.email, "Restored session");
        }
        Ok(Self { store, user })
    }

    /// Accepts any pair where both fields are non-empty. Returns `Ok(false)`
    /// without touching state otherwise.
    pub fn login(&mut self, email: &str, password: &str) -> Result<bool> {
        if email.is_empty() || password.is_empty() {
            return Ok(false);
        }

        let user = User::from_email(email);
        let record = AuthRecord {
            is_authenticated: true,
            user: user.clone(),
        };
        self.store.set_json(AUTH_KEY, &record)?;
        tracing::info!(email = %user.email, "Logged in");
        self.user = Some(user);
        Ok(true)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.user = None;
        self.store.remove(AUTH_KEY)?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
