//! Registration, login and profile lookup.
//!
//! Successful registration and login both hand back a freshly issued token
//! from the [`AuthGate`].

use std::sync::Arc;

use chrono::SubsecRound;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, AuthGate, Principal};
use crate::clock::Clock;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::*;

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct AccountService {
    db: Database,
    gate: AuthGate,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(db: Database, gate: AuthGate, clock: Arc<dyn Clock>) -> Self {
        Self { db, gate, clock }
    }

    /// Create an account and return a token for it.
    pub fn register(&self, input: CreateUserInput) -> Result<String> {
        if input.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(Error::validation("Name is not valid"));
        }
        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(Error::validation("Email is not valid"));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation("Password is too short"));
        }
        let occupation = input
            .occupation
            .filter(|o| !o.trim().is_empty())
            .ok_or_else(|| Error::validation("Occupation not provided"))?;

        if self.db.get_user_by_email(&email)?.is_some() {
            return Err(Error::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email,
            password_hash: hash_password(&input.password).map_err(Error::Internal)?,
            occupation,
            branch: input.branch.filter(|b| !b.trim().is_empty()),
            created_at: self.clock.now().trunc_subsecs(6),
        };

        // The lookup above can race with a concurrent registration; the
        // unique index has the final say.
        if !self.db.create_user(&user)? {
            return Err(Error::EmailTaken);
        }

        tracing::info!("User {} registered", user.id);
        self.gate.issue_token(user.id)
    }

    /// Check credentials and return a token.
    ///
    /// An unknown email and a wrong password fail the same way.
    pub fn login(&self, input: LoginInput) -> Result<String> {
        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(Error::validation("Email is not valid"));
        }
        if input.password.is_empty() {
            return Err(Error::validation("Password must not be empty"));
        }

        let Some(user) = self.db.get_user_by_email(&email)? else {
            tracing::debug!("Login attempt for unknown email");
            return Err(Error::InvalidCredentials);
        };

        if !verify_password(&user.password_hash, &input.password) {
            tracing::debug!("Login attempt with wrong password for {}", user.id);
            return Err(Error::InvalidCredentials);
        }

        self.gate.issue_token(user.id)
    }

    /// The caller's own account.
    pub fn profile(&self, principal: &Principal) -> Result<User> {
        self.db.get_user(principal.id)?.ok_or(Error::NotFound)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
