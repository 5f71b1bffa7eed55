// Harmonia Portal - Auth Engine
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// User directory, password policy, session scoping, failed-login lockout.
// Login: lockout check -> credential match -> clear counter -> set session.
// Lockout expiry is computed lazily against the clock on every check.

use crate::config::PortalConfig;
use crate::error::{PortalError, PortalResult};
use crate::session::Session;
use crate::storage::{keys, Scope, StorageGateway};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const LOGIN_FIELDS_MESSAGE: &str = "Username and password are required";
pub const DUPLICATE_USER_MESSAGE: &str = "Email or username already in use";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Username, email and password are required";

/// User role. Only Administrador may delete products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrador,
    #[default]
    Operacional,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrador => "administrador",
            Role::Operacional => "operacional",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrador" => Ok(Role::Administrador),
            "operacional" => Ok(Role::Operacional),
            other => Err(PortalError::validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Directory entry. Passwords are stored as entered (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub email: String,
}

/// Registration form as submitted
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Result of `check_lockout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockoutStatus {
    pub is_locked: bool,
    pub minutes_remaining: Option<i64>,
}

/// Result of `record_failed_attempt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptOutcome {
    pub is_locked: bool,
    pub attempts: Option<u32>,
    pub minutes: Option<i64>,
}

fn seed_users() -> Vec<User> {
    vec![
        User {
            username: "admin".to_string(),
            password: "1234".to_string(),
            role: Role::Administrador,
            email: "admin@harmonia.app".to_string(),
        },
        User {
            username: "oper".to_string(),
            password: "1234".to_string(),
            role: Role::Operacional,
            email: "oper@harmonia.app".to_string(),
        },
    ]
}

/// Length (in characters) >= min_length, one ASCII uppercase, one ASCII digit
pub fn validate_password(password: &str, min_length: usize) -> bool {
    password.chars().count() >= min_length
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn password_policy_message(min_length: usize) -> String {
    format!(
        "Password must have at least {} characters, 1 uppercase letter and 1 digit",
        min_length
    )
}

/// Whole minutes left, rounded up
fn minutes_until(until_ms: i64, now_ms: i64) -> i64 {
    (until_ms - now_ms + 59_999) / 60_000
}

pub struct AuthEngine<'a> {
    storage: &'a StorageGateway,
    config: &'a PortalConfig,
}

impl<'a> AuthEngine<'a> {
    pub fn new(storage: &'a StorageGateway, config: &'a PortalConfig) -> Self {
        Self { storage, config }
    }

    // ========================================================================
    // USER DIRECTORY
    // ========================================================================

    /// Stored directory, seeded with admin/oper on first access
    pub fn list_users(&self) -> PortalResult<Vec<User>> {
        if let Some(users) = self.storage.get_json::<Vec<User>>(Scope::Durable, keys::USERS)? {
            return Ok(users);
        }
        let seed = seed_users();
        self.storage.set_json(Scope::Durable, keys::USERS, &seed)?;
        log::info!("User directory seeded with {} default accounts", seed.len());
        Ok(seed)
    }

    /// Replace the whole directory in one write
    pub fn save_users(&self, users: &[User]) -> PortalResult<()> {
        self.storage.set_json(Scope::Durable, keys::USERS, users)?;
        Ok(())
    }

    pub fn validate_password(&self, password: &str) -> bool {
        validate_password(password, self.config.password_min_length)
    }

    // ========================================================================
    // SESSION
    // ========================================================================

    /// Short-lived scope first, then durable
    pub fn get_session(&self) -> PortalResult<Option<Session>> {
        if let Some(session) = self.storage.get_json(Scope::ShortLived, keys::SESSION)? {
            return Ok(Some(session));
        }
        Ok(self.storage.get_json(Scope::Durable, keys::SESSION)?)
    }

    /// Clears both scopes, then writes to exactly one
    pub fn set_session(&self, session: &Session, remember: bool) -> PortalResult<()> {
        self.storage.remove(Scope::ShortLived, keys::SESSION)?;
        self.storage.remove(Scope::Durable, keys::SESSION)?;
        let scope = if remember { Scope::Durable } else { Scope::ShortLived };
        self.storage.set_json(scope, keys::SESSION, session)?;
        log::info!("Session set for {} ({:?} scope)", session.username, scope);
        Ok(())
    }

    pub fn clear_session(&self) -> PortalResult<()> {
        self.storage.remove(Scope::ShortLived, keys::SESSION)?;
        self.storage.remove(Scope::Durable, keys::SESSION)?;
        log::info!("Session cleared");
        Ok(())
    }

    // ========================================================================
    // LOCKOUT
    // ========================================================================

    pub fn check_lockout(&self) -> PortalResult<LockoutStatus> {
        self.check_lockout_at(Utc::now())
    }

    pub fn check_lockout_at(&self, now: DateTime<Utc>) -> PortalResult<LockoutStatus> {
        let until = self
            .storage
            .get_json::<i64>(Scope::Durable, keys::LOCKOUT_UNTIL)?
            .unwrap_or(0);
        let now_ms = now.timestamp_millis();
        if until > 0 && now_ms < until {
            return Ok(LockoutStatus {
                is_locked: true,
                minutes_remaining: Some(minutes_until(until, now_ms)),
            });
        }
        Ok(LockoutStatus { is_locked: false, minutes_remaining: None })
    }

    pub fn failed_attempts(&self) -> PortalResult<u32> {
        Ok(self
            .storage
            .get_json::<u32>(Scope::Durable, keys::FAILED_ATTEMPTS)?
            .unwrap_or(0))
    }

    pub fn record_failed_attempt(&self) -> PortalResult<AttemptOutcome> {
        self.record_failed_attempt_at(Utc::now())
    }

    /// Counter is not reset when the lockout arms, so after expiry a single
    /// further failure re-arms it.
    pub fn record_failed_attempt_at(&self, now: DateTime<Utc>) -> PortalResult<AttemptOutcome> {
        let failed = self.failed_attempts()? + 1;
        self.storage.set_json(Scope::Durable, keys::FAILED_ATTEMPTS, &failed)?;

        if failed >= self.config.max_failed_attempts {
            let until = now.timestamp_millis() + self.config.lockout_ms();
            self.storage.set_json(Scope::Durable, keys::LOCKOUT_UNTIL, &until)?;
            log::warn!(
                "Login locked for {} min after {} failed attempts",
                self.config.lockout_minutes,
                failed
            );
            return Ok(AttemptOutcome {
                is_locked: true,
                attempts: None,
                minutes: Some(self.config.lockout_minutes),
            });
        }

        Ok(AttemptOutcome { is_locked: false, attempts: Some(failed), minutes: None })
    }

    pub fn clear_failed_attempts(&self) -> PortalResult<()> {
        self.storage.remove(Scope::Durable, keys::FAILED_ATTEMPTS)?;
        self.storage.remove(Scope::Durable, keys::LOCKOUT_UNTIL)?;
        Ok(())
    }

    // ========================================================================
    // FLOWS
    // ========================================================================

    pub fn login(&self, username: &str, password: &str, remember: bool) -> PortalResult<Session> {
        self.login_at(username, password, remember, Utc::now())
    }

    /// Blank fields and locked contexts are rejected before the directory
    /// is consulted and without consuming an attempt.
    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        remember: bool,
        now: DateTime<Utc>,
    ) -> PortalResult<Session> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(PortalError::validation(LOGIN_FIELDS_MESSAGE));
        }

        let lockout = self.check_lockout_at(now)?;
        if lockout.is_locked {
            return Err(PortalError::Locked {
                minutes: lockout.minutes_remaining.unwrap_or(self.config.lockout_minutes),
            });
        }

        let users = self.list_users()?;
        let matched = users
            .iter()
            .find(|u| u.username == username && u.password == password);

        let Some(user) = matched else {
            let outcome = self.record_failed_attempt_at(now)?;
            log::warn!("Failed login attempt for {:?}", username);
            if outcome.is_locked {
                return Err(PortalError::Locked {
                    minutes: outcome.minutes.unwrap_or(self.config.lockout_minutes),
                });
            }
            return Err(PortalError::InvalidCredentials);
        };

        self.clear_failed_attempts()?;
        let session = Session::from(user);
        self.set_session(&session, remember)?;
        Ok(session)
    }

    /// Append a new user after required-field, policy and uniqueness checks
    pub fn register(&self, form: &RegistrationForm) -> PortalResult<User> {
        let username = form.username.trim();
        let email = form.email.trim();
        if username.is_empty() || email.is_empty() || form.password.is_empty() {
            return Err(PortalError::validation(REQUIRED_FIELDS_MESSAGE));
        }
        if !self.validate_password(&form.password) {
            return Err(PortalError::validation(password_policy_message(
                self.config.password_min_length,
            )));
        }

        let mut users = self.list_users()?;
        if users.iter().any(|u| u.username == username || u.email == email) {
            return Err(PortalError::Conflict(DUPLICATE_USER_MESSAGE.to_string()));
        }

        let user = User {
            username: username.to_string(),
            password: form.password.clone(),
            role: form.role,
            email: email.to_string(),
        };
        users.push(user.clone());
        self.save_users(&users)?;
        log::info!("Registered user {} ({})", user.username, user.role);
        Ok(user)
    }
}

// ============================================================================
// TESTS
// ============================================================================
