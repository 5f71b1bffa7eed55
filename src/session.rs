// Harmonia Portal - Session State
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// The logged-in identity. Lives in exactly one storage scope:
// durable when "remember me" was ticked, short-lived otherwise.

use crate::auth::{Role, User};
use serde::{Deserialize, Serialize};

/// Active session — the user record minus the password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub email: String,
}

impl Session {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
            email: String::new(),
        }
    }

    /// Status summary string
    pub fn status_summary(&self) -> String {
        if self.email.is_empty() {
            format!("{} ({})", self.username, self.role)
        } else {
            format!("{} <{}> ({})", self.username, self.email, self.role)
        }
    }
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            email: user.email.clone(),
        }
    }
}
