// Harmonia Portal - Error Taxonomy
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every failure returns control to the form that triggered it.
// Display strings are what the alert notification shows.

/// Errors surfaced by the engines and the portal flows
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Field-level problems; several may co-occur
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// Deliberately does not say whether the user or the password was wrong
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Too many attempts. Try again in {minutes} min")]
    Locked { minutes: i64 },

    #[error("Permission denied: only administrador may delete products")]
    Permission,

    #[error("{0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;

impl PortalError {
    pub fn validation(message: impl Into<String>) -> Self {
        PortalError::Validation(vec![message.into()])
    }
}
