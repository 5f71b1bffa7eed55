// Harmonia Portal - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary and tests.

pub mod paths;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod views;
pub mod router;
pub mod portal;

/// Auth Engine: user directory, password policy, session scoping, lockout
pub mod auth;

/// Product Engine: product directory, validation, delete permission
pub mod products;

// ============================================================================
// STORAGE - short-lived (memory) + durable (LMDB) scopes
// ============================================================================

/// Storage Gateway over the two key/value scopes
pub mod storage;

pub use error::{PortalError, PortalResult};
pub use portal::Portal;
