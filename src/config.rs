// Harmonia Portal - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Lockout thresholds, password policy, notification timing.
// Loaded from harmonia.json when present, compiled defaults otherwise.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Portal configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortalConfig {
    /// Consecutive failed logins that arm the lockout
    pub max_failed_attempts: u32,
    /// Length of the lockout window
    pub lockout_minutes: i64,
    /// Minimum password length accepted at registration
    pub password_min_length: usize,
    /// How long a notification stays visible
    pub notification_ms: i64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_minutes: 5,
            password_min_length: 8,
            notification_ms: 2500,
        }
    }
}

impl PortalConfig {
    /// Load config from JSON file, falling back to defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            log::warn!("Config not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save config to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Lockout window in milliseconds
    pub fn lockout_ms(&self) -> i64 {
        self.lockout_minutes * 60_000
    }
}

// ============================================================================
// TESTS
// ============================================================================
