// Harmonia Portal - Path Resolution
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single source of truth for where the portal keeps its durable data.
// Cached via OnceLock so repeated lookups never touch the environment again.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static HARMONIA_ROOT_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Directory holding the durable store and the optional config file.
///
/// Resolution order:
///   1. HARMONIA_ROOT environment variable
///   2. HOME env + /.harmonia
///   3. ./.harmonia relative to the working directory
pub fn harmonia_root() -> &'static Path {
    HARMONIA_ROOT_CACHE.get_or_init(|| {
        if let Ok(root) = std::env::var("HARMONIA_ROOT") {
            if !root.trim().is_empty() {
                return PathBuf::from(root);
            }
        }

        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".harmonia");
        }

        PathBuf::from(".harmonia")
    })
}

/// LMDB environment directory for the durable scope
pub fn durable_store_dir(root: &Path) -> PathBuf {
    root.join("LIVE/DURABLE.DB")
}

/// Portal config file (JSON). Missing file means defaults.
pub fn config_file(root: &Path) -> PathBuf {
    root.join("harmonia.json")
}
