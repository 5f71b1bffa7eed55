// Harmonia Portal - Storage Gateway
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Two lifetime scopes over a string key/value store:
//   short-lived: in-memory, gone when the process (browser context) ends
//   durable:     LMDB at LIVE/DURABLE.DB, survives restarts
// Values are JSON strings. A single-key set is the unit of atomicity.

use anyhow::Result;
use heed::types::*;
use heed::{Database, Env, EnvOpenOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

const MAX_DB_SIZE: usize = 10 * 1024 * 1024; // 10MB - users and products are small

/// Fixed storage keys
pub mod keys {
    pub const USERS: &str = "ph_users";
    pub const SESSION: &str = "ph_session";
    pub const FAILED_ATTEMPTS: &str = "ph_failed_attempts";
    pub const LOCKOUT_UNTIL: &str = "ph_lockout_until";
    pub const PRODUCTS: &str = "ph_products";
}

/// Storage lifetime scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    ShortLived,
    Durable,
}

/// Raw string key/value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Returns whether the key existed
    fn remove(&self, key: &str) -> Result<bool>;
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Process-lifetime store. Single-threaded by construction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

// ============================================================================
// LMDB STORE
// ============================================================================

/// LMDB-backed durable store
pub struct LmdbStore {
    env: Env,
    /// string keys → JSON values
    db: Database<Str, Str>,
}

impl LmdbStore {
    /// Open or create LMDB at the given path
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(MAX_DB_SIZE)
                .max_dbs(2)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let db = env.create_database(&mut wtxn, Some("harmonia"))?;
        wtxn.commit()?;

        log::info!("Harmonia LMDB opened at {:?}", path);
        Ok(Self { env, db })
    }

    /// Get entry count
    pub fn entry_count(&self) -> Result<u64> {
        let rtxn = self.env.read_txn()?;
        let stat = self.db.stat(&rtxn)?;
        Ok(stat.entries as u64)
    }
}

impl KeyValueStore for LmdbStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let rtxn = self.env.read_txn()?;
        Ok(self.db.get(&rtxn, key)?.map(|s| s.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.db.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut wtxn = self.env.write_txn()?;
        let deleted = self.db.delete(&mut wtxn, key)?;
        wtxn.commit()?;
        Ok(deleted)
    }

    fn clear(&self) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.db.clear(&mut wtxn)?;
        wtxn.commit()?;
        Ok(())
    }
}

// ============================================================================
// GATEWAY
// ============================================================================

/// Both scopes behind one handle. Engines only ever talk to this.
pub struct StorageGateway {
    short_lived: Box<dyn KeyValueStore>,
    durable: Box<dyn KeyValueStore>,
}

impl StorageGateway {
    pub fn new(short_lived: Box<dyn KeyValueStore>, durable: Box<dyn KeyValueStore>) -> Self {
        Self { short_lived, durable }
    }

    /// Both scopes in memory (tests, throwaway runs)
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    /// Durable scope in LMDB at `path`, short-lived scope in memory
    pub fn open(path: &Path) -> Result<Self> {
        let durable = LmdbStore::open(path)?;
        Ok(Self::new(Box::new(MemoryStore::new()), Box::new(durable)))
    }

    fn store(&self, scope: Scope) -> &dyn KeyValueStore {
        match scope {
            Scope::ShortLived => self.short_lived.as_ref(),
            Scope::Durable => self.durable.as_ref(),
        }
    }

    pub fn get_raw(&self, scope: Scope, key: &str) -> Result<Option<String>> {
        self.store(scope).get(key)
    }

    pub fn set_raw(&self, scope: Scope, key: &str, value: &str) -> Result<()> {
        self.store(scope).set(key, value)
    }

    /// Get typed value (deserialize from JSON)
    pub fn get_json<T: DeserializeOwned>(&self, scope: Scope, key: &str) -> Result<Option<T>> {
        match self.get_raw(scope, key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Set typed value (serialize to JSON)
    pub fn set_json<T: Serialize + ?Sized>(&self, scope: Scope, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(scope, key, &json)
    }

    pub fn remove(&self, scope: Scope, key: &str) -> Result<bool> {
        self.store(scope).remove(key)
    }

    /// Drop every entry in one scope. Clearing ShortLived simulates the
    /// browser context ending.
    pub fn clear_scope(&self, scope: Scope) -> Result<()> {
        self.store(scope).clear()
    }
}

// ============================================================================
// TESTS
// ============================================================================
