//! Per-account lock registry
//!
//! This module provides the `LockRegistry` struct, which hands out exactly one
//! exclusive lock per account number for the lifetime of the registry.
//!
//! # Design
//!
//! Locks live in a `DashMap<AccountNumber, Arc<AccountLock>>`. Lookups for an
//! unseen account number go through `DashMap::entry`, which holds the shard's
//! write lock across the check and the insert, so two racing first accesses
//! always observe the same `Arc`.
//!
//! The registry is append-only: entries are never removed, so a lock handed out
//! once remains the lock for that account number.
//!
//! # Locks
//!
//! `AccountLock` is a `parking_lot::Mutex<()>`. The engine only ever calls
//! `try_lock`, never `lock`, so no operation queues behind another. Guards
//! release on drop, including during unwinding, and `parking_lot` mutexes do
//! not poison.

use crate::types::AccountNumber;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Exclusive lock guarding one account's balance
pub type AccountLock = Mutex<()>;

/// Process-wide map from account number to its lock
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<AccountNumber, Arc<AccountLock>>,
}

impl LockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock for `account_number`, creating it on first access
    ///
    /// Always returns the same instance for the same account number. The
    /// returned `Arc` is detached from the map, so holding (or trying) the lock
    /// never pins a DashMap shard.
    pub fn lock_for(&self, account_number: &str) -> Arc<AccountLock> {
        // Fast path avoids allocating the key for already-known accounts
        if let Some(existing) = self.locks.get(account_number) {
            return Arc::clone(existing.value());
        }

        let entry = self
            .locks
            .entry(account_number.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Number of account numbers that have a lock
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
