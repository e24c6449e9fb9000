//! In-memory account store
//!
//! This module provides the `InMemoryAccountStore` struct, a thread-safe
//! [`AccountStore`] backed by `DashMap`.
//!
//! # Thread Safety
//!
//! DashMap shards its entries and locks per shard, so concurrent reads and
//! writes of different accounts do not block each other. The store does not
//! serialize read-modify-write sequences; that is the engine's job.

use super::traits::AccountStore;
use crate::types::{Account, AccountNumber, StoreError};
use dashmap::DashMap;

/// Thread-safe in-memory account store
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    /// Accounts keyed by account number
    accounts: DashMap<AccountNumber, Account>,
}

impl InMemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_account_number(&self, account_number: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .get(account_number)
            .map(|entry| entry.value().clone()))
    }

    fn save(&self, account: Account) -> Result<Account, StoreError> {
        self.accounts
            .insert(account.account_number().to_string(), account.clone());
        Ok(account)
    }

    fn exists(&self, account_number: &str) -> Result<bool, StoreError> {
        Ok(self.accounts.contains_key(account_number))
    }

    fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
