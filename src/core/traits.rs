//! Core traits for account persistence
//!
//! The engine never owns account state. It reads and writes accounts through an
//! [`AccountStore`], which may be an in-memory map, a database repository, or a
//! test double that injects failures.

use crate::types::{Account, StoreError};

/// Trait for loading and saving accounts
///
/// No transactional guarantees are expected from implementations. Mutual
/// exclusion is enforced by the [`BalanceEngine`](super::BalanceEngine)
/// through its locks.
pub trait AccountStore: Send + Sync {
    /// Look up an account by number, `Ok(None)` if it does not exist
    fn find_by_account_number(&self, account_number: &str) -> Result<Option<Account>, StoreError>;

    /// Insert or replace an account, returning the stored value
    fn save(&self, account: Account) -> Result<Account, StoreError>;

    /// Check whether an account number is taken
    fn exists(&self, account_number: &str) -> Result<bool, StoreError>;

    /// Every stored account, in no particular order
    fn find_all(&self) -> Result<Vec<Account>, StoreError>;
}
