//! Core business logic module
//!
//! This module contains the concurrent balance-mutation components:
//! - `traits` - The `AccountStore` persistence abstraction
//! - `account_store` - Thread-safe in-memory `AccountStore`
//! - `lock_registry` - One exclusive lock per account number
//! - `engine` - Deposit, withdraw and transfer orchestration

pub mod account_store;
pub mod engine;
pub mod lock_registry;
pub mod traits;

pub use account_store::InMemoryAccountStore;
pub use engine::BalanceEngine;
pub use lock_registry::{AccountLock, LockRegistry};
pub use traits::AccountStore;
