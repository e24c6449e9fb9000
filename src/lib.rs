//! Balance Engine Library
//! # Overview
//!
//! This library applies balance mutations (account openings, deposits,
//! withdrawals and transfers) to monetary accounts under concurrency, and
//! ships a CSV driver with a sync and an async processing strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Money, Account, Operation, errors)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Validation, locking and persistence of each operation
//!   - [`core::lock_registry`] - One try-lock per account number
//!   - [`core::account_store`] - In-memory account persistence
//! - [`io`] - CSV reading and writing
//! - [`strategy`] - Sequential and concurrent batch pipelines
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - tracing subscriber setup
//!
//! # Concurrency model
//!
//! An operation never waits for a lock. If any account it touches is busy
//! the operation fails with a `Conflict` error and has no effect, and the
//! caller may retry. Transfers lock both accounts in account-number order,
//! so two opposite transfers between the same pair cannot deadlock.
//!
//! # Error kinds
//!
//! Every [`BalanceError`] maps to one [`ErrorKind`]: `InvalidRequest`,
//! `NotFound`, `Conflict`, `InsufficientFunds` or `Fatal`. Only `Fatal`
//! means the ledger may be inconsistent. Any failed store call is `Fatal`,
//! including a transfer whose first write fails.

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{AccountStore, BalanceEngine, InMemoryAccountStore, LockRegistry};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountNumber, BalanceError, ErrorKind, Money, Operation, OperationOutcome,
    StoreError, TransferReceipt,
};
