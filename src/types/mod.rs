//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `money`: Exact non-negative amounts
//! - `account`: Account state and its balance mutators
//! - `operation`: Operation requests and their outcomes
//! - `error`: Error types and their classification

pub mod account;
pub mod error;
pub mod money;
pub mod operation;

pub use account::{Account, AccountNumber};
pub use error::{BalanceError, ErrorKind, StoreError};
pub use money::Money;
pub use operation::{Operation, OperationOutcome, OperationType, TransferReceipt};
