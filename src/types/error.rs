//! Error types for the balance engine
//!
//! Every failure the engine can produce is a [`BalanceError`] variant, and every
//! variant maps onto exactly one [`ErrorKind`]. Surrounding layers (CLI, HTTP,
//! RPC) translate the kind into their own status vocabulary; the engine itself
//! never depends on a transport.
//!
//! # Side effects
//!
//! All kinds except `Fatal` guarantee that nothing was persisted and that no
//! account lock is still held when the error is returned. Stores promise no
//! transactional behaviour, so a failed store call is always `Fatal`: the
//! caller cannot know whether the write landed.

use rust_decimal::Decimal;
use thiserror::Error;

/// Classification of engine failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: empty account number, non-positive amount, self-transfer
    InvalidRequest,
    /// The referenced account does not exist
    NotFound,
    /// A required lock is held by another operation, or the account already exists
    Conflict,
    /// A withdrawal would drive a balance below zero
    InsufficientFunds,
    /// Persistence failed; the ledger may be inconsistent
    Fatal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an [`AccountStore`](crate::core::AccountStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError {
            message: message.into(),
        }
    }
}

/// Main error type for the balance engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    /// Input failed validation before any account was touched
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request
        reason: String,
    },

    /// Referenced account does not exist
    #[error("Account with number {account} does not exist")]
    AccountNotFound {
        /// The missing account number
        account: String,
    },

    /// Account opening targets a number that is already taken
    #[error("Account with number {account} already exists")]
    AccountAlreadyExists {
        /// The duplicate account number
        account: String,
    },

    /// The account lock is held by another operation
    ///
    /// Safe to retry; nothing was changed.
    #[error("Account with number {account} has a transaction in progress")]
    TransactionInProgress {
        /// Account whose lock could not be acquired
        account: String,
    },

    /// Withdrawal larger than the current balance
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account being debited
        account: String,
        /// Balance observed under the lock
        balance: Decimal,
        /// Requested debit
        requested: Decimal,
    },

    /// Credit would exceed the representable decimal range
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account being credited
        account: String,
    },

    /// A store call failed outside a transfer's write phase
    #[error("Storage failure during {operation}: {source}")]
    Storage {
        /// Operation that hit the failure
        operation: String,
        /// Underlying store error
        source: StoreError,
    },

    /// Writing a transfer's debit failed
    ///
    /// The store gives no guarantee that a failed save wrote nothing, so the
    /// source balance is unknown.
    #[error("Ledger may be inconsistent: transfer of {amount} from {source_account} to {target_account} failed while writing the debit: {source}")]
    TransferNotPersisted {
        source_account: String,
        target_account: String,
        amount: Decimal,
        /// Store error from the failed debit
        source: StoreError,
    },

    /// Transfer debit was persisted but the credit was not
    ///
    /// The ledger may be inconsistent. This must be escalated, never retried
    /// silently.
    #[error("Ledger may be inconsistent: transfer of {amount} from {source_account} to {target_account} persisted only the debit: {source}")]
    PartialTransfer {
        /// Debited account (written)
        source_account: String,
        /// Credited account (not written)
        target_account: String,
        /// Transfer amount
        amount: Decimal,
        /// Store error from the failed credit
        source: StoreError,
    },
}

impl BalanceError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BalanceError::InvalidRequest { .. } | BalanceError::ArithmeticOverflow { .. } => {
                ErrorKind::InvalidRequest
            }
            BalanceError::AccountNotFound { .. } => ErrorKind::NotFound,
            BalanceError::AccountAlreadyExists { .. }
            | BalanceError::TransactionInProgress { .. } => ErrorKind::Conflict,
            BalanceError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            BalanceError::Storage { .. }
            | BalanceError::TransferNotPersisted { .. }
            | BalanceError::PartialTransfer { .. } => ErrorKind::Fatal,
        }
    }

    /// Whether repeating the same operation could succeed
    ///
    /// Only lock contention qualifies. A duplicate account stays a duplicate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BalanceError::TransactionInProgress { .. })
    }
}

// Helper functions for creating common errors

impl BalanceError {
    /// Create an InvalidRequest error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        BalanceError::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Create an AccountNotFound error
    pub fn not_found(account: &str) -> Self {
        BalanceError::AccountNotFound {
            account: account.to_string(),
        }
    }

    /// Create an AccountAlreadyExists error
    pub fn already_exists(account: &str) -> Self {
        BalanceError::AccountAlreadyExists {
            account: account.to_string(),
        }
    }

    /// Create a TransactionInProgress error
    pub fn in_progress(account: &str) -> Self {
        BalanceError::TransactionInProgress {
            account: account.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: &str, balance: Decimal, requested: Decimal) -> Self {
        BalanceError::InsufficientFunds {
            account: account.to_string(),
            balance,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        BalanceError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    /// Create a Storage error
    pub fn storage(operation: &str, source: StoreError) -> Self {
        BalanceError::Storage {
            operation: operation.to_string(),
            source,
        }
    }

    /// Create a TransferNotPersisted error
    pub fn transfer_not_persisted(
        source_account: &str,
        target_account: &str,
        amount: Decimal,
        source: StoreError,
    ) -> Self {
        BalanceError::TransferNotPersisted {
            source_account: source_account.to_string(),
            target_account: target_account.to_string(),
            amount,
            source,
        }
    }

    /// Create a PartialTransfer error
    pub fn partial_transfer(
        source_account: &str,
        target_account: &str,
        amount: Decimal,
        source: StoreError,
    ) -> Self {
        BalanceError::PartialTransfer {
            source_account: source_account.to_string(),
            target_account: target_account.to_string(),
            amount,
            source,
        }
    }
}
