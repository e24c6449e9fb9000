//! Balance mutation orchestration
//!
//! This module provides the `BalanceEngine` struct, which applies account
//! openings, deposits, withdrawals and transfers against an injected
//! [`AccountStore`] while serializing access per account through a shared
//! [`LockRegistry`].
//!
//! # Architecture
//!
//! ```text
//! BalanceEngine
//!     ├── Arc<S: AccountStore>  (account persistence)
//!     └── Arc<LockRegistry>     (one try-lock per account number)
//! ```
//!
//! # Locking discipline
//!
//! - Every mutation of an account happens while its lock is held, and the
//!   account is re-read from the store after the lock is taken, so checks such
//!   as insufficient funds see the true current balance.
//! - Locks are only ever *tried*. Contention fails fast with
//!   `TransactionInProgress` instead of queueing.
//! - Transfers lock the lexicographically smaller account number first,
//!   whatever the direction of the transfer, so a concurrent reverse transfer
//!   asks for the locks in the same order and the pair cannot deadlock.
//! - Guards are scoped locals. Every exit path, including `?` and unwinding,
//!   drops them.

use std::sync::Arc;

use tracing::{debug, error};

use super::lock_registry::LockRegistry;
use super::traits::AccountStore;
use crate::types::{
    Account, BalanceError, Money, Operation, OperationOutcome, TransferReceipt,
};
use rust_decimal::Decimal;

/// Concurrent balance-mutation engine
///
/// Cloning is cheap and clones share the same store and lock registry, so an
/// engine can be handed to as many threads as needed.
#[derive(Debug)]
pub struct BalanceEngine<S: AccountStore> {
    store: Arc<S>,
    locks: Arc<LockRegistry>,
}

impl<S: AccountStore> Clone for BalanceEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S: AccountStore> BalanceEngine<S> {
    /// Create an engine with its own lock registry
    pub fn new(store: Arc<S>) -> Self {
        Self::with_lock_registry(store, Arc::new(LockRegistry::new()))
    }

    /// Create an engine sharing an existing lock registry
    ///
    /// Every engine that writes to the same store must share one registry,
    /// otherwise they would hold different locks for the same account.
    pub fn with_lock_registry(store: Arc<S>, locks: Arc<LockRegistry>) -> Self {
        Self { store, locks }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn lock_registry(&self) -> &Arc<LockRegistry> {
        &self.locks
    }

    /// Open a new account
    ///
    /// # Errors
    ///
    /// * `InvalidRequest` - empty account number or negative opening balance
    /// * `TransactionInProgress` - another operation holds the account lock
    /// * `AccountAlreadyExists` - the number is taken
    /// * `Storage` - the store failed (classified `Fatal`)
    pub fn open_account(
        &self,
        account_number: &str,
        initial_balance: Decimal,
    ) -> Result<Account, BalanceError> {
        validate_account_number(account_number)?;
        let initial_balance = Money::new(initial_balance)?;

        // Existence check and insert happen under the lock so two racing opens
        // of the same number cannot both pass the check
        let lock = self.locks.lock_for(account_number);
        let _guard = lock
            .try_lock()
            .ok_or_else(|| BalanceError::in_progress(account_number))?;

        if self
            .store
            .exists(account_number)
            .map_err(|e| BalanceError::storage("open", e))?
        {
            return Err(BalanceError::already_exists(account_number));
        }

        let account = self
            .store
            .save(Account::new(account_number, initial_balance))
            .map_err(|e| BalanceError::storage("open", e))?;

        debug!(account = account_number, balance = %account.balance(), "account opened");
        Ok(account)
    }

    /// Look up an account
    pub fn get_account(&self, account_number: &str) -> Result<Account, BalanceError> {
        self.load(account_number, "lookup")
    }

    /// All accounts sorted by account number
    pub fn list_accounts(&self) -> Result<Vec<Account>, BalanceError> {
        let mut accounts = self
            .store
            .find_all()
            .map_err(|e| BalanceError::storage("list", e))?;
        accounts.sort_by(|a, b| a.account_number().cmp(b.account_number()));
        Ok(accounts)
    }

    /// Credit `amount` to an account
    ///
    /// # Errors
    ///
    /// * `InvalidRequest` - empty account number or non-positive amount
    /// * `AccountNotFound` - the account does not exist
    /// * `TransactionInProgress` - another operation holds the account lock
    /// * `ArithmeticOverflow` - the balance would leave the decimal range
    /// * `Storage` - the store failed (classified `Fatal`)
    pub fn deposit(&self, account_number: &str, amount: Decimal) -> Result<Account, BalanceError> {
        self.mutate_single(account_number, amount, "deposit", |account, amount| {
            account.deposit(amount)
        })
    }

    /// Debit `amount` from an account
    ///
    /// # Errors
    ///
    /// As [`deposit`](Self::deposit), plus `InsufficientFunds` when `amount`
    /// exceeds the balance observed under the lock.
    pub fn withdraw(&self, account_number: &str, amount: Decimal) -> Result<Account, BalanceError> {
        self.mutate_single(account_number, amount, "withdraw", |account, amount| {
            account.withdraw(amount)
        })
    }

    /// Move `amount` from `source` to `target`
    ///
    /// # Errors
    ///
    /// * `InvalidRequest` - empty numbers, `source == target`, non-positive amount
    /// * `AccountNotFound` - source (checked first) or target does not exist
    /// * `TransactionInProgress` - names the account whose lock was busy
    /// * `InsufficientFunds` - source balance below `amount`
    /// * `ArithmeticOverflow` - target balance would leave the decimal range
    /// * `TransferNotPersisted` - saving the debit failed (classified `Fatal`)
    /// * `PartialTransfer` - the debit was written but the credit was not
    pub fn transfer(
        &self,
        source: &str,
        target: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, BalanceError> {
        validate_account_number(source)?;
        validate_account_number(target)?;
        if source == target {
            return Err(BalanceError::invalid_request(
                "source and target account must be different",
            ));
        }
        let amount = Money::positive(amount, "transfer")?;

        self.ensure_exists(source, "transfer")?;
        self.ensure_exists(target, "transfer")?;

        // Lower account number first, whatever the direction
        let (low, high) = if source < target {
            (source, target)
        } else {
            (target, source)
        };
        let low_lock = self.locks.lock_for(low);
        let high_lock = self.locks.lock_for(high);

        let low_guard = low_lock.try_lock().ok_or_else(|| {
            debug!(account = low, "transfer lock busy");
            BalanceError::in_progress(low)
        })?;
        // Returning here drops low_guard before the caller sees the error
        let high_guard = high_lock.try_lock().ok_or_else(|| {
            debug!(account = high, "transfer lock busy");
            BalanceError::in_progress(high)
        })?;

        let mut source_account = self.load(source, "transfer")?;
        let mut target_account = self.load(target, "transfer")?;
        source_account.withdraw(amount)?;
        target_account.deposit(amount)?;

        // From here on a store failure leaves balances unknown
        let source_account = self.store.save(source_account).map_err(|e| {
            let err = BalanceError::transfer_not_persisted(source, target, amount.value(), e);
            error!(
                source_account = source,
                target_account = target,
                amount = %amount,
                error = %err,
                "transfer debit not persisted"
            );
            err
        })?;
        let target_account = self.store.save(target_account).map_err(|e| {
            let err = BalanceError::partial_transfer(source, target, amount.value(), e);
            error!(
                source_account = source,
                target_account = target,
                amount = %amount,
                error = %err,
                "transfer partially persisted"
            );
            err
        })?;

        // Release in reverse acquisition order
        drop(high_guard);
        drop(low_guard);

        debug!(
            source_account = source,
            target_account = target,
            amount = %amount,
            "transfer applied"
        );
        Ok(TransferReceipt {
            source: source_account,
            target: target_account,
            amount,
        })
    }

    /// Apply an operation by routing it to the matching engine method
    pub fn apply(&self, operation: &Operation) -> Result<OperationOutcome, BalanceError> {
        match operation {
            Operation::Open {
                account,
                initial_balance,
            } => self
                .open_account(account, *initial_balance)
                .map(OperationOutcome::Account),
            Operation::Deposit { account, amount } => self
                .deposit(account, *amount)
                .map(OperationOutcome::Account),
            Operation::Withdraw { account, amount } => self
                .withdraw(account, *amount)
                .map(OperationOutcome::Account),
            Operation::Transfer {
                source,
                target,
                amount,
            } => self
                .transfer(source, target, *amount)
                .map(OperationOutcome::Transfer),
        }
    }

    /// Apply an operation, retrying lock contention up to `max_retries` times
    ///
    /// Only `TransactionInProgress` is retried; every other outcome is
    /// returned as-is. The thread yields between attempts.
    pub fn apply_with_retry(
        &self,
        operation: &Operation,
        max_retries: usize,
    ) -> Result<OperationOutcome, BalanceError> {
        let mut attempt = 0;
        loop {
            match self.apply(operation) {
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    std::thread::yield_now();
                }
                result => return result,
            }
        }
    }

    /// Shared path for single-account mutations
    fn mutate_single<F>(
        &self,
        account_number: &str,
        amount: Decimal,
        operation: &str,
        mutate: F,
    ) -> Result<Account, BalanceError>
    where
        F: FnOnce(&mut Account, Money) -> Result<(), BalanceError>,
    {
        validate_account_number(account_number)?;
        let amount = Money::positive(amount, operation)?;
        self.ensure_exists(account_number, operation)?;

        let lock = self.locks.lock_for(account_number);
        let _guard = lock.try_lock().ok_or_else(|| {
            debug!(account = account_number, operation, "account lock busy");
            BalanceError::in_progress(account_number)
        })?;

        let mut account = self.load(account_number, operation)?;
        mutate(&mut account, amount)?;
        let account = self
            .store
            .save(account)
            .map_err(|e| BalanceError::storage(operation, e))?;

        debug!(
            account = account_number,
            operation,
            amount = %amount,
            balance = %account.balance(),
            "operation applied"
        );
        Ok(account)
    }

    fn ensure_exists(&self, account_number: &str, operation: &str) -> Result<(), BalanceError> {
        if self
            .store
            .exists(account_number)
            .map_err(|e| BalanceError::storage(operation, e))?
        {
            Ok(())
        } else {
            Err(BalanceError::not_found(account_number))
        }
    }

    fn load(&self, account_number: &str, operation: &str) -> Result<Account, BalanceError> {
        self.store
            .find_by_account_number(account_number)
            .map_err(|e| BalanceError::storage(operation, e))?
            .ok_or_else(|| BalanceError::not_found(account_number))
    }
}

fn validate_account_number(account_number: &str) -> Result<(), BalanceError> {
    if account_number.trim().is_empty() {
        return Err(BalanceError::invalid_request(
            "account number must not be empty",
        ));
    }
    Ok(())
}
