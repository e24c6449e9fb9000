//! Operation types for the balance engine
//!
//! An [`Operation`] is a request as it arrives from a driver (CSV, CLI, or a
//! surrounding service). Amounts are carried as raw decimals; the engine is
//! responsible for validating them into [`Money`](super::Money).

use super::account::{Account, AccountNumber};
use super::money::Money;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Kinds of operations accepted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// Create a new account with an opening balance
    Open,
    /// Credit funds to an existing account
    Deposit,
    /// Debit funds from an existing account
    Withdraw,
    /// Move funds between two existing accounts
    Transfer,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Open => "open",
            OperationType::Deposit => "deposit",
            OperationType::Withdraw => "withdraw",
            OperationType::Transfer => "transfer",
        }
    }
}

/// Case-insensitive; `withdrawal` is accepted for `withdraw`
impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(OperationType::Open),
            "deposit" => Ok(OperationType::Deposit),
            "withdraw" | "withdrawal" => Ok(OperationType::Withdraw),
            "transfer" => Ok(OperationType::Transfer),
            _ => Err(format!("Invalid operation type: '{}'", s)),
        }
    }
}

/// A single balance operation request
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Open {
        account: AccountNumber,
        initial_balance: Decimal,
    },
    Deposit {
        account: AccountNumber,
        amount: Decimal,
    },
    Withdraw {
        account: AccountNumber,
        amount: Decimal,
    },
    Transfer {
        source: AccountNumber,
        target: AccountNumber,
        amount: Decimal,
    },
}

impl Operation {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Operation::Open { .. } => OperationType::Open,
            Operation::Deposit { .. } => OperationType::Deposit,
            Operation::Withdraw { .. } => OperationType::Withdraw,
            Operation::Transfer { .. } => OperationType::Transfer,
        }
    }

    /// The account this operation primarily touches (the source for transfers)
    pub fn account(&self) -> &str {
        match self {
            Operation::Open { account, .. }
            | Operation::Deposit { account, .. }
            | Operation::Withdraw { account, .. } => account,
            Operation::Transfer { source, .. } => source,
        }
    }
}

/// Confirmation of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Source account after the debit
    pub source: Account,
    /// Target account after the credit
    pub target: Account,
    /// Amount moved
    pub amount: Money,
}

/// Successful result of applying an [`Operation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// Open, deposit and withdraw return the updated account
    Account(Account),
    /// Transfer returns a receipt covering both legs
    Transfer(TransferReceipt),
}
