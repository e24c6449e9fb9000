//! CSV format handling for operation records and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain operations
//! - Account output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input format
//!
//! ```text
//! type,account,target,amount
//! open,12345,,1000
//! deposit,12345,,200
//! withdraw,12345,,100
//! transfer,12345,67890,500
//! ```

use crate::types::{Account, Operation, OperationType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// `target` is only meaningful for transfers. `amount` is the opening balance
/// for `open` rows and the moved amount otherwise.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub account: String,
    pub target: Option<String>,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to an Operation
///
/// Only the shape of the row is checked here (known type, parseable amount,
/// target present for transfers). Business validation such as positive
/// amounts or distinct transfer accounts belongs to the engine, so a negative
/// amount still converts and is rejected later with `InvalidRequest`.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Operation, String> {
    let op_type = OperationType::from_str(&csv_record.op_type)
        .map_err(|e| format!("{} for account {}", e, csv_record.account))?;

    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            Decimal::from_str(amount_str.trim()).map_err(|_| {
                format!(
                    "Invalid amount '{}' for {} on account {}",
                    amount_str,
                    op_type.as_str(),
                    csv_record.account
                )
            })?
        }
        _ => {
            return Err(format!(
                "{} on account {} requires an amount",
                op_type.as_str(),
                csv_record.account
            ))
        }
    };

    let account = csv_record.account;
    let operation = match op_type {
        OperationType::Open => Operation::Open {
            account,
            initial_balance: amount,
        },
        OperationType::Deposit => Operation::Deposit { account, amount },
        OperationType::Withdraw => Operation::Withdraw { account, amount },
        OperationType::Transfer => {
            let target = csv_record
                .target
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| format!("transfer from account {} requires a target", account))?;
            Operation::Transfer {
                source: account,
                target,
                amount,
            }
        }
    };

    Ok(operation)
}

/// Write account states to CSV format
///
/// Writes accounts with columns: account, balance. Accounts are sorted by
/// account number for deterministic output. Balances are printed exactly,
/// keeping the scale they were computed with.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.account_number().cmp(b.account_number()));

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.account_number().to_string(),
                account.balance().to_string(),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
