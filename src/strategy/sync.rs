//! Synchronous processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. It streams rows with `SyncReader`, applies each
//! one in file order through a `BalanceEngine`, and writes the final balances
//! with `csv_format::write_accounts_csv`.
//!
//! Because rows are applied strictly in order and nothing else touches the
//! engine, no operation can hit lock contention here.

use crate::core::{BalanceEngine, InMemoryAccountStore};
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{report_rejection, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use balance_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let engine = BalanceEngine::new(Arc::new(InMemoryAccountStore::new()));
        let reader = SyncReader::new(input_path)?;

        let mut applied = 0usize;
        let mut rejected = 0usize;
        for result in reader {
            match result {
                Ok(operation) => match engine.apply(&operation) {
                    Ok(_) => applied += 1,
                    Err(e) => {
                        rejected += 1;
                        report_rejection(&operation, &e);
                    }
                },
                Err(e) => warn!(error = %e, "skipping operation record"),
            }
        }
        info!(applied, rejected, "operations processed");

        let accounts = engine
            .list_accounts()
            .map_err(|e| format!("Failed to list accounts: {}", e))?;
        write_accounts_csv(&accounts, output)?;

        Ok(())
    }
}
