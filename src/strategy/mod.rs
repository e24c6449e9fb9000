//! Processing strategy module for operation files
//!
//! This module defines the Strategy pattern for complete processing pipelines,
//! encompassing both CSV parsing and engine application. This allows different
//! implementations (sequential, concurrent batch) to be selected at runtime.

use crate::cli::StrategyType;
use crate::types::{BalanceError, ErrorKind, Operation};
use std::io::Write;
use std::path::Path;
use tracing::{error, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete operation pipelines
///
/// Each strategy reads operations from a CSV file, applies them to a fresh
/// in-memory engine, and writes the final account balances to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from input file and write balances to output
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be opened, the runtime cannot be
    /// started, or the output cannot be written. Rejected operations are
    /// logged and processing continues with the next one.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is ignored for the sync strategy.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}

/// Log a rejected operation
///
/// `Fatal` outcomes are logged at error level since they signal a ledger that
/// may need manual repair; everything else is a warning.
pub(crate) fn report_rejection(operation: &Operation, err: &BalanceError) {
    let op = operation.operation_type().as_str();
    let account = operation.account();
    if err.kind() == ErrorKind::Fatal {
        error!(operation = op, account, kind = %err.kind(), error = %err, "operation failed");
    } else {
        warn!(operation = op, account, kind = %err.kind(), error = %err, "operation rejected");
    }
}
