//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Operations are read in batches and each batch is
//! applied concurrently against one shared `BalanceEngine`.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches, max_conflict_retries)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BalanceEngine (shared through clones)
//!         ├── InMemoryAccountStore (DashMap-backed accounts)
//!         └── LockRegistry (one try-lock per account)
//! ```
//!
//! # Ordering
//!
//! - Batches run one after another, so a batch only starts once every
//!   operation of the previous batch has finished.
//! - Inside a batch, `open` rows run first in file order. The remaining rows
//!   then run on blocking worker threads, at most `max_concurrent_batches` at
//!   a time, in no particular order.
//! - A row that loses a lock race is retried up to `max_conflict_retries`
//!   times before it is reported as a conflict.
//!
//! Within a batch the final balances are therefore order independent only
//! when no row depends on another row's effect (for example a withdrawal
//! that is covered only by an earlier deposit in the same batch).

use crate::core::{BalanceEngine, InMemoryAccountStore};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::{report_rejection, ProcessingStrategy};
use crate::types::{Operation, OperationType};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Worker threads, and the number of operations in flight at once
    pub max_concurrent_batches: usize,
    /// Retries for an operation that hit `TransactionInProgress`
    pub max_conflict_retries: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
            max_conflict_retries: 1000,
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// A zero `batch_size` or `max_concurrent_batches` is replaced by its
    /// default with a warning. Zero retries is valid and means a conflict is
    /// reported on the first failure.
    pub fn new(
        batch_size: usize,
        max_concurrent_batches: usize,
        max_conflict_retries: usize,
    ) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
            max_conflict_retries,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// # Thread Safety
///
/// The strategy itself only holds its configuration. All shared state lives
/// in the `BalanceEngine` created per `process` call, whose clones share one
/// store and one lock registry.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

/// Counters for one processing run
#[derive(Debug, Default, Clone, Copy)]
struct BatchTally {
    applied: usize,
    rejected: usize,
}

impl BatchTally {
    fn merge(&mut self, other: BatchTally) {
        self.applied += other.applied;
        self.rejected += other.rejected;
    }
}

type Engine = BalanceEngine<InMemoryAccountStore>;

impl AsyncProcessingStrategy {
    /// Apply one batch and wait for every operation in it to finish
    async fn process_batch(&self, engine: &Engine, batch: Vec<Operation>) -> BatchTally {
        let mut tally = BatchTally::default();
        let (opens, rest): (Vec<_>, Vec<_>) = batch
            .into_iter()
            .partition(|op| op.operation_type() == OperationType::Open);

        for operation in &opens {
            match engine.apply_with_retry(operation, self.config.max_conflict_retries) {
                Ok(_) => tally.applied += 1,
                Err(e) => {
                    tally.rejected += 1;
                    report_rejection(operation, &e);
                }
            }
        }

        let max_retries = self.config.max_conflict_retries;
        let mut results = stream::iter(rest)
            .map(|operation| {
                let engine = engine.clone();
                tokio::task::spawn_blocking(move || {
                    let result = engine.apply_with_retry(&operation, max_retries);
                    (operation, result)
                })
            })
            .buffer_unordered(self.config.max_concurrent_batches);

        while let Some(joined) = results.next().await {
            match joined {
                Ok((_, Ok(_))) => tally.applied += 1,
                Ok((operation, Err(e))) => {
                    tally.rejected += 1;
                    report_rejection(&operation, &e);
                }
                Err(e) => {
                    tally.rejected += 1;
                    error!(error = %e, "operation task failed");
                }
            }
        }

        tally
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process operations from input file and write balances to output
    ///
    /// 1. Builds a multi-threaded tokio runtime sized by the config
    /// 2. Streams the file through `AsyncReader` in batches
    /// 3. Applies each batch to completion before reading the next one
    /// 4. Writes the final balances in account-number order
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let engine: Engine = BalanceEngine::new(Arc::new(InMemoryAccountStore::new()));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut tally = BatchTally::default();
            let mut batches = 0usize;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }
                batches += 1;
                debug!(batch = batches, size = batch.len(), "processing batch");
                tally.merge(self.process_batch(&engine, batch).await);
            }
            info!(
                batches,
                applied = tally.applied,
                rejected = tally.rejected,
                "operations processed"
            );

            let accounts = engine
                .list_accounts()
                .map_err(|e| format!("Failed to list accounts: {}", e))?;
            write_accounts_csv(&accounts, output)?;

            Ok(())
        })
    }
}
