use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Apply account openings, deposits, withdrawals and transfers from a CSV file
#[derive(Parser, Debug)]
#[command(name = "balance-engine")]
#[command(about = "Apply balance operations from a CSV file and print final balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' applies rows in file order, 'async' applies batches concurrently"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of operations in flight (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Worker threads and operations in flight (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Retries for operations that hit a busy account lock (async mode only)
    #[arg(
        long = "max-retries",
        value_name = "COUNT",
        help = "Retries for an operation that finds an account busy (default: 1000)"
    )]
    pub max_retries: Option<usize>,

    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log level for stderr output, overridden by RUST_LOG"
    )]
    pub log_level: String,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to `BatchConfig::default()`. Zero values are
    /// replaced with a warning by `BatchConfig::new`.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none()
            && self.max_concurrent_batches.is_none()
            && self.max_retries.is_none()
        {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_batches
                .unwrap_or(default.max_concurrent_batches),
            self.max_retries.unwrap_or(default.max_conflict_retries),
        )
    }
}
