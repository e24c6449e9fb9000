//! Balance Engine CLI
//!
//! Applies balance operations from a CSV file and prints the final balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --strategy sync operations.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > balances.csv
//! RUST_LOG=debug cargo run -- operations.csv > balances.csv
//! ```
//!
//! # Processing Strategies
//!
//! - **sync**: rows applied one at a time in file order
//! - **async**: batches applied concurrently on a tokio runtime (default)
//!
//! # Exit Codes
//!
//! - 0: Success (rejected operations are logged, not fatal)
//! - 1: Error (file not found, file not readable, output failure)

use balance_engine::cli;
use balance_engine::logging;
use balance_engine::strategy;
use std::process;

fn main() {
    let args = cli::parse_args();
    logging::init_logging(&args.log_level);

    let strategy = {
        let config = if args.strategy == cli::StrategyType::Async {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
