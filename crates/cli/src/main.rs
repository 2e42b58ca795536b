//! # vendorsum: Inventory Ingestion and Vendor Summary CLI
//!
//! This is the main entry point for the `vendorsum` command-line interface.
//! All logic is delegated to the `vendorsum_cli` library crate.

use anyhow::Result;
use clap::Parser;
use vendorsum_cli::{init_logging, resolve_config, run, Cli};

// --- Main Application Entry ---

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Parse CLI arguments and resolve the configuration
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    // 2. Setup logging to the command's log file
    init_logging(&config.log_dir, cli.command.log_file_name())?;

    // 3. Call the library's run function and handle the final result
    if let Err(e) = run(cli, config).await {
        eprintln!("[vendorsum error] Failed to execute command: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
