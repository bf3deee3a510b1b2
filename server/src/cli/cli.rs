// server/src/cli/cli.rs

// CLI entry point for dental-cli.

use anyhow::Result;
use clap::Parser;
use log::debug;
use std::process::exit;

use crate::cli::commands::CliArgs;
use crate::cli::config::{load_cli_config, load_roles_config};
use crate::cli::handlers::{describe_error, run_command, CliContext};
use lib::storage_engine::StorageEngine;

/// Parses the arguments, runs one command and prints its output.
///
/// Failures are printed and turned into a non-zero exit.
pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    let config = load_cli_config(&args)?;
    let roles = load_roles_config(&args)?;
    debug!("Running {:?}", args.command);

    let ctx = CliContext::open(config, roles)?;
    let now = chrono::Local::now().naive_local();
    match run_command(&ctx, args.command, now).await {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", describe_error(&e));
            // Writes made before the failure still reach disk.
            ctx.store.engine().flush().await?;
            drop(ctx);
            exit(1);
        }
    }
}
