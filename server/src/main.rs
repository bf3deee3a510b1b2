// server/src/main.rs

// Entry point for dental-cli. Parses arguments and dispatches to the CLI logic.

use anyhow::Result;
use dental_server::cli::start_cli;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity
    env_logger::init();

    start_cli().await
}
