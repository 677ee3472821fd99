use anyhow::Result;
use clap::Parser;
use muse_career::app_log;
use muse_career::cli::{handle_command, Cli};
use muse_career::logging::init_tracing;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    let log_file = std::env::var_os("MUSECAREER_LOG_FILE").map(PathBuf::from);
    init_tracing(log_file.as_deref())?;

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli).await {
        app_log!(error, "{:#}", e);
        return Err(e);
    }

    Ok(())
}
