//! Dramaturg CLI binary.
//!
//! Runs the seven-station analysis on a screenplay file and writes the
//! reports to an output directory.

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use cli::{Cli, Commands, analyze};

    // Pick up GEMINI_API_KEY from a local .env file when present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    dramaturg::init_tracing(cli.verbose)
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing: {}", e))?;

    match cli.command {
        Commands::Analyze(args) => analyze(args, cli.config.as_deref()).await?,
    }

    Ok(())
}
