// sluice/src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug sluice export ... to see every statement and timing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        // --- USE CASE: QUERY -> CSV ---
        Commands::Export {
            target,
            query,
            output,
            header,
        } => {
            if let Err(e) = commands::export::execute(cli.config, target, query, output, header).await {
                eprintln!("❌ Export failed: {:#}", e);
                std::process::exit(1);
            }
        }

        // --- USE CASE: CSV DIFF ---
        Commands::Compare { file1, file2 } => match commands::compare::execute(file1, file2) {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("❌ Compare failed: {:#}", e);
                std::process::exit(2);
            }
        },

        // --- USE CASE: BI SESSION ---
        Commands::Bi { server, action } => {
            if let Err(e) = commands::bi::execute(cli.config, server, action).await {
                eprintln!("❌ BI request failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
