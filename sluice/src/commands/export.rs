// sluice/src/commands/export.rs
//
// USE CASE: run one query against a relational engine and dump it to CSV.

use anyhow::{Context, bail};
use std::path::{Path, PathBuf};

use sluice_core::SluiceError;
use sluice_core::application::DataExporter;
use sluice_core::domain::ConnectionProfile;
use sluice_core::infrastructure::config::load_config;

use crate::cli::DbTarget;

pub async fn execute(
    config: Option<PathBuf>,
    target: DbTarget,
    query: String,
    output: PathBuf,
    header: bool,
) -> anyhow::Result<()> {
    let profile = resolve_profile(config.as_deref(), target)?;
    println!("🔌 Connecting to {} ...", profile.engine());

    let mut exporter = DataExporter::new(profile);
    exporter.connect().await?;

    let outcome = run(&mut exporter, &query, &output, header).await;
    // The connection is released whatever happened to the query.
    let closed = exporter.close_connection().await;

    let rows = settle(outcome, closed)?;
    println!("✨ {} rows written to '{}'", rows, output.display());
    Ok(())
}

async fn run(
    exporter: &mut DataExporter,
    query: &str,
    output: &Path,
    header: bool,
) -> anyhow::Result<usize> {
    let data = exporter.execute_query(query).await?;
    if header {
        exporter.save_to_csv_with_header(&data, output)?;
    } else {
        exporter.save_to_csv(&data, output)?;
    }
    Ok(exporter.get_query_count().unwrap_or_default())
}

/// The export outcome wins: a failed close only warns, so it never hides the
/// query or save error.
fn settle(outcome: anyhow::Result<usize>, closed: Result<(), SluiceError>) -> anyhow::Result<usize> {
    if let Err(e) = closed {
        eprintln!("⚠️  Closing the connection failed: {}", e);
    }
    outcome
}

/// Named profile from the config file, or a profile built from inline flags.
fn resolve_profile(
    config: Option<&Path>,
    target: DbTarget,
) -> anyhow::Result<ConnectionProfile> {
    if let Some(name) = target.profile {
        let cwd = std::env::current_dir().context("Cannot resolve current directory")?;
        let config = load_config(config, &cwd)?;
        return Ok(config.connection(&name)?.clone());
    }

    let Some(tag) = target.engine else {
        bail!("Either --profile or --engine is required");
    };
    let profile = ConnectionProfile::from_tag(
        &tag,
        target.host,
        target.port,
        target.username,
        target.password,
        target.database,
    )?;
    Ok(profile)
}
