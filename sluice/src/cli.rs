// sluice/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "Relational exports, BI artifact downloads and CSV diffs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./sluice.yaml or ./sluice.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📤 Runs a query and writes every row to a CSV file
    Export {
        #[command(flatten)]
        target: DbTarget,

        /// SQL text, executed verbatim
        #[arg(long, short)]
        query: String,

        /// Output CSV file (overwritten)
        #[arg(long, short, default_value = "output.csv")]
        output: PathBuf,

        /// Write the column names as the first record
        #[arg(long)]
        header: bool,
    },

    /// 🔀 Compares two CSV files cell by cell
    Compare { file1: PathBuf, file2: PathBuf },

    /// 📊 Talks to a Tableau server
    Bi {
        #[command(flatten)]
        server: BiServer,

        #[command(subcommand)]
        action: BiAction,
    },
}

/// Either a named profile from the config file or inline connection flags.
#[derive(Args, Debug)]
pub struct DbTarget {
    /// Connection profile name from the config file
    #[arg(long, short, conflicts_with = "engine")]
    pub profile: Option<String>,

    /// Engine tag: mysql | sqlserver | oracle | teradata | duckdb
    #[arg(long, short)]
    pub engine: Option<String>,

    #[arg(long, default_value = "localhost")]
    pub host: String,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long, short, default_value = "")]
    pub username: String,

    #[arg(long, env = "SLUICE_DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Database / schema (file path for duckdb)
    #[arg(long, short)]
    pub database: Option<String>,
}

#[derive(Args, Debug)]
pub struct BiServer {
    /// Server base URL, e.g. https://tableau.example.com
    #[arg(long)]
    pub server: Option<String>,

    #[arg(long, short)]
    pub username: Option<String>,

    #[arg(long, env = "SLUICE_BI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum BiAction {
    /// Lists projects of the signed-in site
    Projects,

    /// Looks up a project id by exact name
    Project { name: String },

    /// Lists workbooks of the signed-in site
    Workbooks,

    /// Lists views of a workbook
    Views {
        #[arg(long)]
        workbook_id: String,
    },

    /// Downloads a view as <out>.png
    Image {
        #[arg(long)]
        view_id: String,
        #[arg(long, default_value = "view_image")]
        out: PathBuf,
    },

    /// Downloads a view's data as <out>.csv
    Dataset {
        #[arg(long)]
        view_id: String,
        #[arg(long, default_value = "view_dataset")]
        out: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_export_inline() -> Result<()> {
        let args = Cli::try_parse_from([
            "sluice", "export", "--engine", "mysql", "--host", "db", "--port", "3307", "-u",
            "reporter", "-d", "sales", "-q", "SELECT 1",
        ])?;
        match args.command {
            Commands::Export {
                target,
                query,
                output,
                header,
            } => {
                assert_eq!(target.engine.as_deref(), Some("mysql"));
                assert_eq!(target.port, Some(3307));
                assert_eq!(target.database.as_deref(), Some("sales"));
                assert_eq!(query, "SELECT 1");
                assert_eq!(output.to_string_lossy(), "output.csv");
                assert!(!header);
                Ok(())
            }
            _ => bail!("Expected Export command"),
        }
    }

    #[test]
    fn test_cli_profile_conflicts_with_engine() {
        let args = Cli::try_parse_from([
            "sluice", "export", "--profile", "wh", "--engine", "mysql", "-q", "SELECT 1",
        ]);
        assert!(args.is_err());
    }

    #[test]
    fn test_cli_parse_compare() -> Result<()> {
        let args = Cli::try_parse_from(["sluice", "compare", "a.csv", "b.csv"])?;
        match args.command {
            Commands::Compare { file1, file2 } => {
                assert_eq!(file1.to_string_lossy(), "a.csv");
                assert_eq!(file2.to_string_lossy(), "b.csv");
                Ok(())
            }
            _ => bail!("Expected Compare command"),
        }
    }

    #[test]
    fn test_cli_parse_bi_image() -> Result<()> {
        let args = Cli::try_parse_from([
            "sluice",
            "--config",
            "conf.yaml",
            "bi",
            "--server",
            "https://bi.example.com",
            "image",
            "--view-id",
            "v-1",
        ])?;
        assert_eq!(
            args.config.map(|p| p.to_string_lossy().into_owned()),
            Some("conf.yaml".to_string())
        );
        match args.command {
            Commands::Bi { server, action } => {
                assert_eq!(server.server.as_deref(), Some("https://bi.example.com"));
                match action {
                    BiAction::Image { view_id, out } => {
                        assert_eq!(view_id, "v-1");
                        assert_eq!(out.to_string_lossy(), "view_image");
                        Ok(())
                    }
                    other => bail!("Expected Image action, got {:?}", other),
                }
            }
            _ => bail!("Expected Bi command"),
        }
    }
}
