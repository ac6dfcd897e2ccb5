// sluice-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(sluice::infra::database::duckdb),
        help("An error occurred inside the embedded SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[cfg(feature = "mysql")]
    #[error("MySQL Error: {0}")]
    #[diagnostic(
        code(sluice::infra::database::mysql),
        help("Check host, port and credentials of the MySQL server.")
    )]
    MySql(#[from] mysql_async::Error),

    #[cfg(feature = "sqlserver")]
    #[error("SQL Server Error: {0}")]
    #[diagnostic(
        code(sluice::infra::database::sqlserver),
        help("Check that SQL authentication is enabled and the TCP port is reachable.")
    )]
    SqlServer(#[from] tiberius::error::Error),

    #[cfg(feature = "oracle")]
    #[error("Oracle Error: {0}")]
    #[diagnostic(
        code(sluice::infra::database::oracle),
        help("The Oracle client libraries (OCI) must be installed.")
    )]
    Oracle(#[from] oracle::Error),

    #[cfg(feature = "teradata")]
    #[error("ODBC Error: {0}")]
    #[diagnostic(
        code(sluice::infra::database::odbc),
        help("The Teradata ODBC driver must be registered with the driver manager.")
    )]
    Odbc(#[from] odbc_api::Error),

    #[error("Connection lock poisoned")]
    #[diagnostic(code(sluice::infra::database::poisoned))]
    Poisoned,
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(sluice::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- DELIMITED FILES ---
    #[error("CSV Error: {0}")]
    #[diagnostic(code(sluice::infra::csv))]
    Csv(#[from] csv::Error),

    // --- HTTP ---
    #[error("HTTP Error: {0}")]
    #[diagnostic(
        code(sluice::infra::http),
        help("Check the server URL and network connectivity.")
    )]
    Http(#[from] reqwest::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(sluice::infra::json))]
    Json(#[from] serde_json::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(sluice::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Configuration not found at '{0}'")]
    #[diagnostic(code(sluice::infra::config_missing))]
    ConfigNotFound(String),
}

// Manual implementations for shortcuts (e.g. `?` on driver calls)
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

#[cfg(feature = "mysql")]
impl From<mysql_async::Error> for InfrastructureError {
    fn from(err: mysql_async::Error) -> Self {
        InfrastructureError::Database(DatabaseError::MySql(err))
    }
}

#[cfg(feature = "sqlserver")]
impl From<tiberius::error::Error> for InfrastructureError {
    fn from(err: tiberius::error::Error) -> Self {
        InfrastructureError::Database(DatabaseError::SqlServer(err))
    }
}

#[cfg(feature = "oracle")]
impl From<oracle::Error> for InfrastructureError {
    fn from(err: oracle::Error) -> Self {
        InfrastructureError::Database(DatabaseError::Oracle(err))
    }
}

#[cfg(feature = "teradata")]
impl From<odbc_api::Error> for InfrastructureError {
    fn from(err: odbc_api::Error) -> Self {
        InfrastructureError::Database(DatabaseError::Odbc(err))
    }
}
