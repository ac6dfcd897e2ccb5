// sluice-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Unsupported database type: '{0}'")]
    #[diagnostic(
        code(sluice::domain::unsupported_engine),
        help("Supported engine tags: mysql, sqlserver, oracle, teradata, duckdb.")
    )]
    UnsupportedEngine(String),

    #[error("Invalid connection profile: {0}")]
    #[diagnostic(code(sluice::domain::profile))]
    InvalidProfile(String),
}
