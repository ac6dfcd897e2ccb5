// sluice-core/src/error.rs

use std::path::PathBuf;

use crate::domain::error::DomainError;
use crate::domain::profile::EngineKind;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SluiceError {
    // --- DOMAIN ERRORS (unsupported engine, invalid profile) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, HTTP) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- RELATIONAL EXPORTER ---
    #[error("Engine '{0}' is not available in this build (enable the '{0}' feature)")]
    EngineUnavailable(EngineKind),

    #[error("Failed to connect to {engine}: {source}")]
    Connection {
        engine: EngineKind,
        #[source]
        source: InfrastructureError,
    },

    #[error("No active database connection")]
    NotConnected,

    #[error("Query failed: {0}")]
    Query(#[source] InfrastructureError),

    // --- FILES ---
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: InfrastructureError,
    },

    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: InfrastructureError,
    },

    // --- BI SESSION ---
    #[error("Authentication failed (HTTP {status})")]
    AuthFailed { status: u16 },

    #[error("Request to {url} failed (HTTP {status})")]
    RequestFailed { status: u16, url: String },

    #[error("Not logged in: no session token")]
    NotLoggedIn,

    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),
}

impl SluiceError {
    /// Wrap a driver-level failure raised while running a statement.
    pub fn query(err: impl Into<InfrastructureError>) -> Self {
        SluiceError::Query(err.into())
    }

    pub fn connection(engine: EngineKind, err: impl Into<InfrastructureError>) -> Self {
        SluiceError::Connection {
            engine,
            source: err.into(),
        }
    }
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for SluiceError {
    fn from(err: std::io::Error) -> Self {
        SluiceError::Infrastructure(InfrastructureError::Io(err))
    }
}
