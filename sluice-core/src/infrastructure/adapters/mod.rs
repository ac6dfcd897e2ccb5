// sluice-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "oracle")]
pub mod oracle;
#[cfg(feature = "sqlserver")]
pub mod sqlserver;
#[cfg(feature = "teradata")]
pub mod teradata;

use tracing::{debug, instrument};

use crate::domain::profile::{ConnectionProfile, EngineKind};
use crate::error::SluiceError;
use crate::ports::connector::Connector;

/// Opens the backend matching the profile's engine.
#[instrument(skip_all, fields(engine = %profile.engine(), host = %profile.host()))]
pub async fn open_connector(
    profile: &ConnectionProfile,
) -> Result<Box<dyn Connector>, SluiceError> {
    profile.validate()?;
    let engine = profile.engine();
    debug!(port = ?profile.port(), database = ?profile.database(), "Opening connection");

    match engine {
        EngineKind::DuckDb => {
            let connector = duckdb::DuckDBConnector::new(profile.duckdb_path())
                .map_err(|e| SluiceError::connection(engine, e))?;
            Ok(Box::new(connector))
        }

        #[cfg(feature = "mysql")]
        EngineKind::MySql => Ok(Box::new(mysql::MySqlConnector::connect(profile).await?)),

        #[cfg(feature = "sqlserver")]
        EngineKind::SqlServer => Ok(Box::new(
            sqlserver::SqlServerConnector::connect(profile).await?,
        )),

        #[cfg(feature = "oracle")]
        EngineKind::Oracle => Ok(Box::new(oracle::OracleConnector::connect(profile)?)),

        #[cfg(feature = "teradata")]
        EngineKind::Teradata => Ok(Box::new(teradata::TeradataConnector::connect(profile)?)),

        #[allow(unreachable_patterns)]
        other => Err(SluiceError::EngineUnavailable(other)),
    }
}
