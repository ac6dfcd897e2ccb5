// sluice-core/src/application/exporter.rs
//
// USE CASE: connect to one relational engine, run a query, dump the rows to a
// delimited file.

use std::path::Path;
use tracing::{error, info, instrument};

use crate::application::engine::execute_query;
use crate::domain::profile::ConnectionProfile;
use crate::domain::value::QueryResult;
use crate::error::SluiceError;
use crate::infrastructure::adapters::open_connector;
use crate::infrastructure::delimited::write_records;
use crate::ports::connector::Connector;

/// One exporter per connection attempt. Single-owner: every call takes
/// `&mut self` or `&self` and completes before returning.
pub struct DataExporter {
    profile: ConnectionProfile,
    connector: Option<Box<dyn Connector>>,
    query_count: Option<usize>,
}

impl DataExporter {
    pub fn new(profile: ConnectionProfile) -> Self {
        Self {
            profile,
            connector: None,
            query_count: None,
        }
    }

    /// Exporter over an already-open backend.
    pub fn with_connector(profile: ConnectionProfile, connector: Box<dyn Connector>) -> Self {
        Self {
            profile,
            connector: Some(connector),
            query_count: None,
        }
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    pub fn is_connected(&self) -> bool {
        self.connector.is_some()
    }

    /// Opens the backend for the profile's engine. On failure the exporter
    /// stays disconnected.
    #[instrument(skip(self), fields(engine = %self.profile.engine()))]
    pub async fn connect(&mut self) -> Result<(), SluiceError> {
        match open_connector(&self.profile).await {
            Ok(connector) => {
                info!("Connected");
                self.connector = Some(connector);
                Ok(())
            }
            Err(e) => {
                error!("Error connecting to the database: {}", e);
                self.connector = None;
                Err(e)
            }
        }
    }

    /// Runs `query` verbatim and buffers every row. The row count is only
    /// kept when this call succeeds.
    pub async fn execute_query(&mut self, query: &str) -> Result<QueryResult, SluiceError> {
        self.query_count = None;
        let Some(connector) = self.connector.as_deref() else {
            error!("Error executing query: {}", SluiceError::NotConnected);
            return Err(SluiceError::NotConnected);
        };

        let data = execute_query(connector, query).await?;
        self.query_count = Some(data.row_count());
        Ok(data)
    }

    /// Row count of the most recent successful `execute_query`.
    pub fn get_query_count(&self) -> Option<usize> {
        self.query_count
    }

    /// One record per row, no header, existing file replaced.
    #[instrument(skip(self, data, path), fields(path = %path.as_ref().display(), rows = data.row_count()))]
    pub fn save_to_csv(&self, data: &QueryResult, path: impl AsRef<Path>) -> Result<(), SluiceError> {
        self.write_csv(data, path.as_ref(), false)
    }

    /// Same as `save_to_csv` with the column names as the first record.
    pub fn save_to_csv_with_header(
        &self,
        data: &QueryResult,
        path: impl AsRef<Path>,
    ) -> Result<(), SluiceError> {
        self.write_csv(data, path.as_ref(), true)
    }

    fn write_csv(&self, data: &QueryResult, path: &Path, header: bool) -> Result<(), SluiceError> {
        let mut records = Vec::with_capacity(data.row_count() + usize::from(header));
        if header {
            records.push(data.columns.clone());
        }
        records.extend(data.to_text_rows());

        write_records(path, &records).map_err(|source| {
            error!("Error saving to CSV: {}", source);
            SluiceError::FileWrite {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(path = %path.display(), "Saved {} rows", data.row_count());
        Ok(())
    }

    /// Query then save in one go; returns the row count.
    pub async fn export(&mut self, query: &str, path: impl AsRef<Path>) -> Result<usize, SluiceError> {
        let data = self.execute_query(query).await?;
        self.save_to_csv(&data, path)?;
        Ok(data.row_count())
    }

    /// Closes the connection if there is one.
    pub async fn close_connection(&mut self) -> Result<(), SluiceError> {
        let Some(connector) = self.connector.take() else {
            return Ok(());
        };
        connector.close().await.map_err(|e| {
            error!("Error closing connection: {}", e);
            e
        })
    }
}
