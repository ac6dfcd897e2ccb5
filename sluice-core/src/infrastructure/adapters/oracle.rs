// sluice-core/src/infrastructure/adapters/oracle.rs

use async_trait::async_trait;
use oracle::Connection;
use std::sync::Mutex;

use crate::domain::profile::{ConnectionProfile, EngineKind};
use crate::domain::value::{QueryResult, Value};
use crate::error::SluiceError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::Connector;

/// Blocking OCI connection behind a lock, like the embedded adapter.
pub struct OracleConnector {
    conn: Mutex<Option<Connection>>,
}

impl OracleConnector {
    pub fn connect(profile: &ConnectionProfile) -> Result<Self, SluiceError> {
        let conn = Connection::connect(
            profile.username(),
            profile.password(),
            profile.oracle_connect_string(),
        )
        .map_err(|e| SluiceError::connection(EngineKind::Oracle, e))?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

fn poisoned() -> SluiceError {
    SluiceError::Query(InfrastructureError::Database(DatabaseError::Poisoned))
}

#[async_trait]
impl Connector for OracleConnector {
    async fn query(&self, query: &str) -> Result<QueryResult, SluiceError> {
        let guard = self.conn.lock().map_err(|_| poisoned())?;
        let conn = guard.as_ref().ok_or(SluiceError::NotConnected)?;

        let rows = conn.query(query, &[]).map_err(SluiceError::query)?;
        let columns: Vec<String> = rows
            .column_info()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut result = QueryResult::new(columns, Vec::new());
        for row in rows {
            let row = row.map_err(SluiceError::query)?;
            let mut values = Vec::with_capacity(result.columns.len());
            for idx in 0..result.columns.len() {
                // Every Oracle type has a text conversion; NULL maps to None.
                let cell: Option<String> = row.get(idx).map_err(SluiceError::query)?;
                values.push(Value::from(cell));
            }
            result.rows.push(values);
        }

        Ok(result)
    }

    async fn close(&self) -> Result<(), SluiceError> {
        let mut guard = self.conn.lock().map_err(|_| poisoned())?;
        match guard.take() {
            Some(conn) => conn.close().map_err(SluiceError::query),
            None => Ok(()),
        }
    }

    fn engine_name(&self) -> &str {
        "oracle"
    }
}
