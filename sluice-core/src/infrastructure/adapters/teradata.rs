// sluice-core/src/infrastructure/adapters/teradata.rs
//
// Teradata through the ODBC driver manager. The environment is process-wide
// and created once.

use async_trait::async_trait;
use odbc_api::buffers::TextRowSet;
use odbc_api::{Connection, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use std::sync::{Mutex, OnceLock};

use crate::domain::profile::{ConnectionProfile, EngineKind};
use crate::domain::value::{QueryResult, Value};
use crate::error::SluiceError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::Connector;

const BATCH_SIZE: usize = 1000;
const MAX_STR_LEN: usize = 4096;

static ODBC_ENV: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment, odbc_api::Error> {
    if let Some(env) = ODBC_ENV.get() {
        return Ok(env);
    }
    let env = Environment::new()?;
    Ok(ODBC_ENV.get_or_init(|| env))
}

pub struct TeradataConnector {
    conn: Mutex<Option<Connection<'static>>>,
}

impl TeradataConnector {
    pub fn connect(profile: &ConnectionProfile) -> Result<Self, SluiceError> {
        let fail = |e: odbc_api::Error| SluiceError::connection(EngineKind::Teradata, e);
        let env = environment().map_err(fail)?;
        let conn = env
            .connect_with_connection_string(
                &profile.teradata_connection_string(),
                ConnectionOptions::default(),
            )
            .map_err(fail)?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

fn poisoned() -> SluiceError {
    SluiceError::Query(InfrastructureError::Database(DatabaseError::Poisoned))
}

#[async_trait]
impl Connector for TeradataConnector {
    async fn query(&self, query: &str) -> Result<QueryResult, SluiceError> {
        let guard = self.conn.lock().map_err(|_| poisoned())?;
        let conn = guard.as_ref().ok_or(SluiceError::NotConnected)?;

        let Some(mut cursor) = conn.execute(query, ()).map_err(SluiceError::query)? else {
            // Statement produced no result set.
            return Ok(QueryResult::default());
        };

        let columns = cursor
            .column_names()
            .map_err(SluiceError::query)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(SluiceError::query)?;

        let buffer = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_STR_LEN))
            .map_err(SluiceError::query)?;
        let mut row_set = cursor.bind_buffer(buffer).map_err(SluiceError::query)?;

        let mut result = QueryResult::new(columns, Vec::new());
        while let Some(batch) = row_set.fetch().map_err(SluiceError::query)? {
            for row in 0..batch.num_rows() {
                let values = (0..batch.num_cols())
                    .map(|col| match batch.at(col, row) {
                        Some(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
                        None => Value::Null,
                    })
                    .collect();
                result.rows.push(values);
            }
        }

        Ok(result)
    }

    async fn close(&self) -> Result<(), SluiceError> {
        let mut guard = self.conn.lock().map_err(|_| poisoned())?;
        // Dropping the handle disconnects.
        guard.take();
        Ok(())
    }

    fn engine_name(&self) -> &str {
        "teradata"
    }
}
