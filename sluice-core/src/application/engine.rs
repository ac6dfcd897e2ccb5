// sluice-core/src/application/engine.rs

use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::domain::value::QueryResult;
use crate::error::SluiceError;
use crate::ports::connector::Connector;

/// Runs a raw SQL query with instrumentation (logs + timing).
#[instrument(skip(connector, query), fields(engine = connector.engine_name(), query.len = query.len()))]
pub async fn execute_query(
    connector: &dyn Connector,
    query: &str,
) -> Result<QueryResult, SluiceError> {
    let start = Instant::now();
    debug!("Executing query: {}", query);

    let result = connector.query(query).await;
    let duration = start.elapsed();

    match result {
        Ok(data) => {
            debug!(rows = data.row_count(), "Query finished in {:.2?}", duration);
            Ok(data)
        }
        Err(e) => {
            error!("Error executing query after {:.2?}: {}", duration, e);
            Err(e)
        }
    }
}
