// sluice-core/src/ports/connector.rs

// What the exporter needs from a database, without knowing which vendor
// driver sits behind it. One adapter per engine implements this.

use crate::domain::value::QueryResult;
use crate::error::SluiceError;
use async_trait::async_trait;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Runs `query` verbatim and buffers the entire result set.
    async fn query(&self, query: &str) -> Result<QueryResult, SluiceError>;

    /// Releases the underlying connection. Later calls fail with `NotConnected`.
    async fn close(&self) -> Result<(), SluiceError>;

    fn engine_name(&self) -> &str;
}
