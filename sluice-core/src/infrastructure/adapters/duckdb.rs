// sluice-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::{Config, Connection};
use std::sync::Mutex;

use crate::domain::value::{QueryResult, Value};
use crate::error::SluiceError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::Connector;

pub struct DuckDBConnector {
    conn: Mutex<Option<Connection>>,
}

impl DuckDBConnector {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Runs statements that return no rows (DDL, inserts).
    pub fn execute_batch(&self, sql: &str) -> Result<(), SluiceError> {
        let guard = self.conn.lock().map_err(|_| poisoned())?;
        let conn = guard.as_ref().ok_or(SluiceError::NotConnected)?;
        conn.execute_batch(sql).map_err(SluiceError::query)
    }
}

fn poisoned() -> SluiceError {
    SluiceError::Query(InfrastructureError::Database(DatabaseError::Poisoned))
}

const NANOS_PER_SEC: i64 = 1_000_000_000;

fn date_text(days: i32) -> String {
    // 1970-01-01 is day 719_163 counted from 0001-01-01.
    days.checked_add(719_163)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|d| d.to_string())
        .unwrap_or_else(|| days.to_string())
}

fn timestamp_text(unit: TimeUnit, value: i64) -> String {
    DateTime::from_timestamp_micros(unit.to_micros(value))
        .map(|ts| ts.naive_utc().to_string())
        .unwrap_or_else(|| value.to_string())
}

fn time_text(unit: TimeUnit, value: i64) -> String {
    let nanos = match unit {
        TimeUnit::Nanosecond => Some(value),
        other => other.to_micros(value).checked_mul(1_000),
    };
    nanos
        .and_then(|n| {
            let secs = u32::try_from(n.div_euclid(NANOS_PER_SEC)).ok()?;
            let frac = u32::try_from(n.rem_euclid(NANOS_PER_SEC)).ok()?;
            NaiveTime::from_num_seconds_from_midnight_opt(secs, frac)
        })
        .map(|t| t.to_string())
        .unwrap_or_else(|| value.to_string())
}

fn interval_text(months: i32, days: i32, nanos: i64) -> String {
    let micros = nanos / 1_000;
    let sign = if micros < 0 { "-" } else { "" };
    let micros = micros.unsigned_abs();
    let secs = micros / 1_000_000;
    let mut clock = format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    );
    if micros % 1_000_000 != 0 {
        clock.push_str(&format!(".{:06}", micros % 1_000_000));
    }
    format!("{} months {} days {}", months, days, clock)
}

/// Text of a value nested in a LIST/STRUCT/MAP, where NULL stays visible.
fn nested_text(value: &DuckValue) -> String {
    match value {
        DuckValue::Null => "NULL".to_string(),
        DuckValue::Text(s) | DuckValue::Enum(s) => s.clone(),
        other => convert(other.clone()).to_string(),
    }
}

fn join_nested<'a>(values: impl Iterator<Item = &'a DuckValue>) -> String {
    let items: Vec<String> = values.map(nested_text).collect();
    format!("[{}]", items.join(", "))
}

fn convert(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::Int(i.into()),
        DuckValue::SmallInt(i) => Value::Int(i.into()),
        DuckValue::Int(i) => Value::Int(i.into()),
        DuckValue::BigInt(i) => Value::Int(i),
        DuckValue::UTinyInt(i) => Value::Int(i.into()),
        DuckValue::USmallInt(i) => Value::Int(i.into()),
        DuckValue::UInt(i) => Value::Int(i.into()),
        DuckValue::UBigInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        DuckValue::HugeInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        DuckValue::Float(x) => Value::Float(x.into()),
        DuckValue::Double(x) => Value::Float(x),
        DuckValue::Decimal(d) => Value::Text(d.to_string()),
        DuckValue::Text(s) | DuckValue::Enum(s) => Value::Text(s),
        DuckValue::Blob(b) => Value::Bytes(b),
        DuckValue::Date32(days) => Value::Text(date_text(days)),
        DuckValue::Timestamp(unit, n) => Value::Text(timestamp_text(unit, n)),
        DuckValue::Time64(unit, n) => Value::Text(time_text(unit, n)),
        DuckValue::Interval {
            months,
            days,
            nanos,
        } => Value::Text(interval_text(months, days, nanos)),
        DuckValue::List(items) | DuckValue::Array(items) => {
            Value::Text(join_nested(items.iter()))
        }
        DuckValue::Struct(fields) => {
            let items: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("'{}': {}", k, nested_text(v)))
                .collect();
            Value::Text(format!("{{{}}}", items.join(", ")))
        }
        DuckValue::Map(entries) => {
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}={}", nested_text(k), nested_text(v)))
                .collect();
            Value::Text(format!("{{{}}}", items.join(", ")))
        }
        DuckValue::Union(inner) => convert(*inner),
    }
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn query(&self, query: &str) -> Result<QueryResult, SluiceError> {
        let guard = self.conn.lock().map_err(|_| poisoned())?;
        let conn = guard.as_ref().ok_or(SluiceError::NotConnected)?;

        let mut stmt = conn.prepare(query).map_err(SluiceError::query)?;
        let mut rows = stmt.query([]).map_err(SluiceError::query)?;

        // Column metadata only exists once the statement has run.
        let columns = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut result = QueryResult::new(columns, Vec::new());
        while let Some(row) = rows.next().map_err(SluiceError::query)? {
            let mut values = Vec::with_capacity(result.columns.len());
            for idx in 0..result.columns.len() {
                let value: DuckValue = row.get(idx).map_err(SluiceError::query)?;
                values.push(convert(value));
            }
            result.rows.push(values);
        }

        Ok(result)
    }

    async fn close(&self) -> Result<(), SluiceError> {
        let mut guard = self.conn.lock().map_err(|_| poisoned())?;
        match guard.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_conn, e)| SluiceError::query(e)),
            None => Ok(()),
        }
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn test_duckdb_query_flow() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;

        connector.execute_batch(
            "CREATE TABLE users (id INTEGER, name VARCHAR, active BOOLEAN);
             INSERT INTO users VALUES (1, 'alice', true), (2, NULL, false);",
        )?;

        let result = connector
            .query("SELECT id, name, active FROM users ORDER BY id")
            .await?;
        assert_eq!(result.columns, vec!["id", "name", "active"]);
        assert_eq!(
            result.rows,
            vec![
                vec![Value::Int(1), Value::from("alice"), Value::Bool(true)],
                vec![Value::Int(2), Value::Null, Value::Bool(false)],
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_decimal_and_temporal_values_as_text() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        let result = connector
            .query(
                "SELECT 1.5 AS dec, -0.25 AS neg, DATE '2024-01-02' AS d, \
                 TIMESTAMP '2024-01-02 03:04:05' AS ts, TIMESTAMP '2024-01-02 03:04:05.25' AS ts_frac, \
                 TIME '03:04:05' AS t, DATE '1969-12-31' AS before_epoch",
            )
            .await?;

        assert_eq!(
            result.to_text_rows(),
            vec![vec![
                "1.5",
                "-0.25",
                "2024-01-02",
                "2024-01-02 03:04:05",
                "2024-01-02 03:04:05.250",
                "03:04:05",
                "1969-12-31",
            ]]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_nested_values_as_text() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        let result = connector
            .query("SELECT [1, NULL, 3] AS l, {'a': 1, 'b': 'x'} AS s, INTERVAL 90 MINUTE AS i")
            .await?;

        assert_eq!(
            result.to_text_rows(),
            vec![vec![
                "[1, NULL, 3]",
                "{'a': 1, 'b': x}",
                "0 months 0 days 01:30:00",
            ]]
        );
        Ok(())
    }

    #[test]
    fn test_interval_and_time_units() {
        assert_eq!(interval_text(14, 3, -1_500_000_000), "14 months 3 days -00:00:01.500000");
        assert_eq!(time_text(TimeUnit::Nanosecond, 3_600_000_000_123), "01:00:00.000000123");
        assert_eq!(timestamp_text(TimeUnit::Second, 0), "1970-01-01 00:00:00");
    }

    #[tokio::test]
    async fn test_duckdb_error() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        let result = connector.query("SELECT * FROM non_existent_table").await;
        assert!(matches!(result, Err(SluiceError::Query(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_query_after_close_is_not_connected() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        connector.close().await?;
        connector.close().await?;

        let result = connector.query("SELECT 1").await;
        assert!(matches!(result, Err(SluiceError::NotConnected)));
        Ok(())
    }
}
