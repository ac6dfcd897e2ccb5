// sluice-core/src/infrastructure/adapters/mysql.rs

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder, Row as MyRow, Value as MyValue};
use tokio::sync::Mutex;

use crate::domain::profile::{ConnectionProfile, EngineKind};
use crate::domain::value::{QueryResult, Value};
use crate::error::SluiceError;
use crate::ports::connector::Connector;

pub struct MySqlConnector {
    conn: Mutex<Option<Conn>>,
}

pub(crate) fn opts_for(profile: &ConnectionProfile) -> OptsBuilder {
    OptsBuilder::default()
        .ip_or_hostname(profile.host())
        .tcp_port(profile.port().unwrap_or(3306))
        .user(Some(profile.username()))
        .pass(Some(profile.password()))
        .db_name(profile.database())
}

impl MySqlConnector {
    pub async fn connect(profile: &ConnectionProfile) -> Result<Self, SluiceError> {
        let conn = Conn::new(opts_for(profile))
            .await
            .map_err(|e| SluiceError::connection(EngineKind::MySql, e))?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

fn convert(value: &MyValue) -> Value {
    match value {
        MyValue::NULL => Value::Null,
        MyValue::Int(i) => Value::Int(*i),
        MyValue::UInt(u) => i64::try_from(*u)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(u.to_string())),
        MyValue::Float(x) => Value::Float((*x).into()),
        MyValue::Double(x) => Value::Float(*x),
        // The text protocol ships everything else as bytes.
        MyValue::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => Value::Bytes(bytes.clone()),
        },
        MyValue::Date(y, m, d, h, mi, s, us) => Value::Text(if *us > 0 {
            format!("{y:04}-{m:02}-{d:02} {h:02}:{mi:02}:{s:02}.{us:06}")
        } else {
            format!("{y:04}-{m:02}-{d:02} {h:02}:{mi:02}:{s:02}")
        }),
        MyValue::Time(neg, days, h, mi, s, _us) => {
            let hours = u32::from(*h) + days * 24;
            let sign = if *neg { "-" } else { "" };
            Value::Text(format!("{sign}{hours:02}:{mi:02}:{s:02}"))
        }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn query(&self, query: &str) -> Result<QueryResult, SluiceError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(SluiceError::NotConnected)?;

        let mut result = conn.query_iter(query).await.map_err(SluiceError::query)?;
        let columns = result
            .columns()
            .map(|cols| cols.iter().map(|c| c.name_str().into_owned()).collect())
            .unwrap_or_default();
        let rows: Vec<MyRow> = result.collect().await.map_err(SluiceError::query)?;

        let rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|idx| row.as_ref(idx).map(convert).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(QueryResult::new(columns, rows))
    }

    async fn close(&self) -> Result<(), SluiceError> {
        let mut guard = self.conn.lock().await;
        match guard.take() {
            Some(conn) => conn.disconnect().await.map_err(SluiceError::query),
            None => Ok(()),
        }
    }

    fn engine_name(&self) -> &str {
        "mysql"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mysql_async::Opts;

    #[test]
    fn test_opts_carry_profile_fields() {
        let profile = ConnectionProfile::new(
            EngineKind::MySql,
            "db.internal",
            None,
            "reporter",
            "pw",
            Some("sales".into()),
        );
        let opts = Opts::from(opts_for(&profile));
        assert_eq!(opts.tcp_port(), 3306);
        assert_eq!(opts.user(), Some("reporter"));
        assert_eq!(opts.db_name(), Some("sales"));
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(convert(&MyValue::NULL), Value::Null);
        assert_eq!(convert(&MyValue::Bytes(b"abc".to_vec())), Value::from("abc"));
        assert_eq!(convert(&MyValue::UInt(7)), Value::Int(7));
        assert_eq!(
            convert(&MyValue::Date(2024, 3, 9, 8, 5, 1, 0)),
            Value::from("2024-03-09 08:05:01")
        );
        assert_eq!(
            convert(&MyValue::Time(true, 1, 2, 3, 4, 0)),
            Value::from("-26:03:04")
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let profile =
            ConnectionProfile::new(EngineKind::MySql, "127.0.0.1", Some(1), "u", "p", None);
        let result = MySqlConnector::connect(&profile).await;
        assert!(matches!(
            result,
            Err(SluiceError::Connection {
                engine: EngineKind::MySql,
                ..
            })
        ));
    }
}
