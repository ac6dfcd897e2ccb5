// sluice-core/src/infrastructure/adapters/sqlserver.rs

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::numeric::Numeric;
use tiberius::{AuthMethod, Client, ColumnData, Config, FromSql};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::domain::profile::{ConnectionProfile, EngineKind};
use crate::domain::value::{QueryResult, Value};
use crate::error::SluiceError;
use crate::ports::connector::Connector;

pub struct SqlServerConnector {
    client: Mutex<Option<Client<Compat<TcpStream>>>>,
}

/// TDS config with SQL authentication. The server certificate is trusted as-is.
pub(crate) fn config_for(profile: &ConnectionProfile) -> Config {
    let mut config = Config::new();
    config.host(profile.host());
    config.port(profile.port().unwrap_or(1433));
    config.authentication(AuthMethod::sql_server(
        profile.username(),
        profile.password(),
    ));
    if let Some(database) = profile.database() {
        config.database(database);
    }
    config.trust_cert();
    config
}

impl SqlServerConnector {
    pub async fn connect(profile: &ConnectionProfile) -> Result<Self, SluiceError> {
        let config = config_for(profile);

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| SluiceError::connection(EngineKind::SqlServer, e))?;
        tcp.set_nodelay(true)
            .map_err(|e| SluiceError::connection(EngineKind::SqlServer, e))?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| SluiceError::connection(EngineKind::SqlServer, e))?;

        Ok(Self {
            client: Mutex::new(Some(client)),
        })
    }
}

/// Temporal columns decode through chrono and keep their textual form.
fn temporal<'a, T>(data: &'a ColumnData<'static>) -> Result<Value, tiberius::error::Error>
where
    T: FromSql<'a> + ToString,
{
    Ok(T::from_sql(data)?
        .map(|v| Value::Text(v.to_string()))
        .unwrap_or(Value::Null))
}

/// Plain decimal text. The driver's own `Display` breaks on negative
/// fractions (`-1.-5`).
fn numeric_text(n: Numeric) -> String {
    let scale = usize::from(n.scale());
    let digits = n.value().unsigned_abs().to_string();
    let sign = if n.value() < 0 { "-" } else { "" };
    if scale == 0 {
        return format!("{}{}", sign, digits);
    }
    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (int, frac) = padded.split_at(padded.len() - scale);
    format!("{}{}.{}", sign, int, frac)
}

fn convert(data: ColumnData<'static>) -> Result<Value, tiberius::error::Error> {
    let value = match data {
        ColumnData::U8(v) => v.map(|x| Value::Int(x.into())).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(|x| Value::Int(x.into())).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(|x| Value::Int(x.into())).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::Int).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(|x| Value::Float(x.into())).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::Float).unwrap_or(Value::Null),
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .map(|s| Value::Text(s.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v
            .map(|g| Value::Text(g.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Binary(v) => v
            .map(|b| Value::Bytes(b.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v
            .map(|n| Value::Text(numeric_text(n)))
            .unwrap_or(Value::Null),
        ColumnData::Xml(v) => v
            .map(|x| Value::Text(x.to_string()))
            .unwrap_or(Value::Null),
        ref dt @ (ColumnData::DateTime(_)
        | ColumnData::SmallDateTime(_)
        | ColumnData::DateTime2(_)) => temporal::<NaiveDateTime>(dt)?,
        ref d @ ColumnData::Date(_) => temporal::<NaiveDate>(d)?,
        ref t @ ColumnData::Time(_) => temporal::<NaiveTime>(t)?,
        ref dto @ ColumnData::DateTimeOffset(_) => temporal::<DateTime<FixedOffset>>(dto)?,
    };
    Ok(value)
}

#[async_trait]
impl Connector for SqlServerConnector {
    async fn query(&self, query: &str) -> Result<QueryResult, SluiceError> {
        let mut guard = self.client.lock().await;
        let client = guard.as_mut().ok_or(SluiceError::NotConnected)?;

        let mut stream = client.simple_query(query).await.map_err(SluiceError::query)?;
        let columns: Vec<String> = stream
            .columns()
            .await
            .map_err(SluiceError::query)?
            .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = stream
            .into_first_result()
            .await
            .map_err(SluiceError::query)?
            .into_iter()
            .map(|row| row.into_iter().map(convert).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(SluiceError::query)?;

        Ok(QueryResult::new(columns, rows))
    }

    async fn close(&self) -> Result<(), SluiceError> {
        let mut guard = self.client.lock().await;
        match guard.take() {
            Some(client) => client.close().await.map_err(SluiceError::query),
            None => Ok(()),
        }
    }

    fn engine_name(&self) -> &str {
        "sqlserver"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::Datelike;
    use std::borrow::Cow;
    use tiberius::time::{Date, DateTime2, DateTimeOffset, Time};
    use tiberius::xml::XmlData;

    #[test]
    fn test_config_uses_profile_address() {
        let profile = ConnectionProfile::new(
            EngineKind::SqlServer,
            "mssql.local",
            None,
            "sa",
            "pw",
            Some("master".into()),
        );
        assert_eq!(config_for(&profile).get_addr(), "mssql.local:1433");
    }

    #[test]
    fn test_column_conversion() -> Result<()> {
        assert_eq!(convert(ColumnData::I32(Some(5)))?, Value::Int(5));
        assert_eq!(convert(ColumnData::I32(None))?, Value::Null);
        assert_eq!(convert(ColumnData::Bit(Some(true)))?, Value::Bool(true));
        assert_eq!(
            convert(ColumnData::String(Some(Cow::Borrowed("abc"))))?,
            Value::from("abc")
        );
        Ok(())
    }

    fn days_since_year_one(y: i32, m: u32, d: u32) -> u32 {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        (date.num_days_from_ce() - 1) as u32
    }

    #[test]
    fn test_temporal_columns_render_as_text() -> Result<()> {
        let date = Date::new(days_since_year_one(2024, 1, 2));
        let time = Time::new(3 * 3600 + 4 * 60 + 5, 0);

        assert_eq!(
            convert(ColumnData::Date(Some(date)))?,
            Value::from("2024-01-02")
        );
        assert_eq!(convert(ColumnData::Time(Some(time)))?, Value::from("03:04:05"));
        assert_eq!(
            convert(ColumnData::DateTime2(Some(DateTime2::new(date, time))))?,
            Value::from("2024-01-02 03:04:05")
        );
        assert_eq!(convert(ColumnData::Date(None))?, Value::Null);

        // Stored as UTC, shown in the column's own offset.
        let utc = DateTime2::new(date, Time::new(3600 + 4 * 60 + 5, 0));
        assert_eq!(
            convert(ColumnData::DateTimeOffset(Some(DateTimeOffset::new(utc, 120))))?,
            Value::from("2024-01-02 03:04:05 +02:00")
        );
        Ok(())
    }

    #[test]
    fn test_numeric_and_xml_columns_render_as_text() -> Result<()> {
        assert_eq!(
            convert(ColumnData::Numeric(Some(Numeric::new_with_scale(15, 1))))?,
            Value::from("1.5")
        );
        assert_eq!(numeric_text(Numeric::new_with_scale(-15, 1)), "-1.5");
        assert_eq!(numeric_text(Numeric::new_with_scale(5, 3)), "0.005");
        assert_eq!(numeric_text(Numeric::new_with_scale(-42, 0)), "-42");
        let xml = XmlData::new("<a>1</a>");
        assert_eq!(
            convert(ColumnData::Xml(Some(Cow::Owned(xml))))?,
            Value::from("<a>1</a>")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let profile =
            ConnectionProfile::new(EngineKind::SqlServer, "127.0.0.1", Some(1), "sa", "pw", None);
        let result = SqlServerConnector::connect(&profile).await;
        assert!(matches!(
            result,
            Err(SluiceError::Connection {
                engine: EngineKind::SqlServer,
                ..
            })
        ));
    }
}
