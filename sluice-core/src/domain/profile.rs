// sluice-core/src/domain/profile.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Relational engine a profile targets. Each variant maps to exactly one
/// backend adapter; there is no string switch past parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EngineKind {
    MySql,
    SqlServer,
    Oracle,
    Teradata,
    /// Embedded engine, `database` is a file path or `:memory:`.
    DuckDb,
}

impl EngineKind {
    pub const ALL: [EngineKind; 5] = [
        Self::MySql,
        Self::SqlServer,
        Self::Oracle,
        Self::Teradata,
        Self::DuckDb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::SqlServer => "sqlserver",
            Self::Oracle => "oracle",
            Self::Teradata => "teradata",
            Self::DuckDb => "duckdb",
        }
    }

    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::MySql => Some(3306),
            Self::SqlServer => Some(1433),
            Self::Oracle => Some(1521),
            Self::Teradata | Self::DuckDb => None,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "sqlserver" => Ok(Self::SqlServer),
            "oracle" => Ok(Self::Oracle),
            "teradata" => Ok(Self::Teradata),
            "duckdb" => Ok(Self::DuckDb),
            _ => Err(DomainError::UnsupportedEngine(s.to_string())),
        }
    }
}

impl TryFrom<String> for EngineKind {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EngineKind> for String {
    fn from(value: EngineKind) -> Self {
        value.as_str().to_string()
    }
}

/// Everything needed to open one connection. Immutable once built.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionProfile {
    engine: EngineKind,
    #[serde(default)]
    host: String,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    database: Option<String>,
}

impl ConnectionProfile {
    pub fn new(
        engine: EngineKind,
        host: impl Into<String>,
        port: Option<u16>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: Option<String>,
    ) -> Self {
        Self {
            engine,
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            database,
        }
    }

    /// Parses the engine tag first, so a bad tag never yields a profile.
    pub fn from_tag(
        tag: &str,
        host: impl Into<String>,
        port: Option<u16>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: Option<String>,
    ) -> Result<Self, DomainError> {
        let engine = tag.parse()?;
        Ok(Self::new(engine, host, port, username, password, database))
    }

    /// Embedded DuckDB profile over a file path (or `:memory:`).
    pub fn duckdb(path: impl Into<String>) -> Self {
        Self::new(EngineKind::DuckDb, "", None, "", "", Some(path.into()))
    }

    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Explicit port, falling back to the engine's well-known one.
    pub fn port(&self) -> Option<u16> {
        self.port.or_else(|| self.engine.default_port())
    }

    /// Copy with the password replaced; used for env overrides.
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            ..self.clone()
        }
    }

    /// Oracle easy-connect descriptor: `host:port/service`.
    pub fn oracle_connect_string(&self) -> String {
        let port = self.port().unwrap_or(1521);
        format!(
            "{}:{}/{}",
            self.host,
            port,
            self.database.as_deref().unwrap_or_default()
        )
    }

    /// ODBC connection string for the Teradata driver. Port and database are
    /// not part of the Teradata login.
    pub fn teradata_connection_string(&self) -> String {
        format!(
            "DRIVER={{Teradata}};DBCNAME={};UID={};PWD={}",
            self.host, self.username, self.password
        )
    }

    /// File path for the embedded engine.
    pub fn duckdb_path(&self) -> &str {
        match self.database.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => ":memory:",
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match self.engine {
            EngineKind::DuckDb => Ok(()),
            _ if self.host.trim().is_empty() => Err(DomainError::InvalidProfile(format!(
                "host is required for {}",
                self.engine
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_tag_parsing_is_case_insensitive() -> anyhow::Result<()> {
        assert_eq!("MySQL".parse::<EngineKind>()?, EngineKind::MySql);
        assert_eq!("sqlserver".parse::<EngineKind>()?, EngineKind::SqlServer);
        assert_eq!("ORACLE".parse::<EngineKind>()?, EngineKind::Oracle);
        assert_eq!("Teradata".parse::<EngineKind>()?, EngineKind::Teradata);
        assert_eq!("duckdb".parse::<EngineKind>()?, EngineKind::DuckDb);
        Ok(())
    }

    #[test]
    fn test_display_and_parsing_consistency() -> anyhow::Result<()> {
        for engine in EngineKind::ALL {
            assert_eq!(engine.to_string().parse::<EngineKind>()?, engine);
        }
        Ok(())
    }

    #[test]
    fn test_unknown_engine_tag_is_rejected() {
        let err = "postgres".parse::<EngineKind>().unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedEngine(ref tag) if tag == "postgres"));

        let profile = ConnectionProfile::from_tag("db2", "localhost", None, "u", "p", None);
        assert!(profile.is_err());
    }

    #[test]
    fn test_default_ports() {
        let mysql = ConnectionProfile::new(EngineKind::MySql, "h", None, "u", "p", None);
        assert_eq!(mysql.port(), Some(3306));

        let mssql = ConnectionProfile::new(EngineKind::SqlServer, "h", Some(14330), "u", "p", None);
        assert_eq!(mssql.port(), Some(14330));

        let teradata = ConnectionProfile::new(EngineKind::Teradata, "h", None, "u", "p", None);
        assert_eq!(teradata.port(), None);
    }

    #[test]
    fn test_engine_specific_descriptors() {
        let oracle = ConnectionProfile::new(
            EngineKind::Oracle,
            "db.local",
            None,
            "scott",
            "tiger",
            Some("ORCLPDB".into()),
        );
        assert_eq!(oracle.oracle_connect_string(), "db.local:1521/ORCLPDB");

        let teradata =
            ConnectionProfile::new(EngineKind::Teradata, "td.local", None, "dbc", "secret", None);
        assert_eq!(
            teradata.teradata_connection_string(),
            "DRIVER={Teradata};DBCNAME=td.local;UID=dbc;PWD=secret"
        );

        assert_eq!(ConnectionProfile::duckdb("").duckdb_path(), ":memory:");
        assert_eq!(ConnectionProfile::duckdb("a.duckdb").duckdb_path(), "a.duckdb");
    }

    #[test]
    fn test_debug_redacts_password() {
        let profile = ConnectionProfile::new(EngineKind::MySql, "h", None, "u", "hunter2", None);
        let rendered = format!("{:?}", profile);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_validate_requires_host_for_network_engines() {
        let missing = ConnectionProfile::new(EngineKind::Oracle, " ", None, "u", "p", None);
        assert!(matches!(
            missing.validate(),
            Err(DomainError::InvalidProfile(_))
        ));
        assert!(ConnectionProfile::duckdb(":memory:").validate().is_ok());
    }

    #[test]
    fn test_profile_deserializes_from_yaml() -> anyhow::Result<()> {
        let yaml = "engine: SqlServer\nhost: localhost\nport: 1433\nusername: sa\npassword: pw\ndatabase: master\n";
        let profile: ConnectionProfile = serde_yaml::from_str(yaml)?;
        assert_eq!(profile.engine(), EngineKind::SqlServer);
        assert_eq!(profile.database(), Some("master"));

        let bad = "engine: sybase\nhost: localhost\n";
        assert!(serde_yaml::from_str::<ConnectionProfile>(bad).is_err());
        Ok(())
    }
}
