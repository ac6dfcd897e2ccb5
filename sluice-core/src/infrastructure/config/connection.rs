// sluice-core/src/infrastructure/config/connection.rs

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::profile::ConnectionProfile;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["sluice.yaml", "sluice.yml"];

/// Root of `sluice.yaml`: named database profiles plus optional BI server settings.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SluiceConfig {
    #[serde(default)]
    pub connections: HashMap<String, ConnectionProfile>,
    #[serde(default)]
    pub bi: Option<BiSettings>,
}

#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct BiSettings {
    pub server_url: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for BiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiSettings")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl SluiceConfig {
    pub fn connection(&self, name: &str) -> Result<&ConnectionProfile, InfrastructureError> {
        self.connections.get(name).ok_or_else(|| {
            let mut known: Vec<&str> = self.connections.keys().map(String::as_str).collect();
            known.sort_unstable();
            InfrastructureError::ConfigError(format!(
                "Unknown connection profile '{}'. Known profiles: [{}]",
                name,
                known.join(", ")
            ))
        })
    }
}

/// Loads `explicit` if given, otherwise looks for `sluice.yaml`/`sluice.yml`
/// in `dir`. Secrets from the environment are layered on top.
#[instrument(skip_all)]
pub fn load_config(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<SluiceConfig, InfrastructureError> {
    let config_path = match explicit {
        Some(path) if path.exists() => path.to_path_buf(),
        Some(path) => {
            return Err(InfrastructureError::ConfigNotFound(
                path.display().to_string(),
            ));
        }
        None => find_config(dir)?,
    };
    info!(path = ?config_path, "Loading sluice configuration");

    let content = fs::read_to_string(&config_path)?;
    let mut config: SluiceConfig = serde_yaml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

fn find_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
        .ok_or_else(|| {
            InfrastructureError::ConfigNotFound(format!(
                "No configuration file found in {:?}. Checked: {:?}",
                root, CONFIG_CANDIDATES
            ))
        })
}

/// `SLUICE_<PROFILE>_PASSWORD` per connection (profile name upper-cased,
/// dashes as underscores) and `SLUICE_BI_PASSWORD` for the BI server.
pub fn apply_env_overrides<F>(config: &mut SluiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (name, profile) in config.connections.iter_mut() {
        let key = format!("SLUICE_{}_PASSWORD", name.to_uppercase().replace('-', "_"));
        if let Some(password) = lookup(&key) {
            info!(profile = %name, "Overriding password via ENV");
            *profile = profile.with_password(password);
        }
    }
    if let Some(bi) = config.bi.as_mut() {
        if let Some(password) = lookup("SLUICE_BI_PASSWORD") {
            info!("Overriding BI password via ENV");
            bi.password = password;
        }
    }
}
