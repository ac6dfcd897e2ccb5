pub mod connection;

pub use connection::{BiSettings, SluiceConfig, apply_env_overrides, load_config};
