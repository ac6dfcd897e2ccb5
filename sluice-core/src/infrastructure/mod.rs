// sluice-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod bi;
pub mod config;
pub mod delimited;
pub mod error;
pub mod fs;
