// sluice-core/src/infrastructure/bi/mod.rs
//
// Tableau REST API session client.

pub mod client;
pub mod wire;

pub use client::{API_VERSION, AUTH_HEADER, BiClient};
