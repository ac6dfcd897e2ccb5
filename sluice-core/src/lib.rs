// sluice-core/src/lib.rs

// 1. Documentation is not mandatory yet
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts the application needs (Connector).
pub mod ports;

// 2. Domain
// Engine kinds, connection profiles, cell values, BI records, row diff.
// Depends on nothing else (no infra, no app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Database backends, CSV files, BI HTTP client, YAML config.
pub mod infrastructure;

// 4. Application (Use Cases)
// DataExporter facade, file comparison.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use sluice_core::SluiceError;
pub use error::SluiceError;
