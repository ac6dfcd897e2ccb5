// sluice-core/src/application/mod.rs

pub mod compare;
pub mod engine;
pub mod exporter;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use sluice_core::application::{DataExporter, compare_files};`

pub use compare::compare_files;
pub use engine::execute_query;
pub use exporter::DataExporter;
