pub mod bi;
pub mod compare;
pub mod error;
pub mod profile;
pub mod value;

// Re-exports to keep imports short elsewhere
pub use bi::{ArtifactKind, Project, Session, View, Workbook};
pub use compare::{Comparison, Outcome, RowDiff, compare_rows};
pub use error::DomainError;
pub use profile::{ConnectionProfile, EngineKind};
pub use value::{QueryResult, Row, Value};
