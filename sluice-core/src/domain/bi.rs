// sluice-core/src/domain/bi.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Authenticated BI session. The token is opaque and never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub site_id: String,
    pub user_id: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("site_id", &self.site_id)
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
}

/// Per-view download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Image,
    Dataset,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Dataset => "csv",
        }
    }

    /// `<file_name>.<ext>`, appended even when the stem already has a dot.
    pub fn target_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        let mut raw = file_name.as_ref().as_os_str().to_owned();
        raw.push(".");
        raw.push(self.extension());
        PathBuf::from(raw)
    }
}

/// First exact name match wins; duplicates are not reported.
pub fn find_project_id<'a>(projects: &'a [Project], name: &str) -> Option<&'a str> {
    projects
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.id.as_str())
}
