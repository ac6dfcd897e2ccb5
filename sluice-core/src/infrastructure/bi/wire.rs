// sluice-core/src/infrastructure/bi/wire.rs
//
// JSON shapes of the Tableau REST API (v3.5) calls used by the client.

use serde::{Deserialize, Serialize};

use crate::domain::bi::{Project, View, Workbook};

// --- SIGN IN ---

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub credentials: CredentialsIn<'a>,
}

#[derive(Debug, Serialize)]
pub struct CredentialsIn<'a> {
    pub name: &'a str,
    pub password: &'a str,
    pub site: SiteRef<'a>,
}

#[derive(Debug, Serialize)]
pub struct SiteRef<'a> {
    #[serde(rename = "contentUrl")]
    pub content_url: &'a str,
}

impl<'a> SignInRequest<'a> {
    /// Credentials for the default site (empty content URL).
    pub fn default_site(name: &'a str, password: &'a str) -> Self {
        Self {
            credentials: CredentialsIn {
                name,
                password,
                site: SiteRef { content_url: "" },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub credentials: CredentialsOut,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsOut {
    pub token: String,
    #[serde(default)]
    pub site: Option<IdRef>,
    #[serde(default)]
    pub user: Option<IdRef>,
}

#[derive(Debug, Deserialize)]
pub struct IdRef {
    #[serde(default)]
    pub id: Option<String>,
}

// --- LISTINGS (single page) ---

#[derive(Debug, Deserialize)]
pub struct ProjectsResponse {
    pub projects: ProjectList,
}

#[derive(Debug, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub project: Vec<Project>,
}

#[derive(Debug, Deserialize)]
pub struct WorkbooksResponse {
    pub workbooks: WorkbookList,
}

#[derive(Debug, Deserialize)]
pub struct WorkbookList {
    #[serde(default)]
    pub workbook: Vec<Workbook>,
}

#[derive(Debug, Deserialize)]
pub struct ViewsResponse {
    pub views: ViewList,
}

#[derive(Debug, Deserialize)]
pub struct ViewList {
    #[serde(default)]
    pub view: Vec<View>,
}

// --- VIEW DATA ---

#[derive(Debug, Deserialize)]
pub struct ViewDataResponse {
    pub data: Vec<Vec<serde_json::Value>>,
}

/// Text form of one JSON cell: strings unquoted, null empty, anything else
/// as its JSON text.
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
