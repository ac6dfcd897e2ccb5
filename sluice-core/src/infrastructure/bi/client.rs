// sluice-core/src/infrastructure/bi/client.rs

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::bi::{ArtifactKind, Project, Session, View, Workbook, find_project_id};
use crate::error::SluiceError;
use crate::infrastructure::bi::wire::{
    ProjectsResponse, SignInRequest, SignInResponse, ViewDataResponse, ViewsResponse,
    WorkbooksResponse, cell_text,
};
use crate::infrastructure::config::BiSettings;
use crate::infrastructure::delimited::write_records;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

pub const API_VERSION: &str = "3.5";
pub const AUTH_HEADER: &str = "X-Tableau-Auth";

/// Session-scoped client for the Tableau REST API. One instance per user
/// session; state-changing calls take `&mut self`.
pub struct BiClient {
    http: reqwest::Client,
    server_url: String,
    username: String,
    password: String,
    session: Option<Session>,
}

impl fmt::Debug for BiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiClient")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("session", &self.session)
            .finish()
    }
}

impl BiClient {
    pub fn new(
        server_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let server_url: String = server_url.into();
        Self {
            http: reqwest::Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            session: None,
        }
    }

    pub fn from_settings(settings: &BiSettings) -> Self {
        Self::new(
            settings.server_url.as_str(),
            settings.username.as_str(),
            settings.password.as_str(),
        )
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}/{}", self.server_url, API_VERSION, path)
    }

    fn require_session(&self) -> Result<&Session, SluiceError> {
        self.session.as_ref().ok_or(SluiceError::NotLoggedIn)
    }

    /// URL under the signed-in site.
    fn site_url(&self, path: &str) -> Result<String, SluiceError> {
        let session = self.require_session()?;
        Ok(self.api_url(&format!("sites/{}/{}", session.site_id, path)))
    }

    /// Authenticated GET; any non-2xx status is a `RequestFailed`.
    async fn get(&self, url: &str) -> Result<reqwest::Response, SluiceError> {
        let session = self.require_session()?;
        debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(AUTH_HEADER, &session.token)
            .send()
            .await
            .map_err(InfrastructureError::Http)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Request failed");
            return Err(SluiceError::RequestFailed {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SluiceError> {
        let body = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(InfrastructureError::Http)?;
        serde_json::from_slice(&body).map_err(|e| SluiceError::UnexpectedResponse(e.to_string()))
    }

    /// Signs in to the default site. On anything but 200 the session stays unset.
    #[instrument(skip(self), fields(user = %self.username))]
    pub async fn login(&mut self) -> Result<(), SluiceError> {
        let url = self.api_url("auth/signin");
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&SignInRequest::default_site(&self.username, &self.password))
            .send()
            .await
            .map_err(InfrastructureError::Http)?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(status = status.as_u16(), "Login failed.");
            return Err(SluiceError::AuthFailed {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(InfrastructureError::Http)?;
        let parsed: SignInResponse = serde_json::from_slice(&body)
            .map_err(|e| SluiceError::UnexpectedResponse(e.to_string()))?;
        let credentials = parsed.credentials;
        if credentials.token.is_empty() {
            error!("Login failed: empty token");
            return Err(SluiceError::UnexpectedResponse(
                "sign-in returned an empty token".into(),
            ));
        }

        let site_id = credentials
            .site
            .and_then(|s| s.id)
            .unwrap_or_else(|| self.username.clone());
        self.session = Some(Session {
            token: credentials.token,
            site_id,
            user_id: credentials.user.and_then(|u| u.id),
        });
        info!("Login successful.");
        Ok(())
    }

    /// Signs out; the session is only cleared on 204.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), SluiceError> {
        let Some(session) = self.session.as_ref() else {
            error!("Logout failed: not logged in");
            return Err(SluiceError::NotLoggedIn);
        };

        let url = self.api_url("auth/signout");
        let response = self
            .http
            .post(&url)
            .header(AUTH_HEADER, &session.token)
            .send()
            .await
            .map_err(InfrastructureError::Http)?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            error!(status = status.as_u16(), "Logout failed.");
            return Err(SluiceError::RequestFailed {
                status: status.as_u16(),
                url,
            });
        }

        self.session = None;
        info!("Logout successful.");
        Ok(())
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, SluiceError> {
        let url = self.site_url("projects")?;
        let response: ProjectsResponse = self.get_json(&url).await?;
        Ok(response.projects.project)
    }

    /// Id of the first project named exactly `name`, `None` if absent.
    #[instrument(skip(self))]
    pub async fn set_project(&self, name: &str) -> Result<Option<String>, SluiceError> {
        let projects = self.list_projects().await?;
        match find_project_id(&projects, name) {
            Some(id) => {
                info!("Project '{}' found.", name);
                Ok(Some(id.to_string()))
            }
            None => {
                warn!("Project '{}' not found.", name);
                Ok(None)
            }
        }
    }

    pub async fn list_workbooks(&self) -> Result<Vec<Workbook>, SluiceError> {
        let url = self.site_url("workbooks")?;
        let response: WorkbooksResponse = self.get_json(&url).await?;
        Ok(response.workbooks.workbook)
    }

    pub async fn get_workbooks(&self) -> Result<Vec<String>, SluiceError> {
        Ok(self
            .list_workbooks()
            .await?
            .into_iter()
            .map(|w| w.name)
            .collect())
    }

    pub async fn list_views(&self, workbook_id: &str) -> Result<Vec<View>, SluiceError> {
        let url = self.site_url(&format!("workbooks/{}/views", workbook_id))?;
        let response: ViewsResponse = self.get_json(&url).await?;
        Ok(response.views.view)
    }

    pub async fn get_views(&self, workbook_id: &str) -> Result<Vec<String>, SluiceError> {
        Ok(self
            .list_views(workbook_id)
            .await?
            .into_iter()
            .map(|v| v.name)
            .collect())
    }

    /// Writes the rendered PNG verbatim to `<file_name>.png`.
    #[instrument(skip(self, file_name))]
    pub async fn download_view_image(
        &self,
        view_id: &str,
        file_name: impl AsRef<Path>,
    ) -> Result<PathBuf, SluiceError> {
        let target = ArtifactKind::Image.target_path(file_name);
        let url = self.site_url(&format!("views/{}/image", view_id))?;

        let bytes = match self.get(&url).await {
            Ok(response) => response.bytes().await.map_err(InfrastructureError::Http)?,
            Err(e) => {
                error!("Failed to download view image: {}", e);
                return Err(e);
            }
        };

        atomic_write(&target, &bytes).map_err(|source| SluiceError::FileWrite {
            path: target.clone(),
            source,
        })?;
        info!("View image downloaded as '{}'.", target.display());
        Ok(target)
    }

    /// Writes the view's `data` rows as delimited text to `<file_name>.csv`.
    #[instrument(skip(self, file_name))]
    pub async fn download_view_dataset_csv(
        &self,
        view_id: &str,
        file_name: impl AsRef<Path>,
    ) -> Result<PathBuf, SluiceError> {
        let target = ArtifactKind::Dataset.target_path(file_name);
        let url = self.site_url(&format!("views/{}/data", view_id))?;

        let dataset: ViewDataResponse = match self.get_json(&url).await {
            Ok(dataset) => dataset,
            Err(e) => {
                error!("Failed to download view dataset CSV: {}", e);
                return Err(e);
            }
        };

        let records = dataset
            .data
            .iter()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
        write_records(&target, records).map_err(|source| SluiceError::FileWrite {
            path: target.clone(),
            source,
        })?;
        info!("View dataset downloaded as '{}'.", target.display());
        Ok(target)
    }
}
