//! CurseForge API implementation

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{DEFAULT_API_BASE_URL, MAX_PAGES, PAGE_SIZE};
use crate::version::error::RepositoryError;
use crate::version::repository::Repository;
use crate::version::types::{Artifact, Project, ReleaseType};

/// Envelope wrapping every CurseForge response
#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectData {
    id: i64,
    game_id: i64,
    #[serde(default)]
    links: ProjectLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectLinks {
    #[serde(default)]
    website_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    id: i64,
    file_date: DateTime<Utc>,
    download_url: Option<String>,
    release_type: ReleaseType,
    #[serde(default = "default_available")]
    is_available: bool,
    #[serde(default)]
    game_versions: Vec<String>,
}

fn default_available() -> bool {
    true
}

impl From<ProjectData> for Project {
    fn from(data: ProjectData) -> Self {
        Self {
            id: data.id,
            game_id: data.game_id,
            website_url: data.links.website_url.unwrap_or_default(),
        }
    }
}

impl From<FileData> for Artifact {
    fn from(data: FileData) -> Self {
        Self {
            id: data.id,
            file_date: data.file_date,
            download_url: data.download_url.filter(|url| !url.is_empty()),
            release_type: data.release_type,
            is_available: data.is_available,
            game_versions: data.game_versions,
        }
    }
}

/// Repository implementation for the CurseForge API
#[derive(Clone)]
pub struct CurseForgeRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CurseForgeRepository {
    /// Creates a new CurseForgeRepository with a custom base URL
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("updatejson/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// GET an API path and decode the `data` envelope
    async fn get_api<T: DeserializeOwned>(
        &self,
        path: &str,
        project_id: i64,
    ) -> Result<T, RepositoryError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json");
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(project_id.to_string()));
        }

        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
        ) {
            warn!("CurseForge rejected request with status {}: {}", status, url);
            return Err(RepositoryError::Unauthorized(status.as_u16()));
        }

        if !status.is_success() {
            warn!("CurseForge returned status {}: {}", status, url);
            return Err(RepositoryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body: DataResponse<T> = response.json().await.map_err(|e| {
            warn!("Failed to parse CurseForge response: {}", e);
            RepositoryError::InvalidResponse(e.to_string())
        })?;

        Ok(body.data)
    }
}

impl Default for CurseForgeRepository {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, None)
    }
}

#[async_trait::async_trait]
impl Repository for CurseForgeRepository {
    async fn get_project(&self, project_id: i64) -> Result<Project, RepositoryError> {
        let data: ProjectData = self
            .get_api(&format!("/v1/mods/{}", project_id), project_id)
            .await?;
        Ok(data.into())
    }

    async fn list_artifacts(&self, project_id: i64) -> Result<Vec<Artifact>, RepositoryError> {
        let mut artifacts = Vec::new();

        for page in 0..MAX_PAGES {
            let path = format!(
                "/v1/mods/{}/files?index={}&pageSize={}",
                project_id,
                page * PAGE_SIZE,
                PAGE_SIZE
            );
            let files: Vec<FileData> = self.get_api(&path, project_id).await?;
            let count = files.len();
            artifacts.extend(files.into_iter().map(Artifact::from));

            // A short page is the last one
            if count < PAGE_SIZE {
                break;
            }
        }

        debug!("Listed {} files for project {}", artifacts.len(), project_id);
        Ok(artifacts)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RepositoryError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("Download returned status {}: {}", status, url);
            return Err(RepositoryError::InvalidResponse(format!(
                "Download failed with status: {}",
                status
            )));
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
