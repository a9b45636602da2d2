//! Repository test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use updatejson::version::database::Database;
use updatejson::version::error::RepositoryError;
use updatejson::version::repository::Repository;
use updatejson::version::types::{Artifact, Project, ReleaseType};

pub const WEBSITE: &str = "https://www.curseforge.com/minecraft/mc-mods/example";

/// Fake repository serving one project and its jars from memory
pub struct FakeRepository {
    project: Project,
    artifacts: Vec<Artifact>,
    jars: HashMap<String, Vec<u8>>,
    unauthorized: AtomicBool,
    downloads: AtomicUsize,
}

impl FakeRepository {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            artifacts: Vec::new(),
            jars: HashMap::new(),
            unauthorized: AtomicBool::new(false),
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn with_artifact(mut self, artifact: Artifact, jar: Vec<u8>) -> Self {
        if let Some(url) = &artifact.download_url {
            self.jars.insert(url.clone(), jar);
        }
        self.artifacts.push(artifact);
        self
    }

    /// Make file listings answer 403 from now on
    pub fn revoke_credentials(&self) {
        self.unauthorized.store(true, Ordering::SeqCst);
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for FakeRepository {
    async fn get_project(&self, project_id: i64) -> Result<Project, RepositoryError> {
        if project_id == self.project.id {
            Ok(self.project.clone())
        } else {
            Err(RepositoryError::NotFound(project_id.to_string()))
        }
    }

    async fn list_artifacts(&self, project_id: i64) -> Result<Vec<Artifact>, RepositoryError> {
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unauthorized(403));
        }
        if project_id != self.project.id {
            return Err(RepositoryError::NotFound(project_id.to_string()));
        }
        Ok(self.artifacts.clone())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RepositoryError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.jars
            .get(url)
            .cloned()
            .ok_or_else(|| RepositoryError::InvalidResponse(format!("no file at {}", url)))
    }
}

pub fn project(id: i64, game_id: i64) -> Project {
    Project {
        id,
        game_id,
        website_url: WEBSITE.to_string(),
    }
}

/// Release artifact uploaded on the given day of March 2024
pub fn artifact(id: i64, day: u32, tags: &[&str]) -> Artifact {
    Artifact {
        id,
        file_date: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
        download_url: Some(format!("https://edge.forgecdn.net/files/{}.jar", id)),
        release_type: ReleaseType::Release,
        is_available: true,
        game_versions: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Create a file-backed store in a temporary directory
pub fn create_test_store() -> (TempDir, Arc<Database>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("versions.db");
    let store = Database::new(&db_path).unwrap();
    (temp_dir, Arc::new(store))
}
