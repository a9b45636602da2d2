//! Repository trait for fetching projects, their files, and file contents

#[cfg(test)]
use mockall::automock;

use crate::version::error::RepositoryError;
use crate::version::types::{Artifact, Project};

/// Trait for talking to the external mod repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// Fetches a project by id
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - The project does not exist
    /// * `Err(RepositoryError::Unauthorized)` - Credentials rejected or rate limited
    async fn get_project(&self, project_id: i64) -> Result<Project, RepositoryError>;

    /// Lists every file of a project, following pagination
    async fn list_artifacts(&self, project_id: i64) -> Result<Vec<Artifact>, RepositoryError>;

    /// Downloads a file into memory
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RepositoryError>;
}
