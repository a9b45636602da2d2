//! Update pipeline: project lookup, artifact fan-out, feed aggregation

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::config::MINECRAFT_GAME_ID;
use crate::version::aggregator::{Feed, aggregate};
use crate::version::error::{RepositoryError, UpdateError};
use crate::version::repository::Repository;
use crate::version::resolver::VersionResolver;
use crate::version::store::{VersionQuery, VersionStore};
use crate::version::types::{Artifact, Project, Version};

pub struct UpdateService<S: VersionStore> {
    repository: Arc<dyn Repository>,
    resolver: VersionResolver<S>,
    max_in_flight: usize,
}

impl<S: VersionStore> UpdateService<S> {
    pub fn new(store: Arc<S>, repository: Arc<dyn Repository>, max_in_flight: usize) -> Self {
        Self {
            resolver: VersionResolver::new(store, Arc::clone(&repository)),
            repository,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Compute the feed of `mod_id` in project `project_id` for `loader`.
    ///
    /// When the repository rejects our credentials the feed is built from
    /// the versions already stored for the project.
    pub async fn get_update_json(
        &self,
        project_id: i64,
        mod_id: &str,
        loader: &str,
    ) -> Result<Feed, UpdateError> {
        let project = match self.repository.get_project(project_id).await {
            Ok(project) => project,
            Err(RepositoryError::NotFound(_)) => return Err(UpdateError::InvalidProjectId),
            Err(RepositoryError::Unauthorized(status)) => {
                warn!(
                    "Repository answered {} for project {}, serving stored versions",
                    status, project_id
                );
                return self.from_store(project_id, "", mod_id, loader);
            }
            Err(e) => return Err(e.into()),
        };

        if project.game_id != MINECRAFT_GAME_ID {
            debug!(
                "Project {} belongs to game {}, not {}",
                project.id, project.game_id, MINECRAFT_GAME_ID
            );
            return Err(UpdateError::UnsupportedGame);
        }

        let artifacts = match self.repository.list_artifacts(project.id).await {
            Ok(artifacts) => artifacts,
            Err(RepositoryError::NotFound(_)) => return Err(UpdateError::InvalidProjectId),
            Err(RepositoryError::Unauthorized(status)) => {
                warn!(
                    "Repository answered {} listing files of project {}, serving stored versions",
                    status, project.id
                );
                return self.from_store(project.id, &project.website_url, mod_id, loader);
            }
            Err(e) => return Err(e.into()),
        };

        let versions = self.resolve_all(&project, &artifacts, mod_id).await?;
        info!(
            "Resolved {} of {} files of project {} for {}",
            versions.len(),
            artifacts.len(),
            project.id,
            mod_id
        );

        Ok(aggregate(&project.website_url, &versions, mod_id, loader))
    }

    /// Resolve every downloadable artifact, at most `max_in_flight` at a time
    async fn resolve_all(
        &self,
        project: &Project,
        artifacts: &[Artifact],
        mod_id: &str,
    ) -> Result<Vec<Version>, UpdateError> {
        let resolved: Vec<Option<Version>> = stream::iter(
            artifacts
                .iter()
                .filter(|a| a.is_available && a.download_url.is_some()),
        )
        .map(|artifact| self.resolver.resolve(project, artifact, mod_id))
        .buffer_unordered(self.max_in_flight)
        .try_collect()
        .await?;

        Ok(resolved.into_iter().flatten().collect())
    }

    fn from_store(
        &self,
        project_id: i64,
        homepage: &str,
        mod_id: &str,
        loader: &str,
    ) -> Result<Feed, UpdateError> {
        let versions = self
            .resolver
            .store()
            .find(&VersionQuery::project(project_id).mod_id(mod_id))?;
        Ok(aggregate(homepage, &versions, mod_id, loader))
    }
}
