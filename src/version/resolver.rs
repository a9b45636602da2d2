//! Version resolver
//!
//! Turns one artifact into persisted [`Version`] rows, downloading and
//! inspecting it at most once. Later calls only correct the descriptive
//! fields the repository may have edited since.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::parser::archive::ArchiveInspector;
use crate::parser::types::ManifestInfo;
use crate::version::error::StoreError;
use crate::version::repository::Repository;
use crate::version::store::{VersionQuery, VersionStore};
use crate::version::types::{
    Artifact, Loader, Project, Version, join_loaders, parse_loaders, reference_url,
    split_joined, widen_loaders,
};

pub struct VersionResolver<S: VersionStore> {
    store: Arc<S>,
    repository: Arc<dyn Repository>,
    inspector: Arc<ArchiveInspector>,
}

impl<S: VersionStore> VersionResolver<S> {
    pub fn new(store: Arc<S>, repository: Arc<dyn Repository>) -> Self {
        Self {
            store,
            repository,
            inspector: Arc::new(ArchiveInspector::default()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Resolve the version of `wanted_mod_id` shipped in `artifact`.
    ///
    /// Download and parse failures are logged and yield `Ok(None)`; only a
    /// store failure is an error.
    pub async fn resolve(
        &self,
        project: &Project,
        artifact: &Artifact,
        wanted_mod_id: &str,
    ) -> Result<Option<Version>, StoreError> {
        let existing = self
            .store
            .find(&VersionQuery::project(project.id).file(artifact.id))?;

        if !existing.is_empty() {
            return self.refresh_existing(existing, artifact, wanted_mod_id);
        }

        let Some(info) = self.inspect(project, artifact).await else {
            return Ok(None);
        };

        self.persist(project, artifact, info, wanted_mod_id)
    }

    /// Download and inspect an artifact.
    ///
    /// `None` means nothing should be persisted (transient failure);
    /// `Some(None)` means the archive was read and holds no manifest.
    async fn inspect(
        &self,
        project: &Project,
        artifact: &Artifact,
    ) -> Option<Option<ManifestInfo>> {
        let Some(url) = artifact.download_url.as_deref() else {
            warn!(
                "File {} of project {} has no download URL",
                artifact.id, project.id
            );
            return None;
        };

        let bytes = self
            .repository
            .fetch_bytes(url)
            .await
            .inspect_err(|e| {
                warn!(
                    "Failed to download file {} of project {}: {}",
                    artifact.id, project.id, e
                )
            })
            .ok()?;

        // Decompression is CPU-bound
        let inspector = Arc::clone(&self.inspector);
        let inspected = tokio::task::spawn_blocking(move || inspector.inspect(&bytes)).await;

        match inspected {
            Ok(Ok(info)) => Some(info),
            Ok(Err(e)) => {
                warn!(
                    "Failed to read file {} of project {}: {}",
                    artifact.id, project.id, e
                );
                None
            }
            Err(e) => {
                warn!(
                    "Inspection of file {} of project {} did not complete: {}",
                    artifact.id, project.id, e
                );
                None
            }
        }
    }

    fn persist(
        &self,
        project: &Project,
        artifact: &Artifact,
        info: Option<ManifestInfo>,
        wanted_mod_id: &str,
    ) -> Result<Option<Version>, StoreError> {
        let Some(info) = info.filter(|info| !info.is_empty()) else {
            debug!(
                "No manifest in file {} of project {}, recording placeholder",
                artifact.id, project.id
            );
            self.store.insert(&Version::placeholder(project, artifact))?;
            return Ok(None);
        };

        let tags: Vec<Loader> = artifact.loader_tags().collect();
        let loaders: Vec<Loader> = info.loaders.iter().copied().collect();
        let loader = join_loaders(widen_loaders(&loaders, &tags));

        let mut seen = HashSet::new();
        let versions: Vec<Version> = info
            .mods
            .into_iter()
            // One row per mod id; the first declared version wins
            .filter(|entry| seen.insert(entry.mod_id.clone()))
            .map(|entry| Version {
                id: None,
                project_id: project.id,
                file_id: artifact.id,
                mod_id: entry.mod_id,
                version: entry.version,
                loader: loader.clone(),
                game_versions: artifact.joined_game_versions(),
                release_type: artifact.release_type,
                release_date: artifact.file_date,
                url: reference_url(project, artifact),
            })
            .collect();

        let mut matching = None;
        for stored in self.store.insert_all(&versions)? {
            info!(
                "Resolved {} {} ({}) from file {} of project {}",
                stored.mod_id, stored.version, stored.loader, artifact.id, project.id
            );

            if stored.mod_id.eq_ignore_ascii_case(wanted_mod_id) {
                matching = Some(stored);
            }
        }

        Ok(matching)
    }

    fn refresh_existing(
        &self,
        existing: Vec<Version>,
        artifact: &Artifact,
        wanted_mod_id: &str,
    ) -> Result<Option<Version>, StoreError> {
        let tags: Vec<Loader> = artifact.loader_tags().collect();
        let mut matching = None;

        for mut version in existing {
            let tags_changed = !same_tags(
                &split_joined(&version.game_versions).collect::<Vec<_>>(),
                &artifact.game_versions,
            );
            let type_changed = version.release_type != artifact.release_type;

            if tags_changed || type_changed {
                debug!(
                    "File {} metadata changed, updating row {:?}",
                    artifact.id, version.id
                );
                version.game_versions = artifact.joined_game_versions();
                version.release_type = artifact.release_type;
                if !version.loader.is_empty() {
                    version.loader =
                        join_loaders(widen_loaders(&parse_loaders(&version.loader), &tags));
                }
                self.store.update(&version)?;
            }

            if !version.mod_id.is_empty() && version.mod_id.eq_ignore_ascii_case(wanted_mod_id) {
                matching = Some(version);
            }
        }

        Ok(matching)
    }
}

/// Order-insensitive comparison of two tag lists
pub fn same_tags<A: AsRef<str>, B: AsRef<str>>(stored: &[A], current: &[B]) -> bool {
    let stored: HashSet<&str> = stored.iter().map(AsRef::as_ref).collect();
    let current: HashSet<&str> = current.iter().map(AsRef::as_ref).collect();
    stored == current
}
