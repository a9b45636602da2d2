//! Durable store of resolved versions

#[cfg(test)]
use mockall::automock;

use crate::version::error::StoreError;
use crate::version::types::Version;

/// Predicate for [`VersionStore::find`]; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionQuery {
    pub project_id: i64,
    pub file_id: Option<i64>,
    pub mod_id: Option<String>,
}

impl VersionQuery {
    pub fn project(project_id: i64) -> Self {
        Self {
            project_id,
            ..Default::default()
        }
    }

    pub fn file(mut self, file_id: i64) -> Self {
        self.file_id = Some(file_id);
        self
    }

    pub fn mod_id(mut self, mod_id: &str) -> Self {
        self.mod_id = Some(mod_id.to_string());
        self
    }
}

/// Trait for storing and retrieving resolved versions
#[cfg_attr(test, automock)]
pub trait VersionStore: Send + Sync + 'static {
    /// All rows matching the query, ordered by surrogate id
    fn find(&self, query: &VersionQuery) -> Result<Vec<Version>, StoreError>;

    /// Persist a new row and return it with its id assigned.
    ///
    /// Inserting a row whose (project, file, mod id) already exists keeps the
    /// existing row and returns it.
    fn insert(&self, version: &Version) -> Result<Version, StoreError>;

    /// Persist the rows of one artifact atomically.
    ///
    /// A concurrent `find` sees either none or all of them. Rows whose
    /// identity already exists are returned as stored.
    fn insert_all(&self, versions: &[Version]) -> Result<Vec<Version>, StoreError>;

    /// Overwrite the mutable fields of a persisted row
    fn update(&self, version: &Version) -> Result<(), StoreError>;
}
