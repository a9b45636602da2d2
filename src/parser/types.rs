//! Common types for manifest parsers

use indexmap::IndexSet;

use crate::version::types::{Loader, join_loaders};

/// Version value meaning "use the jar manifest's Implementation-Version"
pub const JAR_VERSION_PLACEHOLDER: &str = "${file.jarVersion}";

/// One mod declared by a manifest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModEntry {
    pub mod_id: String,
    pub version: String,
}

impl ModEntry {
    pub fn new(mod_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            mod_id: mod_id.into(),
            version: version.into(),
        }
    }
}

/// Parsed result of inspecting an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestInfo {
    /// Declared mods, unique by (mod id, version), in declaration order
    pub mods: IndexSet<ModEntry>,
    /// Loaders the archive targets, unique, in discovery order
    pub loaders: IndexSet<Loader>,
}

impl ManifestInfo {
    pub fn new(loader: Loader, mods: impl IntoIterator<Item = ModEntry>) -> Self {
        Self {
            mods: mods.into_iter().collect(),
            loaders: IndexSet::from([loader]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Merge another manifest found in the same archive
    pub fn merge(&mut self, other: ManifestInfo) {
        self.mods.extend(other.mods);
        self.loaders.extend(other.loaders);
    }

    /// Comma-joined loader identity
    pub fn loader(&self) -> String {
        join_loaders(self.loaders.iter().copied())
    }

    /// Substitute the jar version placeholder with a concrete version
    pub fn resolve_placeholder(&mut self, implementation_version: &str) {
        if !self
            .mods
            .iter()
            .any(|m| m.version == JAR_VERSION_PLACEHOLDER)
        {
            return;
        }

        self.mods = self
            .mods
            .drain(..)
            .map(|m| {
                if m.version == JAR_VERSION_PLACEHOLDER {
                    ModEntry::new(m.mod_id, implementation_version)
                } else {
                    m
                }
            })
            .collect();
    }
}
