//! `META-INF/mods.toml` parser (Forge and NeoForge)

use indexmap::IndexMap;
use serde::Deserialize;

use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::{ManifestInfo, ModEntry};
use crate::version::types::Loader;

#[derive(Debug, Deserialize)]
struct ModsToml {
    #[serde(default)]
    mods: Vec<TomlMod>,
    /// Dependency blocks keyed by the declaring mod id
    #[serde(default)]
    dependencies: IndexMap<String, Vec<TomlDependency>>,
}

#[derive(Debug, Deserialize)]
struct TomlMod {
    #[serde(rename = "modId")]
    mod_id: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
struct TomlDependency {
    #[serde(rename = "modId")]
    mod_id: String,
}

/// Parser for Forge-style TOML mod descriptors
pub struct ModsTomlParser {
    entry_name: &'static str,
    default_loader: Loader,
}

impl ModsTomlParser {
    /// `META-INF/mods.toml`, read by Forge and by NeoForge before 1.20.5
    pub fn forge() -> Self {
        Self {
            entry_name: "META-INF/mods.toml",
            default_loader: Loader::Forge,
        }
    }

    /// `META-INF/neoforge.mods.toml`, read by NeoForge from 1.20.5
    pub fn neoforge() -> Self {
        Self {
            entry_name: "META-INF/neoforge.mods.toml",
            default_loader: Loader::NeoForge,
        }
    }

    /// First dependency, in declaration order, naming a known loader
    fn declared_loader(manifest: &ModsToml) -> Option<Loader> {
        manifest
            .dependencies
            .values()
            .flatten()
            .find_map(|dependency| dependency.mod_id.parse().ok())
    }
}

impl ManifestParser for ModsTomlParser {
    fn entry_name(&self) -> &'static str {
        self.entry_name
    }

    fn parse(&self, content: &[u8]) -> Result<ManifestInfo, ParseError> {
        let content = std::str::from_utf8(content)?;
        let manifest: ModsToml = toml::from_str(content)?;

        let loader = Self::declared_loader(&manifest).unwrap_or(self.default_loader);
        let mods = manifest
            .mods
            .into_iter()
            .map(|m| ModEntry::new(m.mod_id, m.version));

        Ok(ManifestInfo::new(loader, mods))
    }
}
