//! Archive inspection: runs every manifest parser over a mod jar

use std::io::{Cursor, Read, Seek};

use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::parser::fabric_mod_json::FabricModJsonParser;
use crate::parser::jar_manifest::{JAR_MANIFEST_ENTRY, JarManifest};
use crate::parser::mcmod_info::McModInfoParser;
use crate::parser::mods_toml::ModsTomlParser;
use crate::parser::quilt_mod_json::QuiltModJsonParser;
use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::ManifestInfo;

/// Finds and merges the manifests embedded in an archive
pub struct ArchiveInspector {
    parsers: Vec<Box<dyn ManifestParser>>,
}

impl ArchiveInspector {
    pub fn new(parsers: Vec<Box<dyn ManifestParser>>) -> Self {
        Self { parsers }
    }

    /// Inspect raw archive bytes.
    ///
    /// Returns `Ok(None)` when no known manifest is present. A manifest that
    /// fails to parse is logged and skipped; only an unreadable archive is an
    /// error.
    pub fn inspect(&self, bytes: &[u8]) -> Result<Option<ManifestInfo>, ParseError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut merged: Option<ManifestInfo> = None;
        for parser in &self.parsers {
            let content = match read_entry(&mut archive, parser.entry_name()) {
                Ok(Some(content)) => content,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Error reading {}: {}", parser.entry_name(), e);
                    continue;
                }
            };

            match parser.parse(&content) {
                Ok(info) => {
                    debug!(
                        "Found {} mods in {} ({})",
                        info.mods.len(),
                        parser.entry_name(),
                        info.loader()
                    );
                    match merged.as_mut() {
                        Some(existing) => existing.merge(info),
                        None => merged = Some(info),
                    }
                }
                Err(e) => warn!("Error parsing {}: {}", parser.entry_name(), e),
            }
        }

        if let Some(info) = merged.as_mut()
            && let Some(version) = implementation_version(&mut archive)
        {
            info.resolve_placeholder(&version);
        }

        Ok(merged)
    }
}

impl Default for ArchiveInspector {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ModsTomlParser::forge()),
            Box::new(ModsTomlParser::neoforge()),
            Box::new(FabricModJsonParser::new()),
            Box::new(QuiltModJsonParser::new()),
            Box::new(McModInfoParser::new()),
        ])
    }
}

/// Read a whole entry, `None` when the archive has no such entry
fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, ParseError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(Some(content))
}

fn implementation_version<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Option<String> {
    let content = match read_entry(archive, JAR_MANIFEST_ENTRY) {
        Ok(content) => content?,
        Err(e) => {
            warn!("Error reading {}: {}", JAR_MANIFEST_ENTRY, e);
            return None;
        }
    };

    let content = String::from_utf8_lossy(&content);
    JarManifest::parse(&content)
        .implementation_version()
        .map(str::to_string)
}
