//! `quilt.mod.json` parser

use serde::Deserialize;

use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::{ManifestInfo, ModEntry};
use crate::version::types::Loader;

#[derive(Debug, Deserialize)]
struct QuiltLoaderSection {
    id: String,
    #[serde(default)]
    version: String,
}

/// Accepted shapes: the schema's nested `quilt_loader` object, or a flat
/// Fabric-like descriptor
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuiltMod {
    Nested { quilt_loader: QuiltLoaderSection },
    Flat(QuiltLoaderSection),
}

/// Parser for Quilt mod descriptors
pub struct QuiltModJsonParser;

impl QuiltModJsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QuiltModJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for QuiltModJsonParser {
    fn entry_name(&self) -> &'static str {
        "quilt.mod.json"
    }

    fn parse(&self, content: &[u8]) -> Result<ManifestInfo, ParseError> {
        let section = match serde_json::from_slice(content)? {
            QuiltMod::Nested { quilt_loader } => quilt_loader,
            QuiltMod::Flat(section) => section,
        };
        Ok(ManifestInfo::new(
            Loader::Quilt,
            [ModEntry::new(section.id, section.version)],
        ))
    }
}
