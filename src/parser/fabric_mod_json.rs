//! `fabric.mod.json` parser

use serde::Deserialize;

use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::{ManifestInfo, ModEntry};
use crate::version::types::Loader;

#[derive(Debug, Deserialize)]
struct FabricMod {
    id: String,
    #[serde(default)]
    version: String,
}

/// Parser for Fabric mod descriptors
pub struct FabricModJsonParser;

impl FabricModJsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FabricModJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for FabricModJsonParser {
    fn entry_name(&self) -> &'static str {
        "fabric.mod.json"
    }

    fn parse(&self, content: &[u8]) -> Result<ManifestInfo, ParseError> {
        let descriptor: FabricMod = serde_json::from_slice(content)?;
        Ok(ManifestInfo::new(
            Loader::Fabric,
            [ModEntry::new(descriptor.id, descriptor.version)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_single_mod_with_fabric_loader() {
        let content = r#"{
  "schemaVersion": 1,
  "id": "examplemod",
  "version": "1.2.0+1.20.1",
  "name": "Example Mod",
  "depends": { "fabricloader": ">=0.14" }
}"#;
        let info = FabricModJsonParser::new()
            .parse(content.as_bytes())
            .unwrap();

        assert_eq!(
            info,
            ManifestInfo::new(
                Loader::Fabric,
                [ModEntry::new("examplemod", "1.2.0+1.20.1")]
            )
        );
    }

    #[test]
    fn parse_rejects_descriptor_without_id() {
        let result = FabricModJsonParser::new().parse(br#"{"version": "1.0"}"#);
        assert!(matches!(result, Err(ParseError::Json(_))));
    }
}
