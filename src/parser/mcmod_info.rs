//! `mcmod.info` parser (legacy Forge, before 1.13)

use serde::Deserialize;

use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::{ManifestInfo, ModEntry};
use crate::version::types::Loader;

#[derive(Debug, Deserialize)]
struct LegacyMod {
    modid: String,
    #[serde(default)]
    version: String,
}

/// The two shapes found in the wild: a bare list of descriptors, or the
/// `modListVersion: 2` object wrapping them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum McModInfo {
    List(Vec<LegacyMod>),
    Wrapped {
        #[serde(rename = "modList")]
        mod_list: Vec<LegacyMod>,
    },
}

impl McModInfo {
    fn into_mods(self) -> Vec<LegacyMod> {
        match self {
            McModInfo::List(mods) => mods,
            McModInfo::Wrapped { mod_list } => mod_list,
        }
    }
}

/// Parser for legacy Forge `mcmod.info` descriptors
pub struct McModInfoParser;

impl McModInfoParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for McModInfoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for McModInfoParser {
    fn entry_name(&self) -> &'static str {
        "mcmod.info"
    }

    fn parse(&self, content: &[u8]) -> Result<ManifestInfo, ParseError> {
        let info: McModInfo = serde_json::from_slice(content)?;
        let mods = info
            .into_mods()
            .into_iter()
            .map(|m| ModEntry::new(m.modid, m.version));
        Ok(ManifestInfo::new(Loader::Forge, mods))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"[
  {
    "modid": "examplemod",
    "name": "Example Mod",
    "version": "1.7.10-2.3",
    "mcversion": "1.7.10"
  }
]"#)]
    #[case(r#"{
  "modListVersion": 2,
  "modList": [
    { "modid": "examplemod", "version": "1.7.10-2.3" }
  ]
}"#)]
    fn parse_accepts_list_and_wrapped_shapes(#[case] content: &str) {
        let info = McModInfoParser::new().parse(content.as_bytes()).unwrap();

        assert_eq!(
            info,
            ManifestInfo::new(Loader::Forge, [ModEntry::new("examplemod", "1.7.10-2.3")])
        );
    }

    #[test]
    fn parse_reads_every_descriptor_of_a_list() {
        let content = r#"[
  { "modid": "core", "version": "1.0" },
  { "modid": "addon", "version": "1.1" }
]"#;
        let info = McModInfoParser::new().parse(content.as_bytes()).unwrap();

        assert_eq!(
            info.mods.iter().cloned().collect::<Vec<_>>(),
            vec![ModEntry::new("core", "1.0"), ModEntry::new("addon", "1.1")]
        );
    }

    #[test]
    fn parse_rejects_modern_field_name() {
        let result = McModInfoParser::new().parse(br#"[{"id": "examplemod"}]"#);
        assert!(matches!(result, Err(ParseError::Json(_))));
    }
}
