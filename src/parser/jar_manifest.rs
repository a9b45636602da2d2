//! `META-INF/MANIFEST.MF` reader

use std::collections::HashMap;

pub const JAR_MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Main attributes of a jar manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarManifest {
    attributes: HashMap<String, String>,
}

impl JarManifest {
    /// Parse the main section. Continuation lines start with a single space.
    pub fn parse(content: &str) -> Self {
        let mut attributes: HashMap<String, String> = HashMap::new();
        let mut current_key: Option<String> = None;

        for line in content.lines() {
            let line = line.trim_end_matches('\r');

            // A blank line ends the main section
            if line.is_empty() {
                break;
            }

            if let Some(rest) = line.strip_prefix(' ') {
                if let Some(value) = current_key.as_ref().and_then(|k| attributes.get_mut(k)) {
                    value.push_str(rest);
                }
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_string();
                attributes
                    .entry(key.clone())
                    .or_insert_with(|| value.trim().to_string());
                current_key = Some(key);
            }
        }

        Self { attributes }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn implementation_version(&self) -> Option<&str> {
        self.get("Implementation-Version").filter(|v| !v.is_empty())
    }
}
