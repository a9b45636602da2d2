//! Parser trait definition

use crate::parser::types::ManifestInfo;

/// Trait for parsing one kind of manifest embedded in a mod archive
pub trait ManifestParser: Send + Sync {
    /// Archive entry this parser reads (e.g. `fabric.mod.json`)
    fn entry_name(&self) -> &'static str;

    /// Parse the entry content and extract mods and loader identity
    fn parse(&self, content: &[u8]) -> Result<ManifestInfo, ParseError>;
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Malformed TOML manifest
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON manifest
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Manifest is not valid UTF-8
    #[error("Invalid encoding: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The archive itself could not be opened or read
    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
