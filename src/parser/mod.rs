//! Parser layer
//! - traits.rs: ManifestParser trait definition
//! - types.rs: Common types (ManifestInfo, ModEntry)
//! - mods_toml.rs: Forge/NeoForge mods.toml parser
//! - fabric_mod_json.rs: fabric.mod.json parser
//! - quilt_mod_json.rs: quilt.mod.json parser
//! - mcmod_info.rs: legacy mcmod.info parser
//! - jar_manifest.rs: META-INF/MANIFEST.MF reader
//! - archive.rs: runs the parsers over a jar and merges the results

pub mod archive;
pub mod fabric_mod_json;
pub mod jar_manifest;
pub mod mcmod_info;
pub mod mods_toml;
pub mod quilt_mod_json;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use archive::ArchiveInspector;
pub use fabric_mod_json::FabricModJsonParser;
pub use mcmod_info::McModInfoParser;
pub use mods_toml::ModsTomlParser;
pub use quilt_mod_json::QuiltModJsonParser;
pub use traits::{ManifestParser, ParseError};
pub use types::{ManifestInfo, ModEntry};
