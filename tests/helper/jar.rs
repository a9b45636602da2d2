//! In-memory mod jars

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Build a jar holding the given (entry name, content) pairs
pub fn build_jar(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// `META-INF/mods.toml` declaring one mod, with an optional loader dependency
pub fn forge_mods_toml(mod_id: &str, version: &str, loader: Option<&str>) -> String {
    let mut toml = format!(
        "modLoader=\"javafml\"\n\n[[mods]]\nmodId=\"{}\"\nversion=\"{}\"\n",
        mod_id, version
    );
    if let Some(loader) = loader {
        toml.push_str(&format!(
            "\n[[dependencies.{}]]\nmodId=\"{}\"\nmandatory=true\n",
            mod_id, loader
        ));
    }
    toml
}

pub fn fabric_mod_json(mod_id: &str, version: &str) -> String {
    format!(
        r#"{{"schemaVersion": 1, "id": "{}", "version": "{}"}}"#,
        mod_id, version
    )
}
