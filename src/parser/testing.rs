//! Jar fixtures for unit tests

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

/// Build an in-memory zip archive from (entry name, content) pairs
pub(crate) fn build_jar(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
