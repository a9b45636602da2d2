#![allow(dead_code)]

pub mod jar;
pub mod repository;

pub use jar::{build_jar, fabric_mod_json, forge_mods_toml};
pub use repository::{FakeRepository, artifact, create_test_store, project};
