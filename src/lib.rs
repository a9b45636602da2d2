//! Forge-style `update.json` feeds for CurseForge projects
//!
//! Given a project, a mod id and a loader, answers which version of the mod is
//! the latest and the recommended one for every game version it was built for.
//! Build artifacts are downloaded and inspected once, the embedded manifests are
//! persisted, and computed answers are memoized for a short TTL.

pub mod config;
pub mod logging;
pub mod parser;
pub mod service;
pub mod version;
