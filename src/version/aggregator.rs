//! Feed aggregation: latest and recommended version per game version

use std::collections::BTreeMap;

use serde::Serialize;

use crate::version::types::{Version, is_game_version_tag};

/// Computed answer for one (project, mod id, loader)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feed {
    /// `<tag>-latest` / `<tag>-recommended` to version string
    pub promos: BTreeMap<String, String>,
    /// Same keys as `promos`, to reference URLs
    #[serde(skip)]
    pub references: BTreeMap<String, String>,
    pub homepage: String,
}

impl Feed {
    pub fn is_empty(&self) -> bool {
        self.promos.is_empty()
    }
}

/// Pick the winning row for each promo key.
///
/// Only rows for `mod_id` (ignoring case) whose loader set contains `loader` take part.
/// A later release date wins; on equal dates the higher file id wins so the
/// result does not depend on the order of `versions`.
pub fn aggregate(homepage: &str, versions: &[Version], mod_id: &str, loader: &str) -> Feed {
    let mut winners: BTreeMap<String, &Version> = BTreeMap::new();

    for version in versions
        .iter()
        .filter(|v| !v.mod_id.is_empty() && v.mod_id.eq_ignore_ascii_case(mod_id))
        .filter(|v| v.supports_loader(loader))
    {
        for tag in version.game_version_tags().filter(|t| is_game_version_tag(t)) {
            offer(&mut winners, format!("{}-latest", tag), version);
            if version.release_type.is_recommended() {
                offer(&mut winners, format!("{}-recommended", tag), version);
            }
        }
    }

    let mut feed = Feed {
        homepage: homepage.to_string(),
        ..Default::default()
    };
    for (key, version) in winners {
        feed.promos.insert(key.clone(), version.version.clone());
        feed.references.insert(key, version.url.clone());
    }
    feed
}

fn offer<'a>(winners: &mut BTreeMap<String, &'a Version>, key: String, candidate: &'a Version) {
    match winners.get(&key) {
        Some(holder) if !is_newer(candidate, holder) => {}
        _ => {
            winners.insert(key, candidate);
        }
    }
}

fn is_newer(candidate: &Version, holder: &Version) -> bool {
    (candidate.release_date, candidate.file_id) > (holder.release_date, holder.file_id)
}
