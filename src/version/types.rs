//! Domain types shared by the resolver, the store and the aggregator

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A tag is a genuine game version iff it contains only digits and dots
static GAME_VERSION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9.]+$").expect("valid game version pattern"));

/// Mod-loading runtime a build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    /// Legacy loader; default when a manifest names none
    Forge,
    /// Fork of Forge
    NeoForge,
    Fabric,
    /// Fork of Fabric, also loads Fabric mods
    Quilt,
}

impl Loader {
    pub fn as_str(&self) -> &'static str {
        match self {
            Loader::Forge => "forge",
            Loader::NeoForge => "neoforge",
            Loader::Fabric => "fabric",
            Loader::Quilt => "quilt",
        }
    }

    /// The fork a build for this loader is also compatible with when the
    /// repository tags say so
    pub fn compatible_fork(&self) -> Option<Loader> {
        match self {
            Loader::Forge => Some(Loader::NeoForge),
            Loader::Fabric => Some(Loader::Quilt),
            Loader::NeoForge | Loader::Quilt => None,
        }
    }
}

impl FromStr for Loader {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forge" => Ok(Loader::Forge),
            "neoforge" => Ok(Loader::NeoForge),
            "fabric" => Ok(Loader::Fabric),
            "quilt" => Ok(Loader::Quilt),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release channel of an artifact, using the repository's integer codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "i64")]
pub enum ReleaseType {
    Release,
    Beta,
    Alpha,
    Other(i64),
}

impl ReleaseType {
    pub fn code(&self) -> i64 {
        match self {
            ReleaseType::Release => 1,
            ReleaseType::Beta => 2,
            ReleaseType::Alpha => 3,
            ReleaseType::Other(code) => *code,
        }
    }

    /// Whether artifacts of this type contend for `<tag>-recommended`
    pub fn is_recommended(&self) -> bool {
        matches!(self, ReleaseType::Release)
    }
}

impl From<i64> for ReleaseType {
    fn from(code: i64) -> Self {
        match code {
            1 => ReleaseType::Release,
            2 => ReleaseType::Beta,
            3 => ReleaseType::Alpha,
            other => ReleaseType::Other(other),
        }
    }
}

/// A project in the external repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub game_id: i64,
    pub website_url: String,
}

/// One uploaded build of a project (a "file" in repository terms)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: i64,
    pub file_date: DateTime<Utc>,
    pub download_url: Option<String>,
    pub release_type: ReleaseType,
    pub is_available: bool,
    /// Game versions and loader names, unfiltered
    pub game_versions: Vec<String>,
}

impl Artifact {
    /// Loaders named in the tag set
    pub fn loader_tags(&self) -> impl Iterator<Item = Loader> + '_ {
        self.game_versions.iter().filter_map(|tag| tag.parse().ok())
    }

    pub fn joined_game_versions(&self) -> String {
        self.game_versions.join(",")
    }
}

/// Resolved record persisted once per (project, artifact, mod id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Surrogate key, `None` until persisted
    pub id: Option<i64>,
    pub project_id: i64,
    pub file_id: i64,
    /// Empty for the placeholder row of an artifact without manifests
    pub mod_id: String,
    pub version: String,
    /// Comma-joined loader names
    pub loader: String,
    /// Comma-joined repository tags
    pub game_versions: String,
    pub release_type: ReleaseType,
    pub release_date: DateTime<Utc>,
    pub url: String,
}

impl Version {
    /// Row recording that an artifact was inspected and held no manifest
    pub fn placeholder(project: &Project, artifact: &Artifact) -> Self {
        Self {
            id: None,
            project_id: project.id,
            file_id: artifact.id,
            mod_id: String::new(),
            version: String::new(),
            loader: String::new(),
            game_versions: artifact.joined_game_versions(),
            release_type: artifact.release_type,
            release_date: artifact.file_date,
            url: reference_url(project, artifact),
        }
    }

    pub fn game_version_tags(&self) -> impl Iterator<Item = &str> {
        split_joined(&self.game_versions)
    }

    /// Whether the loader set names `loader`, ignoring case
    pub fn supports_loader(&self, loader: &str) -> bool {
        split_joined(&self.loader).any(|l| l.eq_ignore_ascii_case(loader))
    }
}

/// Link shown to end users for an artifact
pub fn reference_url(project: &Project, artifact: &Artifact) -> String {
    format!(
        "{}/files/{}",
        project.website_url.trim_end_matches('/'),
        artifact.id
    )
}

/// Whether a repository tag is a game version rather than a loader name
pub fn is_game_version_tag(tag: &str) -> bool {
    GAME_VERSION_TAG.is_match(tag)
}

/// Split a comma-joined column, skipping empty segments
pub fn split_joined(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Join loaders into the stored comma-separated form, dropping duplicates
pub fn join_loaders<I: IntoIterator<Item = Loader>>(loaders: I) -> String {
    let mut seen: Vec<Loader> = Vec::new();
    for loader in loaders {
        if !seen.contains(&loader) {
            seen.push(loader);
        }
    }
    seen.iter()
        .map(Loader::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Widen a loader set with the forks the artifact's tags declare.
///
/// A Forge build tagged NeoForge also serves NeoForge; a Fabric build tagged
/// Quilt also serves Quilt.
pub fn widen_loaders(loaders: &[Loader], tags: &[Loader]) -> Vec<Loader> {
    let mut widened = loaders.to_vec();
    for loader in loaders {
        if let Some(fork) = loader.compatible_fork()
            && tags.contains(&fork)
            && !widened.contains(&fork)
        {
            widened.push(fork);
        }
    }
    widened
}

/// Parse a stored comma-joined loader column, skipping unknown names
pub fn parse_loaders(joined: &str) -> Vec<Loader> {
    split_joined(joined).filter_map(|l| l.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.20.1", true)]
    #[case("1.7.10", true)]
    #[case("1", true)]
    #[case("Forge", false)]
    #[case("NeoForge", false)]
    #[case("1.20-Snapshot", false)]
    #[case("Java 17", false)]
    #[case("", false)]
    fn is_game_version_tag_returns_expected(#[case] tag: &str, #[case] expected: bool) {
        assert_eq!(is_game_version_tag(tag), expected);
    }

    #[rstest]
    #[case("forge", Ok(Loader::Forge))]
    #[case("Forge", Ok(Loader::Forge))]
    #[case("NeoForge", Ok(Loader::NeoForge))]
    #[case(" fabric ", Ok(Loader::Fabric))]
    #[case("QUILT", Ok(Loader::Quilt))]
    #[case("Rift", Err(()))]
    fn loader_from_str_ignores_case(#[case] input: &str, #[case] expected: Result<Loader, ()>) {
        assert_eq!(input.parse::<Loader>(), expected);
    }

    #[rstest]
    #[case(1, ReleaseType::Release, true)]
    #[case(2, ReleaseType::Beta, false)]
    #[case(3, ReleaseType::Alpha, false)]
    #[case(7, ReleaseType::Other(7), false)]
    fn release_type_from_code(
        #[case] code: i64,
        #[case] expected: ReleaseType,
        #[case] recommended: bool,
    ) {
        let release_type = ReleaseType::from(code);
        assert_eq!(release_type, expected);
        assert_eq!(release_type.code(), code);
        assert_eq!(release_type.is_recommended(), recommended);
    }

    #[test]
    fn join_loaders_drops_duplicates_and_keeps_order() {
        let joined = join_loaders([Loader::Forge, Loader::Fabric, Loader::Forge]);
        assert_eq!(joined, "forge,fabric");
    }

    #[rstest]
    #[case(vec![Loader::Forge], vec![Loader::NeoForge], vec![Loader::Forge, Loader::NeoForge])]
    #[case(vec![Loader::Forge], vec![], vec![Loader::Forge])]
    #[case(vec![Loader::Fabric], vec![Loader::Quilt], vec![Loader::Fabric, Loader::Quilt])]
    #[case(vec![Loader::Fabric], vec![Loader::NeoForge], vec![Loader::Fabric])]
    #[case(vec![Loader::NeoForge], vec![Loader::Forge], vec![Loader::NeoForge])]
    #[case(vec![Loader::Forge, Loader::NeoForge], vec![Loader::NeoForge], vec![Loader::Forge, Loader::NeoForge])]
    fn widen_loaders_adds_tagged_forks(
        #[case] loaders: Vec<Loader>,
        #[case] tags: Vec<Loader>,
        #[case] expected: Vec<Loader>,
    ) {
        assert_eq!(widen_loaders(&loaders, &tags), expected);
    }

    #[test]
    fn supports_loader_matches_any_member_ignoring_case() {
        let project = Project {
            id: 1,
            game_id: 432,
            website_url: "https://example.com/mc-mods/demo".to_string(),
        };
        let artifact = Artifact {
            id: 42,
            file_date: Utc::now(),
            download_url: None,
            release_type: ReleaseType::Release,
            is_available: true,
            game_versions: vec!["1.20.1".to_string(), "Forge".to_string()],
        };
        let mut version = Version::placeholder(&project, &artifact);
        version.loader = "forge,neoforge".to_string();

        assert!(version.supports_loader("NeoForge"));
        assert!(version.supports_loader("forge"));
        assert!(!version.supports_loader("fabric"));
        assert_eq!(version.url, "https://example.com/mc-mods/demo/files/42");
        assert_eq!(
            version.game_version_tags().collect::<Vec<_>>(),
            vec!["1.20.1", "Forge"]
        );
    }

    #[test]
    fn artifact_loader_tags_skips_game_versions() {
        let artifact = Artifact {
            id: 1,
            file_date: Utc::now(),
            download_url: None,
            release_type: ReleaseType::Beta,
            is_available: true,
            game_versions: vec![
                "1.20.1".to_string(),
                "NeoForge".to_string(),
                "Forge".to_string(),
            ],
        };

        assert_eq!(
            artifact.loader_tags().collect::<Vec<_>>(),
            vec![Loader::NeoForge, Loader::Forge]
        );
    }
}
