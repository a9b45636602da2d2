use std::path::PathBuf;
use std::time::Duration;

use crate::version::types::Loader;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default lifetime of a cached response (1 hour)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Default period between sweeps of expired cache entries (1 hour)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

// =============================================================================
// Repository constants
// =============================================================================

/// Default base URL for the CurseForge API
pub const DEFAULT_API_BASE_URL: &str = "https://api.curseforge.com";

/// CurseForge game id for Minecraft, the only supported game
pub const MINECRAFT_GAME_ID: i64 = 432;

/// Number of files requested per page when listing a project's files
pub const PAGE_SIZE: usize = 50;

/// Hard ceiling on pages fetched (CurseForge rejects `index + pageSize > 10000`)
pub const MAX_PAGES: usize = 10_000 / PAGE_SIZE;

/// Default number of artifacts downloaded and inspected concurrently
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid duration for {name}: {value:?}")]
    InvalidDuration { name: &'static str, value: String },

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Lifetime of a cached response
    pub cache_ttl: Duration,
    /// Period of the background sweep over expired responses
    pub sweep_interval: Duration,
    /// CurseForge API key, sent as `x-api-key`
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub database_path: PathBuf,
    /// Upper bound on concurrent artifact downloads per request
    pub max_in_flight: usize,
    /// Loader used when a request names none
    pub default_loader: Loader,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            database_path: db_path(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            default_loader: Loader::Forge,
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("CACHE_TTL") {
            config.cache_ttl = parse_duration(&value).ok_or(ConfigError::InvalidDuration {
                name: "CACHE_TTL",
                value,
            })?;
        }

        if let Some(value) = lookup("CACHE_SWEEP_INTERVAL") {
            let interval = parse_duration(&value).ok_or_else(|| ConfigError::InvalidDuration {
                name: "CACHE_SWEEP_INTERVAL",
                value: value.clone(),
            })?;
            // The sweeper's ticker needs a non-zero period
            if interval.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name: "CACHE_SWEEP_INTERVAL",
                    value,
                });
            }
            config.sweep_interval = interval;
        }

        config.api_key = lookup("CURSEFORGE_KEY");

        if let Some(value) = lookup("CURSEFORGE_URL") {
            config.api_base_url = value.trim_end_matches('/').to_string();
        }

        if let Some(value) = lookup("UPDATEJSON_DB") {
            config.database_path = PathBuf::from(value);
        }

        if let Some(value) = lookup("MAX_IN_FLIGHT") {
            config.max_in_flight = value
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "MAX_IN_FLIGHT",
                    value,
                })?;
        }

        if let Some(value) = lookup("DEFAULT_LOADER") {
            config.default_loader = value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "DEFAULT_LOADER",
                value,
            })?;
        }

        Ok(config)
    }
}

/// Parse a Go-style duration such as `1h`, `90s`, `1h30m` or `250ms`.
/// A bare integer is read as seconds.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(secs) = input.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let value: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        rest = &rest[unit_len..];

        total += value * seconds_per_unit;
    }

    Duration::try_from_secs_f64(total).ok()
}

/// Returns the path to the data directory for updatejson.
/// Uses $XDG_DATA_HOME/updatejson if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/updatejson,
/// or ./updatejson if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("versions.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("updatejson.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("updatejson")
}
