// Configuration loading and parsing (dashboard.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::draft::team::LeagueShape;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// dashboard.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub draft: DraftConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub valuations: ValuationsConfig,
    #[serde(default)]
    pub filters: FilterDefaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    #[serde(default)]
    pub draft_id: String,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default = "default_num_teams")]
    pub num_teams: u32,
    #[serde(default = "default_team_budget")]
    pub team_budget: u32,
    #[serde(default = "default_bench_spots")]
    pub bench_spots: usize,
    #[serde(default)]
    pub draft_order: Vec<String>,
}

impl DraftConfig {
    pub fn league_shape(&self) -> LeagueShape {
        LeagueShape {
            num_teams: self.num_teams,
            team_budget: self.team_budget,
            bench_spots: self.bench_spots,
            draft_order: self.draft_order.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Empty means "use the platform data directory".
    #[serde(default)]
    pub db_path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValuationsConfig {
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RangeBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FilterDefaults {
    #[serde(default = "default_price_bounds")]
    pub price: RangeBounds,
    #[serde(default = "default_price_bounds")]
    pub expected_price: RangeBounds,
    #[serde(default = "default_inflation_bounds")]
    pub inflation: RangeBounds,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            price: default_price_bounds(),
            expected_price: default_price_bounds(),
            inflation: default_inflation_bounds(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_num_teams() -> u32 {
    12
}

fn default_team_budget() -> u32 {
    200
}

fn default_bench_spots() -> usize {
    6
}

fn default_price_bounds() -> RangeBounds {
    RangeBounds {
        min: 0.0,
        max: 100.0,
    }
}

fn default_inflation_bounds() -> RangeBounds {
    RangeBounds {
        min: -100.0,
        max: 100.0,
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/dashboard.toml` relative to
/// `base_dir`. Does not copy defaults; prefer `load_config()`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("dashboard.toml");
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Loads config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

/// Resolve the SQLite path: the configured one, or `cache.db` under the
/// platform data directory.
pub fn resolve_db_path(cache: &CacheConfig) -> PathBuf {
    if !cache.db_path.trim().is_empty() {
        return PathBuf::from(&cache.db_path);
    }
    directories::ProjectDirs::from("", "", "draft-inflation")
        .map(|dirs| dirs.data_dir().join("cache.db"))
        .unwrap_or_else(|| PathBuf::from("draft-inflation-cache.db"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.server.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "server.base_url".into(),
            message: format!("must start with http:// or https://, got {base_url:?}"),
        });
    }

    let positive_fields: &[(&str, u64)] = &[
        (
            "server.request_timeout_secs",
            config.server.request_timeout_secs,
        ),
        ("draft.num_teams", u64::from(config.draft.num_teams)),
        ("draft.team_budget", u64::from(config.draft.team_budget)),
        ("polling.interval_secs", config.polling.interval_secs),
    ];
    for (name, val) in positive_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be greater than 0".into(),
            });
        }
    }

    if config.draft.draft_order.len() > config.draft.num_teams as usize {
        return Err(ConfigError::ValidationError {
            field: "draft.draft_order".into(),
            message: format!(
                "has {} entries but num_teams is {}",
                config.draft.draft_order.len(),
                config.draft.num_teams
            ),
        });
    }

    let f = &config.filters;
    let ranges: &[(&str, RangeBounds)] = &[
        ("filters.price", f.price),
        ("filters.expected_price", f.expected_price),
        ("filters.inflation", f.inflation),
    ];
    for (name, range) in ranges {
        if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("min ({}) must not exceed max ({})", range.min, range.max),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
