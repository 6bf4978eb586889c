//! Configuration loading and secret resolution
//!
//! Settings come from a TOML file; secrets resolve with priority
//! ENV → TOML. Missing store credentials are fatal, a missing generation
//! key only disables AI commentary.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::generation::DEFAULT_PROMPT_TEMPLATE;
use crate::models::{Roster, DEFAULT_CATEGORIES, DEFAULT_PARTICIPANTS};
use crate::voting::DEFAULT_WINDOW_HOURS;
use crate::{Error, Result};

/// Environment variable holding the store endpoint URL
pub const ENV_STORE_URL: &str = "SUPABASE_URL";
/// Environment variable holding the store access key
pub const ENV_STORE_KEY: &str = "SUPABASE_KEY";
/// Environment variable holding the generation service key
pub const ENV_GENERATION_KEY: &str = "GOOGLE_API_KEY";

/// Default remote table name
pub const DEFAULT_TABLE: &str = "voti";
/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Default generation endpoint
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default request timeout for outbound clients
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Longest accepted trailing window (one year)
pub const MAX_WINDOW_HOURS: i64 = 24 * 366;
/// Default log filter directive
pub const DEFAULT_LOG_FILTER: &str = "pagelle_web=info,pagelle_common=info,tower_http=info";

/// Contents of `config.toml`
///
/// Every field has a default, so an empty file is a valid configuration
/// (credentials still have to come from the environment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub title: String,
    pub participants: Vec<String>,
    pub categories: Vec<String>,
    pub window_hours: i64,
    pub store: StoreSection,
    pub generation: GenerationSection,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            title: "Pagelle di Capodanno".to_string(),
            participants: DEFAULT_PARTICIPANTS.iter().map(|s| s.to_string()).collect(),
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            window_hours: DEFAULT_WINDOW_HOURS,
            store: StoreSection::default(),
            generation: GenerationSection::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub url: Option<String>,
    pub key: Option<String>,
    pub table: String,
    pub timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSection {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub prompt_template: String,
    pub timeout_secs: u64,
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Placeholder printed instead of a configured secret
fn redacted(secret: &Option<String>) -> &'static str {
    match secret {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

impl fmt::Debug for StoreSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSection")
            .field("url", &self.url)
            .field("key", &redacted(&self.key))
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl fmt::Debug for GenerationSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationSection")
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("prompt_template", &self.prompt_template)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Participant and category sets, validated
    pub fn roster(&self) -> Result<Roster> {
        Roster::new(self.participants.clone(), self.categories.clone())
    }

    /// Trailing window for counting and aggregation
    pub fn window(&self) -> Result<Duration> {
        if !(1..=MAX_WINDOW_HOURS).contains(&self.window_hours) {
            return Err(Error::Config(format!(
                "window_hours must be between 1 and {} (got {})",
                MAX_WINDOW_HOURS, self.window_hours
            )));
        }
        Duration::try_hours(self.window_hours).ok_or_else(|| {
            Error::Config(format!("window_hours out of range: {}", self.window_hours))
        })
    }
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path given on the command line or in `PAGELLE_CONFIG`
    Explicit(PathBuf),
    /// Found at a default location
    Discovered(PathBuf),
    /// No file found; compiled defaults
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => {
                write!(f, "{}", path.display())
            }
            ConfigSource::Defaults => write!(f, "compiled defaults"),
        }
    }
}

/// Default config file locations, most specific first
///
/// `~/.config/pagelle/config.toml`, then `/etc/pagelle/config.toml` on Linux.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pagelle").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/pagelle/config.toml"));
    }
    paths
}

/// Load configuration
///
/// An explicit path must exist. Without one the default locations are
/// tried, and when none exists the compiled defaults are used.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
        })?;
        return Ok((
            TomlConfig::from_toml_str(&content)?,
            ConfigSource::Explicit(path.to_path_buf()),
        ));
    }

    for path in default_config_paths() {
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            return Ok((
                TomlConfig::from_toml_str(&content)?,
                ConfigSource::Discovered(path),
            ));
        }
    }

    Ok((TomlConfig::default(), ConfigSource::Defaults))
}

/// Remote store endpoint and key
#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub url: String,
    pub key: String,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Validate secret value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve one secret: environment first, then TOML
///
/// Returns the value and the name of the tier it came from.
pub fn resolve_secret(env_var: &str, toml_value: Option<&str>) -> Option<(String, &'static str)> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in multiple sources: environment, TOML. Using environment (highest priority).",
            env_var
        );
    }

    if let Some(value) = env_value {
        return Some((value.trim().to_string(), "environment"));
    }

    toml_value.map(|value| (value.trim().to_string(), "TOML"))
}

/// Resolve the store URL and key; either one missing is fatal
pub fn resolve_store_credentials(config: &TomlConfig) -> Result<StoreCredentials> {
    let url = resolve_secret(ENV_STORE_URL, config.store.url.as_deref());
    let key = resolve_secret(ENV_STORE_KEY, config.store.key.as_deref());

    match (url, key) {
        (Some((url, url_source)), Some((key, key_source))) => {
            info!("Store URL loaded from {}", url_source);
            info!("Store key loaded from {}", key_source);
            Ok(StoreCredentials { url, key })
        }
        (url, key) => {
            let mut missing = Vec::new();
            if url.is_none() {
                missing.push(ENV_STORE_URL);
            }
            if key.is_none() {
                missing.push(ENV_STORE_KEY);
            }
            Err(Error::Config(format!(
                "Store credentials missing: {}. Configure using one of:\n\
                 1. Environment: {}=... {}=...\n\
                 2. TOML config: [store] url = \"...\", key = \"...\"",
                missing.join(", "),
                ENV_STORE_URL,
                ENV_STORE_KEY
            )))
        }
    }
}

/// Resolve the generation key; absence disables AI commentary
pub fn resolve_generation_key(config: &TomlConfig) -> Option<String> {
    match resolve_secret(ENV_GENERATION_KEY, config.generation.api_key.as_deref()) {
        Some((key, source)) => {
            info!("Generation key loaded from {}", source);
            Some(key)
        }
        None => {
            warn!(
                "Generation key not found ({} or [generation] api_key). AI commentary disabled.",
                ENV_GENERATION_KEY
            );
            None
        }
    }
}
