use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Where the remote job repository lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            // SAFETY: constant, always parses
            base_url: Url::parse(DEFAULT_API_URL).expect("default API url is valid"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Default::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    pub search_debounce: Duration,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// On-disk layout of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    search_debounce_ms: Option<u64>,
    log_level: Option<String>,
}

impl Config {
    /// Defaults, then the config file, then `APPLOG_*` environment variables.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        match path {
            Some(path) => config.merge_file(path)?,
            None => {
                if let Some(default) = Self::default_path() {
                    if default.exists() {
                        config.merge_file(&default)?;
                    }
                }
            }
        }

        config.merge_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "applog")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        self.merge_toml(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    fn merge_toml(&mut self, raw: &str) -> Result<()> {
        let file: FileConfig = toml::from_str(raw)?;
        if let Some(url) = file.api_url {
            self.api.base_url = parse_base_url(&url)?;
        }
        if let Some(secs) = file.timeout_secs {
            self.api.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = file.search_debounce_ms {
            self.search_debounce = Duration::from_millis(ms);
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        Ok(())
    }

    fn merge_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("APPLOG_API_URL") {
            self.api.base_url = parse_base_url(&url).context("APPLOG_API_URL")?;
        }
        if let Some(secs) = lookup("APPLOG_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("APPLOG_TIMEOUT_SECS is not a number: {}", secs))?;
            self.api.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = lookup("APPLOG_SEARCH_DEBOUNCE_MS") {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("APPLOG_SEARCH_DEBOUNCE_MS is not a number: {}", ms))?;
            self.search_debounce = Duration::from_millis(ms);
        }
        if let Some(level) = lookup("APPLOG_LOG") {
            self.log_level = level;
        }
        Ok(())
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid API url: {}", raw))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("API url must be an http(s) address: {}", raw));
    }
    Ok(url)
}
