//! Startup configuration: defaults plus `PODCAST_RS_*` environment overrides

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::model::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};

pub const ENV_API_URL: &str = "PODCAST_RS_API_URL";
pub const ENV_DATA_DIR: &str = "PODCAST_RS_DATA_DIR";
pub const ENV_LOG_DIR: &str = "PODCAST_RS_LOG_DIR";
pub const ENV_PAGE_SIZE: &str = "PODCAST_RS_PAGE_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "PODCAST_RS_TIMEOUT_SECS";

const DEFAULT_DATA_DIR: &str = ".cache";
const DEFAULT_LOG_DIR: &str = ".logs";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub page_size: usize,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = var(ENV_API_URL) {
            url::Url::parse(url.trim())
                .with_context(|| format!("{} is not a valid URL: {}", ENV_API_URL, url))?;
            config.api_url = url.trim().to_string();
        }
        if let Some(dir) = var(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(size) = var(ENV_PAGE_SIZE) {
            config.page_size = parse_number(ENV_PAGE_SIZE, &size)?;
            if config.page_size == 0 {
                bail!("{} must be at least 1", ENV_PAGE_SIZE);
            }
        }
        if let Some(secs) = var(ENV_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse_number(ENV_TIMEOUT_SECS, &secs)?);
        }

        Ok(config)
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a non-negative integer, got '{}'", key, value))
}
