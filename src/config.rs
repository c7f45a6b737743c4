use std::path::PathBuf;

use thiserror::Error;

use crate::download::{Container, PostProcessor};
use crate::format::Quality;

pub const ENV_YTDLP: &str = "YTQD_YTDLP";
pub const ENV_QUALITY: &str = "YTQD_QUALITY";
pub const ENV_CONVERT: &str = "YTQD_CONVERT";
pub const ENV_START_DIR: &str = "YTQD_START_DIR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("YTQD_QUALITY: unsupported height '{0}' (expected 720, 1080, 1440 or 2160)")]
    Quality(String),
    #[error("YTQD_CONVERT: unknown container '{0}' (expected mp4, mkv, webm or none)")]
    Container(String),
}

/// Runtime settings. Read once at startup, nothing is written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Explicit yt-dlp path; looked up on PATH when unset.
    pub ytdlp_path: Option<PathBuf>,
    pub default_quality: Quality,
    /// Container forced after download; `None` keeps whatever the stream produces.
    pub convert_to: Option<Container>,
    /// Folder the picker opens in.
    pub start_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            default_quality: Quality::default(),
            convert_to: Some(Container::Mp4),
            start_dir: dirs::download_dir()
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_default()),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = var(ENV_YTDLP) {
            config.ytdlp_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = var(ENV_QUALITY) {
            let height = raw
                .trim()
                .trim_end_matches('p')
                .parse::<u32>()
                .map_err(|_| ConfigError::Quality(raw.clone()))?;
            config.default_quality =
                Quality::try_from(height).map_err(|_| ConfigError::Quality(raw.clone()))?;
        }

        if let Some(raw) = var(ENV_CONVERT) {
            config.convert_to = if raw.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(Container::parse(&raw).ok_or_else(|| ConfigError::Container(raw.clone()))?)
            };
        }

        if let Some(dir) = var(ENV_START_DIR) {
            config.start_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn post_processors(&self) -> Vec<PostProcessor> {
        self.convert_to
            .map(|container| PostProcessor::ConvertVideo { container })
            .into_iter()
            .collect()
    }
}
