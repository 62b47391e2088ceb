use crate::error::{GalleryError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTING_URL: &str =
    "https://api.github.com/repos/lucasrattz/rattz.xyz/contents/gallery/content";
pub const DEFAULT_USER_AGENT: &str = concat!("rio-gallery/", env!("CARGO_PKG_VERSION"));

/// Name of the cache index file inside the cache directory.
pub const CACHE_INDEX_FILE: &str = "cache.json";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    listing_url: Option<String>,
    user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub home_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub listing_url: String,
    pub user_agent: String,
}

impl GalleryConfig {
    /// Resolves directories and the listing URL from `RIO_HOME`, `RIO_CACHE`,
    /// `<home>/config.toml` and `RIO_LISTING_URL`, in that order.
    pub fn from_env() -> Result<Self> {
        let home_dir = if let Ok(home) = std::env::var("RIO_HOME") {
            PathBuf::from(home)
        } else {
            dirs::config_dir()
                .ok_or_else(|| GalleryError::Config("could not find config directory".into()))?
                .join("rio-gallery")
        };

        let cache_dir = if let Ok(cache) = std::env::var("RIO_CACHE") {
            PathBuf::from(cache)
        } else {
            home_dir.join("cache")
        };

        let mut config = Self::with_dirs(home_dir, cache_dir);

        let config_path = config.home_dir.join("config.toml");
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            config.apply_file(&content)?;
            log::debug!("applied {}", config_path.display());
        }

        if let Ok(url) = std::env::var("RIO_LISTING_URL") {
            config.listing_url = url;
        }

        Ok(config)
    }

    pub fn with_dirs(home_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            cache_dir: cache_dir.into(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// A config rooted at `cache_dir`, used by tests and one-off tools.
    pub fn for_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        let home_dir = cache_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cache_dir.clone());
        Self::with_dirs(home_dir, cache_dir)
    }

    pub fn cache_index_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_INDEX_FILE)
    }

    fn apply_file(&mut self, content: &str) -> Result<()> {
        let parsed: ConfigFile =
            toml::from_str(content).map_err(|e| GalleryError::Config(e.to_string()))?;
        if let Some(url) = parsed.listing_url {
            self.listing_url = url;
        }
        if let Some(agent) = parsed.user_agent {
            self.user_agent = agent;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GalleryConfig::for_cache_dir("/srv/site/gallery/cache");
        assert_eq!(config.home_dir, PathBuf::from("/srv/site/gallery"));
        assert_eq!(config.listing_url, DEFAULT_LISTING_URL);
        assert_eq!(
            config.cache_index_path(),
            PathBuf::from("/srv/site/gallery/cache/cache.json")
        );
    }

    #[test]
    fn test_config_file_overrides() {
        let mut config = GalleryConfig::for_cache_dir("/tmp/cache");
        config
            .apply_file("listing_url = \"http://127.0.0.1:9000/list\"\n")
            .unwrap();
        assert_eq!(config.listing_url, "http://127.0.0.1:9000/list");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_bad_config_file() {
        let mut config = GalleryConfig::for_cache_dir("/tmp/cache");
        let err = config.apply_file("listing_url = [").unwrap_err();
        assert!(matches!(err, GalleryError::Config(_)));
    }
}
