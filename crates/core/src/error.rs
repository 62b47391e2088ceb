use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    /// Malformed length prefix, short section or undecodable metadata
    #[error("corrupt container {path}: {reason}")]
    CorruptContainer { path: PathBuf, reason: String },

    #[error("cache index {path} is corrupt: {source}")]
    IndexCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("failed to write {path}: {source}")]
    LocalWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cannot read cache directory {path}: {source}")]
    CacheDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{section} section is {len} bytes, larger than a container can hold")]
    ContainerTooLarge { section: &'static str, len: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GalleryError {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptContainer {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
