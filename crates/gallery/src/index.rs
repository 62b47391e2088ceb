use async_std::sync::RwLock;
use async_std::task;
use chrono::NaiveDate;
use log::{info, warn};
use rio_core::container;
use rio_core::protocol::{ReloadSummary, SkippedContainer};
use rio_core::{is_container_name, is_plain_file_name};
use rio_core::{AssetMetadata, GalleryError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One cached container: its name on disk and the metadata decoded from it.
///
/// The container name is what [`GalleryIndex::fetch_payload`] answers to. It
/// need not match the stem of `metadata.filename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEntry {
    pub container: String,
    pub metadata: AssetMetadata,
}

/// Ordered, read-mostly view of the metadata of every cached container.
///
/// Starts empty; each [`reload`](Self::reload) replaces the whole snapshot.
pub struct GalleryIndex {
    cache_dir: PathBuf,
    snapshot: RwLock<Arc<Vec<GalleryEntry>>>,
}

impl GalleryIndex {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Rescans the cache directory and swaps in a new snapshot.
    ///
    /// Scanning runs on a blocking task without holding the lock; the write
    /// lock is taken only for the swap. Undecodable containers are skipped.
    pub async fn reload(&self) -> Result<ReloadSummary> {
        let dir = self.cache_dir.clone();
        let (entries, summary) = task::spawn_blocking(move || scan(&dir)).await?;

        *self.snapshot.write().await = Arc::new(entries);

        info!(
            "gallery reloaded: {} containers, {} skipped",
            summary.loaded,
            summary.skipped.len()
        );
        Ok(summary)
    }

    pub async fn list_all(&self) -> Arc<Vec<GalleryEntry>> {
        self.snapshot.read().await.clone()
    }

    /// Looks up a snapshot entry by the container's file name on disk.
    pub async fn metadata(&self, container_name: &str) -> Option<AssetMetadata> {
        self.snapshot
            .read()
            .await
            .iter()
            .find(|e| e.container == container_name)
            .map(|e| e.metadata.clone())
    }

    /// Reads the payload straight from disk, independent of the snapshot.
    pub async fn fetch_payload(&self, filename: &str) -> Result<Vec<u8>> {
        if !is_container_name(filename) || !is_plain_file_name(filename) {
            return Err(GalleryError::NotFound(filename.to_string()));
        }

        let path = self.cache_dir.join(filename);
        let name = filename.to_string();
        task::spawn_blocking(move || {
            if !path.is_file() {
                return Err(GalleryError::NotFound(name));
            }
            container::decode_full(&path).map(|(_, payload)| payload)
        })
        .await
    }
}

fn scan(dir: &Path) -> Result<(Vec<GalleryEntry>, ReloadSummary)> {
    let entries = fs::read_dir(dir).map_err(|source| GalleryError::CacheDirUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut loaded = Vec::new();
    let mut summary = ReloadSummary::default();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let container = entry.file_name().to_string_lossy().to_string();
        if !path.is_file() || !is_container_name(&container) {
            continue;
        }

        match container::decode_metadata(&path) {
            Ok(metadata) => loaded.push(GalleryEntry {
                container,
                metadata,
            }),
            Err(e) => {
                warn!("failed to decode gallery file {}: {}", path.display(), e);
                summary.skipped.push(SkippedContainer {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    sort_newest_first(&mut loaded);
    summary.loaded = loaded.len();
    Ok((loaded, summary))
}

/// Newest date first. Entries whose date does not parse go last; ties are
/// broken by filename, then container name, so the order is total.
pub fn sort_newest_first(entries: &mut [GalleryEntry]) {
    entries.sort_by_cached_key(|e| {
        (
            std::cmp::Reverse(parse_date(&e.metadata.date)),
            e.metadata.filename.clone(),
            e.container.clone(),
        )
    });
}

/// Parses a zero-padded `YYYY-MM-DD` date. chrono alone would also take
/// `2024-1-5`.
fn parse_date(date: &str) -> Option<NaiveDate> {
    let bytes = date.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}
