use crate::cache_index::{self, CacheIndex};
use crate::remote::{HttpRemote, RemoteSource};
use async_std::task;
use log::{error, info, warn};
use rio_core::config::GalleryConfig;
use rio_core::protocol::SyncReport;
use rio_core::{is_container_name, is_plain_file_name};
use rio_core::{GalleryError, RemoteAssetDescriptor, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const PARTIAL_SUFFIX: &str = ".part";

/// Reconciles the remote listing with the `.rio` files in the cache directory
/// and the cache index.
///
/// Callers must not run two passes over the same cache directory at once.
pub struct Synchronizer {
    remote: Box<dyn RemoteSource>,
    cache_dir: PathBuf,
    index_path: PathBuf,
}

impl Synchronizer {
    pub fn new(
        remote: Box<dyn RemoteSource>,
        cache_dir: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            remote,
            cache_dir: cache_dir.into(),
            index_path: index_path.into(),
        }
    }

    pub fn from_config(config: &GalleryConfig) -> Self {
        Self::with_remote(config, Box::new(HttpRemote::from_config(config)))
    }

    pub fn with_remote(config: &GalleryConfig, remote: Box<dyn RemoteSource>) -> Self {
        Self::new(remote, config.cache_dir.clone(), config.cache_index_path())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Runs one pass. Only a failed listing or an uncreatable cache directory
    /// is returned as an error; per-asset failures land in the report.
    pub async fn run(&self) -> Result<SyncReport> {
        // 1. Listing first: if the remote is down nothing local is touched.
        let listing = self.remote.list().await?;

        async_std::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| GalleryError::write_failed(&self.cache_dir, e))?;

        let index_path = self.index_path.clone();
        let loaded = task::spawn_blocking(move || cache_index::load(&index_path)).await;
        let mut index = match loaded {
            Ok(index) => index,
            Err(e) => {
                warn!("{}; every asset will be fetched again", e);
                CacheIndex::new()
            }
        };

        // 2. Fetch new and changed assets
        let mut report = SyncReport::default();
        let mut current = HashSet::new();

        for entry in listing.into_iter().filter(|e| is_container_name(&e.name)) {
            current.insert(entry.name.clone());

            if !is_plain_file_name(&entry.name) {
                warn!("ignoring remote asset with unsafe name {:?}", entry.name);
                report.failed.push(entry.name);
                continue;
            }

            let dest = self.cache_dir.join(&entry.name);
            let fresh = index.get(&entry.name) == Some(&entry.content_hash)
                && async_std::path::Path::new(&dest).is_file().await;
            if fresh {
                report.unchanged += 1;
                continue;
            }

            match self.download(&entry, &dest).await {
                Ok(bytes) => {
                    info!("downloaded {} ({} bytes)", entry.name, bytes);
                    index.insert(entry.name.clone(), entry.content_hash);
                    report.downloaded.push(entry.name);
                }
                Err(e) => {
                    error!("failed to download {}: {}", entry.name, e);
                    report.failed.push(entry.name);
                }
            }
        }

        // 3. Propagate remote deletions
        index.retain(|name, _| current.contains(name));
        let cache_dir = self.cache_dir.clone();
        report.removed = task::spawn_blocking(move || remove_stale(&cache_dir, &current)).await;

        // 4. Persist; a lost index only costs redundant downloads next time.
        let index_path = self.index_path.clone();
        match task::spawn_blocking(move || cache_index::save(&index_path, &index)).await {
            Ok(()) => report.index_saved = true,
            Err(e) => warn!("failed to save cache index: {}", e),
        }

        info!(
            "sync finished: {} downloaded, {} failed, {} removed, {} unchanged",
            report.downloaded.len(),
            report.failed.len(),
            report.removed.len(),
            report.unchanged
        );
        Ok(report)
    }

    /// Fetches into a `.part` sibling and renames it over `dest`, so an
    /// existing container is never rewritten in place.
    async fn download(&self, entry: &RemoteAssetDescriptor, dest: &Path) -> Result<u64> {
        let locator = entry.download_url.as_deref().ok_or_else(|| {
            GalleryError::RemoteUnavailable(format!("{} has no download locator", entry.name))
        })?;

        let partial = partial_path(dest);
        match self.remote.fetch(locator, &partial).await {
            Ok(bytes) => {
                async_std::fs::rename(&partial, dest)
                    .await
                    .map_err(|e| GalleryError::write_failed(dest, e))?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = async_std::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }
}

/// Deletes containers the remote no longer lists, plus leftover partial
/// downloads of containers. Returns the removed container names.
fn remove_stale(cache_dir: &Path, current: &HashSet<String>) -> Vec<String> {
    let mut removed = Vec::new();

    let entries = match fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!(
                "cannot scan {} for deleted assets: {}",
                cache_dir.display(),
                e
            );
            return removed;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();

        if let Some(target) = name.strip_suffix(PARTIAL_SUFFIX) {
            if is_container_name(target) {
                let _ = fs::remove_file(&path);
            }
            continue;
        }
        if !is_container_name(&name) || current.contains(&name) {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                info!("removed deleted asset {}", name);
                removed.push(name);
            }
            Err(e) => warn!("failed to remove {}: {}", path.display(), e),
        }
    }

    removed.sort();
    removed
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    dest.with_file_name(name)
}
