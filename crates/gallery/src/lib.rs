//! # rio-gallery
//!
//! The gallery asset store as one owned component: a [`GalleryIndex`] that
//! readers query concurrently, and a [`Synchronizer`] that refreshes the
//! on-disk cache and then reloads the index.
//!
//! ```no_run
//! use rio_core::config::GalleryConfig;
//! use rio_gallery::Gallery;
//!
//! #[async_std::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gallery = Gallery::open(&GalleryConfig::from_env()?).await?;
//!     gallery.sync().await?;
//!
//!     for entry in gallery.list_all().await.iter() {
//!         println!("{} {}", entry.container, entry.metadata.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod encoder;
pub mod index;

pub use index::{GalleryEntry, GalleryIndex};
pub use rio_courier::Synchronizer;

use log::warn;
use rio_core::config::GalleryConfig;
use rio_core::protocol::SyncReport;
use rio_core::{GalleryError, Result};
use rio_courier::RemoteSource;
use std::sync::Arc;

pub struct Gallery {
    index: GalleryIndex,
    synchronizer: Synchronizer,
}

impl Gallery {
    pub fn new(index: GalleryIndex, synchronizer: Synchronizer) -> Self {
        Self {
            index,
            synchronizer,
        }
    }

    /// A gallery over `config.cache_dir` fed by the configured HTTP listing.
    /// Whatever is already cached is loaded; the remote is not contacted.
    pub async fn open(config: &GalleryConfig) -> Result<Self> {
        Self::open_with_remote(config, Box::new(rio_courier::HttpRemote::from_config(config)))
            .await
    }

    pub async fn open_with_remote(
        config: &GalleryConfig,
        remote: Box<dyn RemoteSource>,
    ) -> Result<Self> {
        async_std::fs::create_dir_all(&config.cache_dir)
            .await
            .map_err(|e| GalleryError::write_failed(&config.cache_dir, e))?;

        let gallery = Self::new(
            GalleryIndex::new(config.cache_dir.clone()),
            Synchronizer::with_remote(config, remote),
        );
        if let Err(e) = gallery.index.reload().await {
            warn!("failed to load gallery from disk: {}", e);
        }
        Ok(gallery)
    }

    pub fn index(&self) -> &GalleryIndex {
        &self.index
    }

    pub async fn list_all(&self) -> Arc<Vec<GalleryEntry>> {
        self.index.list_all().await
    }

    pub async fn fetch_payload(&self, filename: &str) -> Result<Vec<u8>> {
        self.index.fetch_payload(filename).await
    }

    /// One synchronizer pass followed by a full reload.
    ///
    /// On a listing failure the previous snapshot keeps being served.
    /// Concurrent calls must be serialized by the caller.
    pub async fn sync(&self) -> Result<SyncReport> {
        let report = self.synchronizer.run().await?;
        self.index.reload().await?;
        Ok(report)
    }
}
