//! # Courier
//!
//! **Keeps the local `.rio` cache in step with the remote gallery listing.**
//!
//! - [`remote`]: the [`RemoteSource`] seam and its HTTP implementation.
//! - [`cache_index`]: the persisted `name -> content hash` map used to spot stale assets.
//! - [`sync`]: the [`Synchronizer`], one diff/download/delete/persist pass.
//!
//! ```no_run
//! use rio_core::config::GalleryConfig;
//! use rio_courier::Synchronizer;
//!
//! #[async_std::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GalleryConfig::from_env()?;
//!     let synchronizer = Synchronizer::from_config(&config);
//!
//!     let report = synchronizer.run().await?;
//!     println!("downloaded {} assets", report.downloaded.len());
//!     Ok(())
//! }
//! ```

/// Persisted map of asset name to last synchronized content hash.
pub mod cache_index;

/// Listing and fetching assets from the remote content source.
pub mod remote;

/// Reconciling the remote listing with the local cache.
pub mod sync;

pub use cache_index::CacheIndex;
pub use remote::{HttpRemote, RemoteSource};
pub use sync::Synchronizer;
