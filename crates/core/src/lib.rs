//! Core types shared by the gallery crates: asset metadata, the error
//! taxonomy, configuration and the `.rio` container codec.

pub mod config;
pub mod container;
pub mod error;
pub mod manifest;
pub mod protocol;

pub use error::{GalleryError, Result};
pub use manifest::{AssetMetadata, RemoteAssetDescriptor};

/// File extension of gallery containers, without the leading dot.
pub const CONTAINER_EXTENSION: &str = "rio";

/// Returns true when `name` ends with `.rio`.
pub fn is_container_name(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .map_or(false, |ext| ext == CONTAINER_EXTENSION)
}

/// Returns true when `name` is a single path component that cannot escape
/// the directory it is joined onto.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}
