use serde::{Deserialize, Serialize};

/// Metadata stored in the first section of a `.rio` container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub filename: String,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl AssetMetadata {
    /// Name of the container holding this asset: the image file stem plus `.rio`.
    pub fn container_name(&self) -> String {
        let stem = std::path::Path::new(&self.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.filename.clone());
        format!("{}.{}", stem, crate::CONTAINER_EXTENSION)
    }
}

/// One entry of the remote listing, in the listing's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAssetDescriptor {
    pub name: String,
    /// Directories and some special entries come back with a null locator.
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(rename = "sha")]
    pub content_hash: String,
}
