use anyhow::{Context, Result};
use log::info;
use rio_core::container::write_container;
use rio_core::AssetMetadata;
use std::fs;
use std::path::{Path, PathBuf};

/// Packs every image described in `metadata_file` (a JSON array of
/// [`AssetMetadata`]) into `out_dir/<stem>.rio`.
///
/// This is an offline tool: the first missing image aborts the run.
pub fn encode_directory(
    images_dir: &Path,
    metadata_file: &Path,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let content = fs::read_to_string(metadata_file)
        .with_context(|| format!("Failed to read metadata file {}", metadata_file.display()))?;
    let metas: Vec<AssetMetadata> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid metadata file {}", metadata_file.display()))?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(metas.len());
    for meta in metas {
        let image_path = images_dir.join(&meta.filename);
        let image = fs::read(&image_path)
            .with_context(|| format!("Failed to read image {}", image_path.display()))?;

        let out_path = out_dir.join(meta.container_name());
        write_container(&out_path, &meta, &image)?;
        info!("encoded {} -> {}", meta.filename, out_path.display());
        written.push(out_path);
    }

    Ok(written)
}
