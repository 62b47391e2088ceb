use log::debug;
use rio_core::{GalleryError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Asset filename to the content hash it was last synchronized at.
pub type CacheIndex = BTreeMap<String, String>;

/// Loads the index. A missing file is a first run and yields an empty map.
pub fn load(path: &Path) -> Result<CacheIndex> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no cache index at {}, starting empty", path.display());
            return Ok(CacheIndex::new());
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&content).map_err(|source| GalleryError::IndexCorrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the index as pretty JSON, replacing the previous file by rename.
pub fn save(path: &Path, index: &CacheIndex) -> Result<()> {
    let content = serde_json::to_string_pretty(index).map_err(io::Error::from)?;

    let tmp = temp_path(path);
    fs::write(&tmp, content).map_err(|e| GalleryError::write_failed(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| GalleryError::write_failed(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
