//! The `.rio` container: two length-prefixed sections, metadata then payload.
//!
//! ```text
//! u32 LE  metadata length
//! [u8]    metadata (compact JSON)
//! u32 LE  payload length
//! [u8]    payload
//! ```
//!
//! Lengths are always read from the prefixes; hitting EOF before a section is
//! complete makes the container corrupt.

use crate::error::{GalleryError, Result};
use crate::manifest::AssetMetadata;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

const LEN_PREFIX: usize = 4;

pub fn encode(metadata: &AssetMetadata, payload: &[u8]) -> Result<Vec<u8>> {
    let meta = serde_json::to_vec(metadata).map_err(io::Error::from)?;
    let meta_len = section_len("metadata", meta.len())?;
    let payload_len = section_len("payload", payload.len())?;

    let mut out = Vec::with_capacity(2 * LEN_PREFIX + meta.len() + payload.len());
    out.extend_from_slice(&meta_len.to_le_bytes());
    out.extend_from_slice(&meta);
    out.extend_from_slice(&payload_len.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

pub fn write_container(path: &Path, metadata: &AssetMetadata, payload: &[u8]) -> Result<()> {
    let bytes = encode(metadata, payload)?;
    fs::write(path, bytes).map_err(|e| GalleryError::write_failed(path, e))
}

/// Reads only the metadata section; the payload is never touched.
pub fn decode_metadata(path: &Path) -> Result<AssetMetadata> {
    let mut reader = open(path)?;
    read_metadata(&mut reader, path)
}

pub fn decode_full(path: &Path) -> Result<(AssetMetadata, Vec<u8>)> {
    let mut reader = open(path)?;
    let metadata = read_metadata(&mut reader, path)?;
    let payload = read_section(&mut reader, path, "payload")?;
    Ok((metadata, payload))
}

fn section_len(section: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| GalleryError::ContainerTooLarge { section, len })
}

fn open(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(GalleryError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn read_metadata<R: Read>(reader: &mut R, path: &Path) -> Result<AssetMetadata> {
    let bytes = read_section(reader, path, "metadata")?;
    serde_json::from_slice(&bytes)
        .map_err(|e| GalleryError::corrupt(path, format!("undecodable metadata: {}", e)))
}

fn read_section<R: Read>(reader: &mut R, path: &Path, section: &str) -> Result<Vec<u8>> {
    let mut prefix = [0u8; LEN_PREFIX];
    if let Err(e) = reader.read_exact(&mut prefix) {
        return Err(match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                GalleryError::corrupt(path, format!("truncated {} length prefix", section))
            }
            _ => e.into(),
        });
    }
    let declared = u64::from(u32::from_le_bytes(prefix));

    // take() keeps a bogus prefix from turning into a huge allocation.
    let mut buf = Vec::new();
    reader.by_ref().take(declared).read_to_end(&mut buf)?;
    if (buf.len() as u64) < declared {
        return Err(GalleryError::corrupt(
            path,
            format!(
                "{} section declares {} bytes but only {} remain",
                section,
                declared,
                buf.len()
            ),
        ));
    }
    Ok(buf)
}
