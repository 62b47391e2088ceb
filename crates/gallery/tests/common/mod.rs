#![allow(dead_code)]

use async_trait::async_trait;
use rio_core::container::{encode, write_container};
use rio_core::{AssetMetadata, GalleryError, RemoteAssetDescriptor, Result};
use rio_courier::RemoteSource;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub fn meta(stem: &str, date: &str) -> AssetMetadata {
    AssetMetadata {
        filename: format!("{}.webp", stem),
        title: stem.to_uppercase(),
        description: format!("a picture of {}", stem),
        date: date.to_string(),
    }
}

pub fn payload_for(stem: &str) -> Vec<u8> {
    format!("RIFF----WEBP{}", stem).into_bytes()
}

/// Writes `<stem>.rio` into `dir`.
pub fn write_asset(dir: &Path, stem: &str, date: &str) {
    let m = meta(stem, date);
    write_container(&dir.join(m.container_name()), &m, &payload_for(stem)).unwrap();
}

#[derive(Default)]
struct RemoteState {
    assets: BTreeMap<String, (String, Vec<u8>)>,
    failing: HashSet<String>,
    listing_down: bool,
    fetches: usize,
}

/// In-memory stand-in for the HTTP listing. Clones share state.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl FakeRemote {
    pub fn publish(&self, stem: &str, date: &str, sha: &str) {
        let m = meta(stem, date);
        let bytes = encode(&m, &payload_for(stem)).unwrap();
        self.state
            .lock()
            .unwrap()
            .assets
            .insert(m.container_name(), (sha.to_string(), bytes));
    }

    pub fn publish_raw(&self, name: &str, sha: &str, bytes: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .assets
            .insert(name.to_string(), (sha.to_string(), bytes));
    }

    pub fn unpublish(&self, name: &str) {
        self.state.lock().unwrap().assets.remove(name);
    }

    pub fn fail(&self, name: &str) {
        self.state.lock().unwrap().failing.insert(name.to_string());
    }

    pub fn set_listing_down(&self, down: bool) {
        self.state.lock().unwrap().listing_down = down;
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn list(&self) -> Result<Vec<RemoteAssetDescriptor>> {
        let state = self.state.lock().unwrap();
        if state.listing_down {
            return Err(GalleryError::RemoteUnavailable("503".into()));
        }
        Ok(state
            .assets
            .iter()
            .map(|(name, (sha, _))| RemoteAssetDescriptor {
                name: name.clone(),
                download_url: Some(name.clone()),
                content_hash: sha.clone(),
            })
            .collect())
    }

    async fn fetch(&self, locator: &str, dest: &Path) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        if state.failing.contains(locator) {
            return Err(GalleryError::RemoteUnavailable(format!("{} reset", locator)));
        }
        let (_, bytes) = state
            .assets
            .get(locator)
            .ok_or_else(|| GalleryError::RemoteUnavailable(format!("404 {}", locator)))?;
        std::fs::write(dest, bytes).map_err(|e| GalleryError::write_failed(dest, e))?;
        Ok(bytes.len() as u64)
    }
}
