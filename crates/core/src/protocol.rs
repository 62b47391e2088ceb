use serde::{Deserialize, Serialize};

/// Outcome of one synchronizer pass, reported for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Assets fetched because they were new or their hash changed
    pub downloaded: Vec<String>,
    /// Assets whose fetch failed; their index entry was left stale
    pub failed: Vec<String>,
    /// Local containers removed because the remote no longer lists them
    pub removed: Vec<String>,
    /// Assets already up to date
    pub unchanged: usize,
    /// Whether the cache index was written back
    pub index_saved: bool,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.downloaded.is_empty() && self.removed.is_empty() && self.failed.is_empty()
    }
}

/// A container that could not be decoded during a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedContainer {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadSummary {
    pub loaded: usize,
    pub skipped: Vec<SkippedContainer>,
}
