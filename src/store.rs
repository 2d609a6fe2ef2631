//! Persistence of the report list.
//!
//! The whole list lives in one slot named by a versioned key. Every write
//! replaces the slot in full; there is no merge.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::models::Report;

pub trait ReportStore: Send + Sync {
    /// Persisted list, or empty when nothing is stored or the slot is corrupt.
    fn load(&self) -> Vec<Report>;

    /// Overwrites the slot with `reports`.
    fn save(&self, reports: &[Report]) -> Result<()>;

    /// Removes the slot.
    fn clear(&self) -> Result<()>;
}

pub fn encode_reports(reports: &[Report]) -> Result<String> {
    Ok(serde_json::to_string(reports)?)
}

pub fn decode_reports(raw: &str) -> Result<Vec<Report>> {
    serde_json::from_str(raw).map_err(|e| ReportError::StorageCorruption(e.to_string()))
}

fn decode_or_empty(key: &str, raw: &str) -> Vec<Report> {
    match decode_reports(raw) {
        Ok(reports) => {
            tracing::debug!("Loaded {} reports from slot {}", reports.len(), key);
            reports
        }
        Err(e) => {
            tracing::warn!("Slot {} is unreadable, treating as empty: {}", key, e);
            Vec::new()
        }
    }
}

/// Slot stored as `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    key: String,
    path: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            key: key.to_string(),
            path: data_dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            key: config.storage_key.clone(),
            path: config.slot_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl ReportStore for FileStore {
    fn load(&self) -> Vec<Report> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => decode_or_empty(&self.key, &raw),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Slot {} not found at {}", self.key, self.path.display());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to read slot {} at {}: {}", self.key, self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn save(&self, reports: &[Report]) -> Result<()> {
        let raw = encode_reports(reports)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // Write beside the slot and rename so a failed write leaves the old value.
        let tmp = self.temp_path();
        std::fs::write(&tmp, raw.as_bytes())?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!("Saved {} reports to {}", reports.len(), self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Removed slot {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slot holding the same serialized text a `FileStore` would write.
#[derive(Debug)]
pub struct MemoryStore {
    key: String,
    slot: RwLock<Option<String>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            key: crate::config::DEFAULT_STORAGE_KEY.to_string(),
            slot: RwLock::new(None),
        }
    }

    /// Store seeded with an arbitrary raw slot value.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            key: crate::config::DEFAULT_STORAGE_KEY.to_string(),
            slot: RwLock::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ReportStore for MemoryStore {
    fn load(&self) -> Vec<Report> {
        match self.raw() {
            Some(raw) => decode_or_empty(&self.key, &raw),
            None => Vec::new(),
        }
    }

    fn save(&self, reports: &[Report]) -> Result<()> {
        let raw = encode_reports(reports)?;
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
