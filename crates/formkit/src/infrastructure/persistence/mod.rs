//! Form store implementations
//!
//! Both stores keep the collection as one serialized JSON array, keyed by
//! the configured storage key.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DEFAULT_STORAGE_KEY;
use crate::domain::aggregates::FormSchema;
use crate::ports::outbound::{FormStore, StoreError};

/// Serialize the collection
pub fn encode_collection(forms: &[FormSchema]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(forms)?)
}

/// Parse a stored collection, restoring field order and re-checking each schema.
///
/// A record that does not decode into a valid schema is logged and skipped;
/// only a blob that is not a JSON array fails the whole load.
pub fn decode_collection(blob: &str) -> Result<Vec<FormSchema>, StoreError> {
    let records: Vec<Value> = serde_json::from_str(blob)?;
    let total = records.len();

    let forms: Vec<FormSchema> = records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            match serde_json::from_value(record) {
                Ok(schema) => Some(schema),
                Err(source) => {
                    let e = StoreError::InvalidRecord { id, source };
                    warn!(error = %e, "Skipping stored form");
                    None
                }
            }
        })
        .collect();

    if forms.len() < total {
        warn!(skipped = total - forms.len(), loaded = forms.len(), "Stored collection had invalid forms");
    }
    Ok(forms)
}

/// In-memory blob store (for testing and previews)
pub struct InMemoryFormStore {
    key: String,
    blobs: RwLock<HashMap<String, String>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Raw serialized collection, if anything was saved
    pub fn raw(&self) -> Option<String> {
        self.blobs.read().get(&self.key).cloned()
    }

    /// Replace the raw blob, as if written by another client
    pub fn put_raw(&self, blob: impl Into<String>) {
        self.blobs.write().insert(self.key.clone(), blob.into());
    }
}

impl Default for InMemoryFormStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStore for InMemoryFormStore {
    fn load(&self) -> Result<Vec<FormSchema>, StoreError> {
        match self.blobs.read().get(&self.key) {
            Some(blob) => decode_collection(blob),
            None => Ok(vec![]),
        }
    }

    fn save(&self, forms: &[FormSchema]) -> Result<(), StoreError> {
        let blob = encode_collection(forms)?;
        self.blobs.write().insert(self.key.clone(), blob);
        Ok(())
    }
}

/// Stores the collection as `<dir>/<key>.json`
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FormStore for JsonFileStore {
    fn load(&self) -> Result<Vec<FormSchema>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => decode_collection(&blob),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, forms: &[FormSchema]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let blob = encode_collection(forms)?;

        // Write then rename so a failed write never truncates the collection
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = forms.len(), "Saved form collection");
        Ok(())
    }
}
