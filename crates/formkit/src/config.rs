//! Library configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::infrastructure::persistence::{InMemoryFormStore, JsonFileStore};
use crate::ports::outbound::FormStore;

/// Default key the saved-forms collection is stored under
pub const DEFAULT_STORAGE_KEY: &str = "formBuilder_savedForms";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Key (or file stem) of the saved-forms blob
    pub storage_key: String,
    /// Directory for the JSON file store; in-memory storage when unset
    pub storage_dir: Option<PathBuf>,
    /// Reject derived fields whose formula is not recognized
    pub strict_formulas: bool,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: None,
            strict_formulas: false,
        }
    }
}

impl FormsConfig {
    /// Defaults overridden by `FORMKIT_STORAGE_KEY`, `FORMKIT_STORAGE_DIR`
    /// and `FORMKIT_STRICT_FORMULAS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(key) = lookup("FORMKIT_STORAGE_KEY").filter(|k| !k.is_empty()) {
            config.storage_key = key;
        }
        if let Some(dir) = lookup("FORMKIT_STORAGE_DIR").filter(|d| !d.is_empty()) {
            config.storage_dir = Some(PathBuf::from(dir));
        }
        if let Some(strict) = lookup("FORMKIT_STRICT_FORMULAS") {
            config.strict_formulas = matches!(strict.trim(), "1" | "true" | "yes" | "on");
        }
        config
    }

    /// Store selected by this configuration
    pub fn store(&self) -> Arc<dyn FormStore> {
        match &self.storage_dir {
            Some(dir) => Arc::new(JsonFileStore::new(dir, &self.storage_key)),
            None => Arc::new(InMemoryFormStore::with_key(&self.storage_key)),
        }
    }
}
