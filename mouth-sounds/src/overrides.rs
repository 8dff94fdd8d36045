//! Curated whole-name overrides.
//!
//! Some names segment badly under the vowel-group heuristic (silent letters,
//! unusual spellings). An override maps a whole lowercase name straight to a
//! list of labels and a say-as string, bypassing the heuristic entirely.
//!
//! A small set of overrides is built in. More can be loaded from a library
//! index file and merged on top:
//!
//! ```json
//! {
//!   "entries": {
//!     "siobhan": { "labels": ["SH", "UH", "V", "AW", "N"], "sayAs": "shivawn" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ConfigError;

/// A curated pronunciation for one whole name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideEntry {
    /// Chip labels in speaking order.
    pub labels: Vec<String>,
    /// Whole-name fallback pronunciation.
    pub say_as: String,
}

impl OverrideEntry {
    pub fn new<I, S>(labels: I, say_as: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            say_as: say_as.into(),
        }
    }
}

/// On-disk shape of an override library index.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryIndex {
    #[serde(default)]
    entries: BTreeMap<String, OverrideEntry>,
}

/// A set of overrides keyed by lowercase whole name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: BTreeMap<String, OverrideEntry>,
}

static BUILTIN_OVERRIDES: LazyLock<OverrideTable> = LazyLock::new(|| {
    OverrideTable::new()
        .with_entry("earl", OverrideEntry::new(["ER", "L"], "earl"))
        .with_entry("sam", OverrideEntry::new(["SA", "M"], "sam"))
        .with_entry("ng", OverrideEntry::new(["NG"], "ng"))
});

/// Normalize a name into an override key.
fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl OverrideTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The overrides shipped with the crate.
    pub fn builtin() -> &'static OverrideTable {
        &BUILTIN_OVERRIDES
    }

    /// Add (or replace) an entry. The key is trimmed and lowercased.
    #[must_use]
    pub fn with_entry(mut self, name: &str, entry: OverrideEntry) -> Self {
        self.insert(name, entry);
        self
    }

    /// Add (or replace) an entry, returning the entry it replaced.
    pub fn insert(&mut self, name: &str, entry: OverrideEntry) -> Option<OverrideEntry> {
        self.entries.insert(normalize_key(name), entry)
    }

    /// Exact, case-insensitive lookup of a whole name.
    pub fn get(&self, name: &str) -> Option<&OverrideEntry> {
        self.entries.get(&normalize_key(name))
    }

    /// Merge `other` into this table; entries in `other` win.
    pub fn merge(&mut self, other: OverrideTable) {
        for (name, entry) in other.entries {
            if self.entries.insert(name.clone(), entry).is_some() {
                debug!(name = %name, "override replaced by library entry");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, entry)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OverrideEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a library index from JSON.
    ///
    /// Entries with a blank name or no labels are skipped with a warning
    /// rather than failing the whole library.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let index: LibraryIndex = serde_json::from_str(json)?;
        let mut table = Self::new();

        for (name, entry) in index.entries {
            if name.trim().is_empty() || entry.labels.is_empty() {
                warn!(name = %name, "Skipping override library entry without a name or labels");
                continue;
            }
            table.insert(&name, entry);
        }

        Ok(table)
    }

    /// Load a library index file.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Library`] if it is not a valid index.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let table = Self::from_json(&contents).map_err(|e| ConfigError::Library {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), entries = table.len(), "Loaded override library");
        Ok(table)
    }

    /// The built-in overrides with a library file merged on top.
    pub fn builtin_with_library(path: &Path) -> Result<Self, ConfigError> {
        let mut table = Self::builtin().clone();
        table.merge(Self::load(path)?);
        Ok(table)
    }
}
