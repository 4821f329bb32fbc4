//! Path -> pinned revision registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::SuperprojectConfig;
use crate::error::{PiUtilError, Result};

/// One sub-repository and the revision it is pinned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Directory relative to the base path.
    pub path: String,
    /// Opaque revision identifier (usually a commit hash).
    pub revision: String,
}

impl RegistryEntry {
    pub fn new(path: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            revision: revision.into(),
        }
    }
}

/// Ordered set of sub-repositories, iterated in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    primary: String,
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Combine configured paths with discovered revisions.
    ///
    /// The primary repository's revision always comes from the config.
    /// Every other configured path must have been discovered.
    pub fn build(
        config: &SuperprojectConfig,
        discovered: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let entries = config
            .paths
            .iter()
            .map(|path| {
                let revision = if *path == config.primary {
                    Some(config.primary_revision.clone())
                } else {
                    discovered.get(path).cloned()
                };
                revision
                    .map(|revision| RegistryEntry::new(path.clone(), revision))
                    .ok_or_else(|| PiUtilError::RevisionNotFound { path: path.clone() })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            primary: config.primary.clone(),
            entries,
        })
    }

    pub fn from_entries(primary: impl Into<String>, entries: Vec<RegistryEntry>) -> Self {
        Self {
            primary: primary.into(),
            entries,
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn revision(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.revision.as_str())
    }

    pub fn is_primary(&self, entry: &RegistryEntry) -> bool {
        entry.path == self.primary
    }
}
