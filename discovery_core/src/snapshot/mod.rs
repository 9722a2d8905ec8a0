//! Snapshot Store - persists the dataset as a single JSON document.
//!
//! Layout:
//!
//! ```json
//! {
//!   "meta": { "run_id": "…", "round": 1 },
//!   "items": { "Plant": { "name": "Plant", "emoji": "🌱", "recipes": ["Earth+Water"] } },
//!   "recipes": { "Earth+Water": { "first": "Earth", "second": "Water", "result": "Plant" } }
//! }
//! ```
//!
//! Unresolved recipes are written with an empty `result`.

use crafting_rules::{CraftingDataset, DatasetError, ItemRegistry, RecipeRegistry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::run::RunId;

/// Default snapshot file name.
pub const DEFAULT_SNAPSHOT_PATH: &str = "crafting_data.json";

/// Errors raised while saving or loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write snapshot {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read snapshot {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode snapshot {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {path:?} is inconsistent: {source}")]
    Inconsistent {
        path: PathBuf,
        #[source]
        source: DatasetError,
    },
}

/// Which run and round wrote a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub run_id: RunId,
    pub round: u32,
}

/// A snapshot read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Absent for documents written without metadata.
    pub meta: Option<SnapshotMeta>,
    pub dataset: CraftingDataset,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    meta: &'a SnapshotMeta,
    items: &'a ItemRegistry,
    recipes: &'a RecipeRegistry,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    meta: Option<SnapshotMeta>,
    #[serde(default)]
    items: ItemRegistry,
    #[serde(default)]
    recipes: RecipeRegistry,
}

/// Reads and writes the snapshot file at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the snapshot with the full dataset.
    ///
    /// The document is written next to the target and renamed over it, so a
    /// failed write never leaves a truncated snapshot behind.
    pub fn save(&self, dataset: &CraftingDataset, meta: &SnapshotMeta) -> Result<(), SnapshotError> {
        let document = DocumentRef {
            meta,
            items: &dataset.items,
            recipes: &dataset.recipes,
        };
        let bytes = serde_json::to_vec_pretty(&document).map_err(SnapshotError::Serialize)?;

        let staging = self.staging_path();
        fs::write(&staging, bytes).map_err(|source| SnapshotError::Write {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| SnapshotError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = ?self.path, round = meta.round, "snapshot saved");
        Ok(())
    }

    /// Read the snapshot back. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SnapshotError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let document: Document =
            serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Decode {
                path: self.path.clone(),
                source,
            })?;

        let dataset = CraftingDataset::from_parts(document.items, document.recipes).map_err(
            |source| SnapshotError::Inconsistent {
                path: self.path.clone(),
                source,
            },
        )?;

        Ok(Some(Snapshot {
            meta: document.meta,
            dataset,
        }))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
