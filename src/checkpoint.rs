//! Checkpointing for resumable traversals
//!
//! Progress is tracked as a set of flat position indices over the
//! (query, entry) traversal: `query_index * max_entries_per_query +
//! entry_index`. Both factors come from configuration order, so the index
//! is stable across restarts. The checkpoint file is written atomically
//! (write to a sibling temp file, then rename) so an interrupted save
//! never corrupts the previous good checkpoint.

use crate::{MapsiftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The set of already-processed traversal positions
///
/// A position is marked processed regardless of whether the entry was
/// accepted, rejected, or failed: resume must never re-extract it.
/// Serializes as a bare list of position markers.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checkpoint {
    processed: BTreeSet<u64>,
}

impl Checkpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the flat position index for an entry
    pub fn position(query_index: usize, entry_index: usize, max_entries_per_query: usize) -> u64 {
        (query_index as u64) * (max_entries_per_query as u64) + entry_index as u64
    }

    pub fn is_processed(&self, position: u64) -> bool {
        self.processed.contains(&position)
    }

    pub fn mark_processed(&mut self, position: u64) {
        self.processed.insert(position);
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

/// Filesystem persistence for [`Checkpoint`]
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a checkpoint file exists (resume mode trigger)
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the checkpoint if one exists
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Checkpoint))` - A checkpoint file was found and parsed
    /// * `Ok(None)` - No checkpoint file exists
    /// * `Err(MapsiftError)` - The file exists but could not be read/parsed
    pub fn load(&self) -> Result<Option<Checkpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let checkpoint = serde_json::from_str(&content)
            .map_err(|e| MapsiftError::Checkpoint(format!("corrupt checkpoint file: {}", e)))?;
        Ok(Some(checkpoint))
    }

    /// Persists the checkpoint atomically
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let content = serde_json::to_vec_pretty(checkpoint)?;
        write_atomic(&self.path, &content)?;
        tracing::debug!(
            positions = checkpoint.len(),
            path = %self.path.display(),
            "checkpoint saved"
        );
        Ok(())
    }

    /// Removes the checkpoint file (clean-completion path)
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::info!(path = %self.path.display(), "checkpoint removed");
        }
        Ok(())
    }
}

/// Writes a file atomically: write to a sibling `.tmp`, then rename
///
/// A crash mid-write leaves the previous file at `path` intact. Parent
/// directories are created as needed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
