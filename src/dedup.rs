//! Identity keys and the accepted-record set
//!
//! Deduplication is keyed by the normalized address of a record, falling
//! back to the normalized name when no address was extracted. The
//! [`AcceptedSet`] preserves insertion order so tabular output ids are
//! stable across a run.

use crate::record::{Record, SubItem};
use std::collections::HashMap;

/// Derives the deduplication key for a record
///
/// The address wins when present; the name is the fallback. Returns `None`
/// when neither normalizes to a non-empty string (such a record is
/// invalid).
///
/// # Arguments
///
/// * `address` - The extracted address, possibly empty
/// * `name` - The extracted name, possibly empty
pub fn identity_key(address: &str, name: &str) -> Option<String> {
    let address = normalize(address);
    if !address.is_empty() {
        return Some(address);
    }
    let name = normalize(name);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Normalizes a key source: trims, collapses internal whitespace, lowercases
fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The insertion-ordered mapping from identity key to accepted data
///
/// Owned exclusively by the traversal loop; lookup and insert are a single
/// call so no record can slip in between membership check and insertion.
#[derive(Debug, Default)]
pub struct AcceptedSet {
    order: Vec<String>,
    entries: HashMap<String, (Record, Vec<SubItem>)>,
}

impl AcceptedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted records
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether a record with this identity key was already accepted
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a record and its sub-items unless the key is already present
    ///
    /// Returns `true` if the record was inserted, `false` if it was a
    /// duplicate. Duplicates are never merged.
    pub fn insert(&mut self, record: Record, items: Vec<SubItem>) -> bool {
        if self.entries.contains_key(&record.identity_key) {
            return false;
        }
        self.order.push(record.identity_key.clone());
        self.entries
            .insert(record.identity_key.clone(), (record, items));
        true
    }

    /// Iterates accepted records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Record, &[SubItem])> {
        self.order.iter().filter_map(|key| {
            self.entries
                .get(key)
                .map(|(record, items)| (record, items.as_slice()))
        })
    }

    /// Total sub-items across all accepted records
    pub fn sub_item_count(&self) -> usize {
        self.entries.values().map(|(_, items)| items.len()).sum()
    }
}
