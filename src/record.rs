//! Core data model: records, sub-items, and result-list entries
//!
//! A [`Record`] is one extracted venue; a [`SubItem`] is one child entry
//! (e.g. a menu line) owned by exactly one record. [`RecordFields`] is the
//! mutable working shape the extractor fills across passes before a valid
//! record is sealed.

use crate::dedup::identity_key;

/// A lightweight reference into the current result list
///
/// Valid only while the session remains on the search view that produced
/// it; `position` is the ordering key used to re-acquire the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub position: usize,
    pub name: String,
    pub category: String,
}

/// One accepted venue record
///
/// Immutable after acceptance: re-extraction of the same identity key is
/// rejected by the deduplicator, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Deduplication key derived from the normalized address (or name)
    pub identity_key: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: String,
    pub description: String,
}

/// One child entry of a record, in appearance order
///
/// `price` holds the raw on-page text; numeric normalization happens only
/// when the tabular output is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubItem {
    pub name: String,
    pub price: String,
    pub description: String,
}

/// Working field set accumulated by the extractor
///
/// Fields start empty and are filled by the extraction strategies; the
/// merge policy never overwrites a non-empty value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields {
    pub name: String,
    pub category: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: String,
    pub description: String,
}

impl RecordFields {
    /// Returns true if every field is still empty
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.category.is_empty()
            && self.address.is_empty()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.phone.is_empty()
            && self.description.is_empty()
    }

    /// Fills fields that are still missing or empty from `other`
    ///
    /// A field already populated by an earlier pass is never overwritten:
    /// some fields are reliably available only before switching views,
    /// others only after.
    pub fn merge_missing(&mut self, other: RecordFields) {
        if self.name.is_empty() {
            self.name = other.name;
        }
        if self.category.is_empty() {
            self.category = other.category;
        }
        if self.address.is_empty() {
            self.address = other.address;
        }
        if self.latitude.is_none() {
            self.latitude = other.latitude;
        }
        if self.longitude.is_none() {
            self.longitude = other.longitude;
        }
        if self.phone.is_empty() {
            self.phone = other.phone;
        }
        if self.description.is_empty() {
            self.description = other.description;
        }
    }

    /// Seals the working fields into a [`Record`]
    ///
    /// Returns `None` if the record is invalid: a record needs a name and
    /// a derivable identity key.
    pub fn into_record(self) -> Option<Record> {
        if self.name.trim().is_empty() {
            return None;
        }
        let key = identity_key(&self.address, &self.name)?;
        Some(Record {
            identity_key: key,
            name: self.name,
            category: self.category,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            phone: self.phone,
            description: self.description,
        })
    }
}
