//! Admission rules for records and sub-items
//!
//! Record admission applies region inclusion, the duplicate check, and the
//! optional content-signal check, in that order. Sub-item admission is
//! conservative exclusion: an item is dropped only when it matches an
//! exclusion term; nothing requires a positive keyword match.

use crate::config::FilterConfig;
use crate::dedup::AcceptedSet;
use crate::record::{Record, SubItem};
use std::fmt;

/// Why a record or entry was not added
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Address did not contain any configured region marker
    OutsideRegion,
    /// Identity key already present in the accepted set
    Duplicate,
    /// No content-signal term found in description or sub-items
    NoSignal,
    /// Extraction produced no usable record (no name / identity key)
    Invalid,
    /// The re-acquired result list showed a different name at the target
    /// position
    EntryMismatch,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::OutsideRegion => "outside configured region",
            Rejection::Duplicate => "duplicate identity key",
            Rejection::NoSignal => "no content-signal term",
            Rejection::Invalid => "no usable record extracted",
            Rejection::EntryMismatch => "result entry mismatch on re-acquisition",
        };
        f.write_str(reason)
    }
}

/// Config-driven admission rules
///
/// Holds only borrowed configuration; no process-wide state.
pub struct Admission<'a> {
    config: &'a FilterConfig,
}

impl<'a> Admission<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self { config }
    }

    /// Decides whether a record (with its surviving sub-items) is admitted
    ///
    /// Rules apply in order: region inclusion, duplicate check, optional
    /// content-signal check. The first failing rule is returned.
    pub fn admit_record(
        &self,
        record: &Record,
        items: &[SubItem],
        accepted: &AcceptedSet,
    ) -> Result<(), Rejection> {
        if !self.in_region(&record.address) {
            return Err(Rejection::OutsideRegion);
        }

        if accepted.contains(&record.identity_key) {
            return Err(Rejection::Duplicate);
        }

        if self.config.signal_keywords_enabled && !self.has_signal(record, items) {
            return Err(Rejection::NoSignal);
        }

        Ok(())
    }

    /// Decides whether a sub-item is kept
    ///
    /// Matching is whitespace-insensitive: the item's name and description
    /// are concatenated and stripped of spaces before the exclusion terms
    /// are checked, so "Choco  Cake" still matches "ChocoCake".
    pub fn keep_sub_item(&self, name: &str, description: &str) -> bool {
        let haystack: String = format!("{} {}", name, description)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        !self
            .config
            .exclusion_keywords
            .iter()
            .any(|term| !term.is_empty() && haystack.contains(term.as_str()))
    }

    fn in_region(&self, address: &str) -> bool {
        if address.is_empty() {
            return false;
        }
        self.config
            .region_markers
            .iter()
            .any(|marker| address.contains(marker.as_str()))
    }

    fn has_signal(&self, record: &Record, items: &[SubItem]) -> bool {
        let terms = &self.config.signal_keywords;

        if terms.iter().any(|t| record.description.contains(t.as_str())) {
            return true;
        }

        items.iter().any(|item| {
            terms
                .iter()
                .any(|t| item.name.contains(t.as_str()) || item.description.contains(t.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::identity_key;

    fn filter_config() -> FilterConfig {
        FilterConfig {
            region_markers: vec!["Gangnam-gu".to_string(), "Mapo-gu".to_string()],
            signal_keywords_enabled: false,
            signal_keywords: vec![],
            exclusion_keywords: vec!["Cake".to_string(), "Smoothie".to_string()],
        }
    }

    fn record(address: &str) -> Record {
        Record {
            identity_key: identity_key(address, "Cafe").unwrap(),
            name: "Cafe".to_string(),
            category: String::new(),
            address: address.to_string(),
            latitude: None,
            longitude: None,
            phone: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn test_region_admits_matching_address() {
        let config = filter_config();
        let admission = Admission::new(&config);
        let accepted = AcceptedSet::new();
        let r = record("Seoul Gangnam-gu Teheran-ro 1");
        assert!(admission.admit_record(&r, &[], &accepted).is_ok());
    }

    #[test]
    fn test_region_rejects_other_address() {
        let config = filter_config();
        let admission = Admission::new(&config);
        let accepted = AcceptedSet::new();
        let r = record("Busan Haeundae-gu 2");
        assert_eq!(
            admission.admit_record(&r, &[], &accepted),
            Err(Rejection::OutsideRegion)
        );
    }

    #[test]
    fn test_region_rejects_empty_address() {
        let config = filter_config();
        let admission = Admission::new(&config);
        let accepted = AcceptedSet::new();
        let mut r = record("Seoul Gangnam-gu");
        r.address = String::new();
        assert_eq!(
            admission.admit_record(&r, &[], &accepted),
            Err(Rejection::OutsideRegion)
        );
    }

    #[test]
    fn test_duplicate_rejected_after_insert() {
        let config = filter_config();
        let admission = Admission::new(&config);
        let mut accepted = AcceptedSet::new();
        let r = record("Seoul Gangnam-gu 3");

        assert!(admission.admit_record(&r, &[], &accepted).is_ok());
        accepted.insert(r.clone(), vec![]);
        assert_eq!(
            admission.admit_record(&r, &[], &accepted),
            Err(Rejection::Duplicate)
        );
    }

    #[test]
    fn test_signal_check_disabled_by_default() {
        let config = filter_config();
        let admission = Admission::new(&config);
        let accepted = AcceptedSet::new();
        let r = record("Seoul Gangnam-gu 4");
        assert!(admission.admit_record(&r, &[], &accepted).is_ok());
    }

    #[test]
    fn test_signal_check_rejects_without_term() {
        let mut config = filter_config();
        config.signal_keywords_enabled = true;
        config.signal_keywords = vec!["single origin".to_string()];
        let admission = Admission::new(&config);
        let accepted = AcceptedSet::new();
        let r = record("Seoul Gangnam-gu 5");
        assert_eq!(
            admission.admit_record(&r, &[], &accepted),
            Err(Rejection::NoSignal)
        );
    }

    #[test]
    fn test_signal_check_accepts_term_in_sub_item() {
        let mut config = filter_config();
        config.signal_keywords_enabled = true;
        config.signal_keywords = vec!["single origin".to_string()];
        let admission = Admission::new(&config);
        let accepted = AcceptedSet::new();
        let r = record("Seoul Gangnam-gu 6");
        let items = vec![SubItem {
            name: "Ethiopia single origin drip".to_string(),
            price: String::new(),
            description: String::new(),
        }];
        assert!(admission.admit_record(&r, &items, &accepted).is_ok());
    }

    #[test]
    fn test_sub_item_exclusion_matches_name() {
        let config = filter_config();
        let admission = Admission::new(&config);
        assert!(!admission.keep_sub_item("Chocolate Cake", ""));
    }

    #[test]
    fn test_sub_item_exclusion_ignores_spacing() {
        let config = filter_config();
        let admission = Admission::new(&config);
        assert!(!admission.keep_sub_item("Choco C ake", ""));
    }

    #[test]
    fn test_sub_item_kept_by_default() {
        let config = filter_config();
        let admission = Admission::new(&config);
        assert!(admission.keep_sub_item("Hand Drip Filter Coffee", ""));
    }

    #[test]
    fn test_sub_item_exclusion_matches_description() {
        let config = filter_config();
        let admission = Admission::new(&config);
        assert!(!admission.keep_sub_item("Seasonal special", "Berry Smoothie blend"));
    }
}
