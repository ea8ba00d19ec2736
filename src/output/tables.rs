//! Tabular output: the record and sub-item CSV tables
//!
//! Both tables are rewritten in full at every checkpoint interval and at
//! run end, atomically, so a partially written table can never replace a
//! good one. The same files are read back on resume to pre-seed the
//! accepted set.

use crate::checkpoint::write_atomic;
use crate::config::OutputConfig;
use crate::dedup::{identity_key, AcceptedSet};
use crate::record::{Record, SubItem};
use crate::{MapsiftError, Result};
use std::path::Path;

const RECORD_HEADER: [&str; 13] = [
    "id",
    "roastery_id",
    "owner_id",
    "name",
    "description",
    "address",
    "latitude",
    "longitude",
    "phone_number",
    "category",
    "thumbnail_url",
    "open_time",
    "close_time",
];

const SUB_ITEM_HEADER: [&str; 7] = [
    "id",
    "store_id",
    "name",
    "description",
    "price",
    "category",
    "image_url",
];

/// Normalizes raw price text to an integer value
///
/// All non-digit characters are stripped; empty or unparsable input
/// yields 0.
pub fn normalize_price(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Writes both tables from the accepted set, atomically
///
/// Record ids are 1-based insertion positions; sub-item ids run across
/// the whole file so the pair of tables loads as a consistent snapshot.
pub fn write_tables(output: &OutputConfig, accepted: &AcceptedSet) -> Result<()> {
    let mut records = csv::Writer::from_writer(Vec::new());
    records.write_record(RECORD_HEADER)?;

    let mut sub_items = csv::Writer::from_writer(Vec::new());
    sub_items.write_record(SUB_ITEM_HEADER)?;

    let mut sub_item_id: u64 = 0;
    for (store_index, (record, items)) in accepted.iter().enumerate() {
        let store_id = (store_index as u64 + 1).to_string();
        let latitude = record.latitude.map(|v| v.to_string()).unwrap_or_default();
        let longitude = record.longitude.map(|v| v.to_string()).unwrap_or_default();

        records.write_record([
            store_id.as_str(),
            "1",
            "",
            record.name.as_str(),
            record.description.as_str(),
            record.address.as_str(),
            latitude.as_str(),
            longitude.as_str(),
            record.phone.as_str(),
            record.category.as_str(),
            "",
            "",
            "",
        ])?;

        for item in items {
            sub_item_id += 1;
            let item_id = sub_item_id.to_string();
            let price = normalize_price(&item.price).to_string();
            sub_items.write_record([
                item_id.as_str(),
                store_id.as_str(),
                item.name.as_str(),
                item.description.as_str(),
                price.as_str(),
                "",
                "",
            ])?;
        }
    }

    let record_buffer = records
        .into_inner()
        .map_err(|e| MapsiftError::Output(e.to_string()))?;
    let sub_item_buffer = sub_items
        .into_inner()
        .map_err(|e| MapsiftError::Output(e.to_string()))?;

    write_atomic(Path::new(&output.records_path), &record_buffer)?;
    write_atomic(Path::new(&output.sub_items_path), &sub_item_buffer)?;

    tracing::debug!(
        records = accepted.len(),
        sub_items = accepted.sub_item_count(),
        "tables written"
    );
    Ok(())
}

/// Reads the tables back into an accepted set (resume pre-seeding)
///
/// Missing table files yield an empty set. Rows whose address and name
/// are both blank cannot produce an identity key and are skipped.
pub fn load_tables(output: &OutputConfig) -> Result<AcceptedSet> {
    let mut accepted = AcceptedSet::new();

    let records_path = Path::new(&output.records_path);
    if !records_path.exists() {
        return Ok(accepted);
    }

    // Sub-items first, grouped by their owning store id.
    let mut items_by_store: std::collections::HashMap<u64, Vec<SubItem>> =
        std::collections::HashMap::new();
    let sub_items_path = Path::new(&output.sub_items_path);
    if sub_items_path.exists() {
        let mut reader = csv::Reader::from_path(sub_items_path)?;
        for row in reader.records() {
            let row = row?;
            let store_id: u64 = row.get(1).unwrap_or("").parse().unwrap_or(0);
            if store_id == 0 {
                continue;
            }
            items_by_store.entry(store_id).or_default().push(SubItem {
                name: row.get(2).unwrap_or("").to_string(),
                description: row.get(3).unwrap_or("").to_string(),
                price: row.get(4).unwrap_or("").to_string(),
            });
        }
    }

    let mut reader = csv::Reader::from_path(records_path)?;
    for row in reader.records() {
        let row = row?;
        let store_id: u64 = row.get(0).unwrap_or("").parse().unwrap_or(0);
        let name = row.get(3).unwrap_or("").to_string();
        let address = row.get(5).unwrap_or("").to_string();

        let Some(key) = identity_key(&address, &name) else {
            tracing::warn!(store_id, "table row without identity key skipped");
            continue;
        };

        let record = Record {
            identity_key: key,
            name,
            category: row.get(9).unwrap_or("").to_string(),
            address,
            latitude: row.get(6).and_then(|v| v.parse().ok()),
            longitude: row.get(7).and_then(|v| v.parse().ok()),
            phone: row.get(8).unwrap_or("").to_string(),
            description: row.get(4).unwrap_or("").to_string(),
        };

        let items = items_by_store.remove(&store_id).unwrap_or_default();
        accepted.insert(record, items);
    }

    Ok(accepted)
}
