//! Multi-strategy field extraction
//!
//! Three strategies run in order, each tried in full before the next
//! fills whatever is still missing:
//!
//! 1. the structured state object the page exposes, when present;
//! 2. key-pattern matches over the raw page markup;
//! 3. per-field DOM selector lists, first non-empty text wins.
//!
//! No strategy is allowed to raise past its boundary: a failing field or
//! sub-item stays empty and extraction continues. Only a record that ends
//! up without a name counts as an extraction failure, and that decision
//! belongs to the caller via [`RecordFields::into_record`].

use crate::browser::{BrowserSession, Locator};
use crate::filter::Admission;
use crate::record::{RecordFields, SubItem};
use crate::site::{MarkupPatterns, SiteProfile};
use serde_json::Value;

/// Extracts record fields from the current frame context
///
/// Strategies are merged with the fill-only-empty policy; the result may
/// be entirely empty if the page yielded nothing.
pub fn extract_fields<B: BrowserSession>(session: &mut B, profile: &SiteProfile) -> RecordFields {
    let mut fields = RecordFields::default();

    match session.evaluate_script(profile.state_script) {
        Ok(Some(state)) => fields = fields_from_state(&state),
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "structured state unavailable"),
    }

    match session.read_page_markup() {
        Ok(markup) => fields.merge_missing(fields_from_markup(&markup, &profile.markup)),
        Err(e) => tracing::debug!(error = %e, "page markup unreadable"),
    }

    fields.merge_missing(fields_from_dom(session, profile));

    fields
}

/// Extracts sub-items from the sub-list view
///
/// Items are taken in appearance order; each is admitted through the
/// exclusion filter, and the count cap truncates rather than erroring.
pub fn extract_sub_items<B: BrowserSession>(
    session: &mut B,
    profile: &SiteProfile,
    admission: &Admission<'_>,
    max_items: usize,
) -> Vec<SubItem> {
    let handles = match session.find_elements(&profile.sub_item) {
        Ok(handles) => handles,
        Err(e) => {
            tracing::debug!(error = %e, "sub-item list unreadable");
            return Vec::new();
        }
    };

    let mut items = Vec::new();
    for handle in &handles {
        if items.len() >= max_items {
            break;
        }

        let name = match session.read_text(handle, Some(profile.sub_item_name)) {
            Ok(text) => text.trim().to_string(),
            Err(_) => continue,
        };
        if name.is_empty() {
            continue;
        }

        let price = session
            .read_text(handle, Some(profile.sub_item_price))
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        let description = session
            .read_text(handle, Some(profile.sub_item_description))
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if !admission.keep_sub_item(&name, &description) {
            tracing::trace!(item = %name, "sub-item excluded");
            continue;
        }

        items.push(SubItem {
            name,
            price,
            description,
        });
    }

    items
}

/// Strategy 1: walk the structured state object
fn fields_from_state(state: &Value) -> RecordFields {
    let mut fields = RecordFields::default();
    let Some(map) = state.as_object() else {
        return fields;
    };

    // Base entries carry everything but the description; the first one
    // with a usable name wins.
    for (key, value) in map {
        if !key.starts_with("PlaceDetailBase:") {
            continue;
        }
        let Some(obj) = value.as_object() else {
            continue;
        };

        let name = string_field(obj, "name");
        if name.is_empty() {
            continue;
        }

        fields.name = name;
        fields.category = string_field(obj, "category");
        fields.address = first_string_field(obj, &["roadAddress", "address"]);
        fields.phone = first_string_field(obj, &["virtualPhone", "phone"]);

        if let Some(coordinate) = value.get("coordinate").and_then(Value::as_object) {
            fields.latitude = coordinate.get("y").and_then(coordinate_value);
            fields.longitude = coordinate.get("x").and_then(coordinate_value);
        }
        break;
    }

    // The description is nested under the root query rather than the base
    // entry.
    if let Some(root) = map.get("ROOT_QUERY").and_then(Value::as_object) {
        'detail: for (key, value) in root {
            if !key.starts_with("placeDetail(") {
                continue;
            }
            let Some(detail) = value.as_object() else {
                continue;
            };
            for (inner_key, inner_value) in detail {
                if !inner_key.starts_with("description(") {
                    continue;
                }
                if let Some(description) = inner_value.as_str() {
                    if !description.is_empty() {
                        fields.description = description.to_string();
                        break 'detail;
                    }
                }
            }
        }
    }

    fields
}

/// Strategy 2: key-pattern matches over the raw markup
fn fields_from_markup(markup: &str, patterns: &MarkupPatterns) -> RecordFields {
    let capture = |regex: &regex::Regex| {
        regex
            .captures(markup)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };

    RecordFields {
        name: capture(&patterns.name),
        category: capture(&patterns.category),
        address: capture(&patterns.address),
        latitude: capture(&patterns.latitude).parse().ok(),
        longitude: capture(&patterns.longitude).parse().ok(),
        phone: capture(&patterns.phone),
        description: unescape_markup(&capture(&patterns.description)),
    }
}

/// Strategy 3: per-field DOM selector lists
fn fields_from_dom<B: BrowserSession>(session: &mut B, profile: &SiteProfile) -> RecordFields {
    RecordFields {
        name: read_first(session, &profile.detail_name),
        category: read_first(session, &profile.detail_category),
        address: read_first(session, &profile.detail_address),
        // Coordinates are not rendered as text anywhere on the page.
        latitude: None,
        longitude: None,
        phone: read_first(session, &profile.detail_phone),
        description: read_first(session, &profile.detail_description),
    }
}

/// Reads the first non-empty text among a prioritized selector list
fn read_first<B: BrowserSession>(session: &mut B, selectors: &[&str]) -> String {
    for selector in selectors {
        let handles = match session.find_elements(&Locator::css(*selector)) {
            Ok(handles) => handles,
            Err(_) => continue,
        };
        let Some(handle) = handles.first() else {
            continue;
        };
        if let Ok(text) = session.read_text(handle, None) {
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    String::new()
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn first_string_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        let value = string_field(obj, key);
        if !value.is_empty() {
            return value;
        }
    }
    String::new()
}

/// Coordinates arrive as numbers or numeric strings depending on the page
/// build
fn coordinate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Undoes the JSON-style escapes the markup patterns capture verbatim
fn unescape_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
