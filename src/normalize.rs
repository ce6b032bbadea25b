//! Shaping of decoded API payloads.
//!
//! Everything here is pure: the input is the decoded JSON body of one
//! response and nothing is cached between calls.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Forms and landing pages share the API's `forms` collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormsAndLandingPages {
    pub forms: Vec<Value>,
    pub landing_pages: Vec<Value>,
}

/// Pagination metadata attached to v4 list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub has_next_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
    /// Present only when `include_total_count` was requested.
    pub total_count: Option<u64>,
}

impl PageInfo {
    /// Read the `pagination` object of a list response, if present.
    pub fn from_response(payload: &Value) -> Option<Self> {
        payload
            .get("pagination")
            .and_then(|p| serde_json::from_value(p.clone()).ok())
    }
}

fn is_archived(entry: &Value) -> bool {
    entry.get("archived").and_then(Value::as_bool).unwrap_or(false)
}

/// Array stored under `key`, or an empty list when the key is absent.
pub fn collection(payload: &Value, key: &str) -> Vec<Value> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Partition the `forms` collection by its `type` field.
///
/// `hosted` entries are landing pages, every other type is a form. Archived
/// entries land in neither list.
pub fn split_forms(payload: &Value) -> FormsAndLandingPages {
    let mut split = FormsAndLandingPages::default();
    for entry in collection(payload, "forms") {
        if is_archived(&entry) {
            continue;
        }
        if entry.get("type").and_then(Value::as_str) == Some("hosted") {
            split.landing_pages.push(entry);
        } else {
            split.forms.push(entry);
        }
    }
    split
}

/// Map subscription-form IDs to their form IDs, skipping archived entries.
pub fn subscription_form_map(payload: &Value) -> BTreeMap<u64, u64> {
    collection(payload, "subscription_forms")
        .iter()
        .filter(|entry| !is_archived(entry))
        .filter_map(|entry| {
            let id = entry.get("id").and_then(Value::as_u64)?;
            let form_id = entry.get("form_id").and_then(Value::as_u64)?;
            Some((id, form_id))
        })
        .collect()
}

/// ID of the first subscriber in the page whose address matches `email`.
///
/// Addresses compare case-insensitively.
pub fn first_subscriber_id(payload: &Value, email: &str) -> Option<u64> {
    collection(payload, "subscribers").iter().find_map(|entry| {
        let address = entry.get("email_address").and_then(Value::as_str)?;
        if address.eq_ignore_ascii_case(email) {
            entry.get("id").and_then(Value::as_u64)
        } else {
            None
        }
    })
}

/// Total page count reported by a legacy page-numbered response.
pub(crate) fn total_pages(payload: &Value) -> u32 {
    payload
        .get("total_pages")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_forms_from_landing_pages() {
        let payload = json!({
            "forms": [
                {"id": 1, "name": "Old page", "type": "hosted", "archived": true},
                {"id": 2, "name": "Launch page", "type": "hosted", "archived": false},
                {"id": 3, "name": "Sidebar", "type": "embed", "archived": false},
            ]
        });

        let split = split_forms(&payload);
        assert_eq!(split.forms.len(), 1);
        assert_eq!(split.forms[0]["id"], 3);
        assert_eq!(split.landing_pages.len(), 1);
        assert_eq!(split.landing_pages[0]["id"], 2);
    }

    #[test]
    fn missing_collection_is_empty() {
        let split = split_forms(&json!({"error": "nothing here"}));
        assert!(split.forms.is_empty());
        assert!(split.landing_pages.is_empty());
        assert!(collection(&Value::Null, "tags").is_empty());
    }

    #[test]
    fn subscription_forms_skip_archived() {
        let payload = json!({
            "subscription_forms": [
                {"id": 10, "form_id": 100, "archived": false},
                {"id": 11, "form_id": 101, "archived": true},
                {"id": 12, "form_id": 102},
            ]
        });

        let map = subscription_form_map(&payload);
        assert_eq!(map.into_iter().collect::<Vec<_>>(), vec![(10, 100), (12, 102)]);
    }

    #[test]
    fn finds_subscriber_case_insensitively() {
        let payload = json!({
            "subscribers": [
                {"id": 5, "email_address": "other@example.com"},
                {"id": 6, "email_address": "Jane@Example.com"},
            ]
        });
        assert_eq!(first_subscriber_id(&payload, "jane@example.com"), Some(6));
        assert_eq!(first_subscriber_id(&payload, "nobody@example.com"), None);
    }

    #[test]
    fn reads_page_info() {
        let payload = json!({
            "tags": [],
            "pagination": {
                "has_previous_page": false,
                "has_next_page": true,
                "start_cursor": "WzFd",
                "end_cursor": "WzJd",
                "per_page": 500,
                "total_count": 42
            }
        });
        let info = PageInfo::from_response(&payload).unwrap();
        assert!(info.has_next_page);
        assert_eq!(info.end_cursor.as_deref(), Some("WzJd"));
        assert_eq!(info.total_count, Some(42));
        assert!(PageInfo::from_response(&json!({})).is_none());
    }
}
