//! Parameter bag sent as a query string or JSON body.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single parameter value.
///
/// Scalars cover most endpoints; `List` and `Map` carry the nested shapes
/// used by bulk operations, purchases and webhook events.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ParamValue>),
    Map(Params),
}

impl ParamValue {
    fn is_blank(&self) -> bool {
        matches!(self, ParamValue::Str(s) if s.is_empty())
    }

    /// Render a scalar as it appears in a query string.
    fn to_query_string(&self) -> Option<String> {
        match self {
            ParamValue::Str(s) => Some(s.clone()),
            ParamValue::Int(n) => Some(n.to_string()),
            ParamValue::Float(n) => Some(n.to_string()),
            ParamValue::Bool(b) => Some(b.to_string()),
            ParamValue::List(_) | ParamValue::Map(_) => None,
        }
    }

    fn flatten_into(&self, key: &str, pairs: &mut Vec<(String, String)>) {
        match self {
            ParamValue::List(items) => {
                for item in items {
                    item.flatten_into(&format!("{key}[]"), pairs);
                }
            }
            ParamValue::Map(map) => {
                for (sub, value) in map.iter() {
                    value.flatten_into(&format!("{key}[{sub}]"), pairs);
                }
            }
            scalar => {
                if let Some(s) = scalar.to_query_string() {
                    pairs.push((key.to_string(), s));
                }
            }
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Str(s) => serializer.serialize_str(s),
            ParamValue::Int(n) => serializer.serialize_i64(*n),
            ParamValue::Float(n) => serializer.serialize_f64(*n),
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::List(items) => items.serialize(serializer),
            ParamValue::Map(map) => map.serialize(serializer),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        // IDs never approach i64::MAX; saturate rather than wrap.
        ParamValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Params> for ParamValue {
    fn from(value: Params) -> Self {
        ParamValue::Map(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        ParamValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Ordered mapping from parameter name to value.
///
/// Insertion order is preserved and re-inserting a key replaces its value in
/// place. Empty-string values are dropped by [`Params::strip_blank`] unless
/// they were added with [`Params::insert_required`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
    required: Vec<String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Insert a value only when one is given.
    pub fn insert_opt<V: Into<ParamValue>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Insert a value that must be sent even when it is an empty string.
    pub fn insert_required(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> &mut Self {
        let key = key.into();
        if !self.required.contains(&key) {
            self.required.push(key.clone());
        }
        self.insert(key, value)
    }

    /// Builder-style [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Merge another bag, its keys replacing existing ones.
    pub fn extend(&mut self, other: Params) {
        let Params { entries, required } = other;
        for (key, value) in entries {
            if required.contains(&key) {
                self.insert_required(key, value);
            } else {
                self.insert(key, value);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        self.required.retain(|k| k != key);
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop top-level empty-string entries, keeping required keys.
    pub fn strip_blank(&mut self) {
        let required = &self.required;
        self.entries
            .retain(|(k, v)| !v.is_blank() || required.contains(k));
    }

    /// Flatten into query-string pairs.
    ///
    /// Lists become `key[]=v` and maps `key[sub]=v`, the form the API parses.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            value.flatten_into(key, &mut pairs);
        }
        pairs
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_replaces_in_place() {
        let mut params = Params::new();
        params.insert("a", 1u32).insert("b", "x").insert("a", 2u32);
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(params.get("a"), Some(&ParamValue::Int(2)));
    }

    #[test]
    fn strip_blank_respects_required_keys() {
        let mut params = Params::new();
        params
            .insert("email_address", "a@b.com")
            .insert("referrer", "")
            .insert_required("first_name", "");
        params.strip_blank();

        assert!(params.contains_key("email_address"));
        assert!(!params.contains_key("referrer"));
        assert_eq!(params.get("first_name"), Some(&ParamValue::from("")));
    }

    #[test]
    fn serializes_in_insertion_order() {
        let tag = Params::new().with("name", "vip");
        let params = Params::new()
            .with("tags", vec![ParamValue::from(tag)])
            .with("callback_url", "https://example.com/hook");

        let body = serde_json::to_string(&params).unwrap();
        assert_eq!(
            body,
            r#"{"tags":[{"name":"vip"}],"callback_url":"https://example.com/hook"}"#
        );
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"tags": [{"name": "vip"}], "callback_url": "https://example.com/hook"})
        );
    }

    #[test]
    fn query_pairs_flatten_nested_values() {
        let params = Params::new()
            .with("per_page", 100u32)
            .with("include_total_count", false)
            .with("colors", vec!["#000000", "#ffffff"])
            .with("event", Params::new().with("name", "tag_add"));

        assert_eq!(
            params.to_query_pairs(),
            vec![
                ("per_page".to_string(), "100".to_string()),
                ("include_total_count".to_string(), "false".to_string()),
                ("colors[]".to_string(), "#000000".to_string()),
                ("colors[]".to_string(), "#ffffff".to_string()),
                ("event[name]".to_string(), "tag_add".to_string()),
            ]
        );
    }
}
