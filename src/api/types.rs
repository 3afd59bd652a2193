use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::deserializers::{lenient_string, lenient_u64, string_or_number};

/// Citizen row as returned by the backend.
///
/// The controller only looks at `uid`/`id` to derive a row key; everything else is
/// carried through for rendering. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitizenRecord {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub national_identifier: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub mother_first: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub father_first: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub birth_city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id_registration_city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id_registration_district: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub address_city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub address_district: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub address_neighborhood: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub door_or_entrance_number: Option<String>,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Server-side pagination block of a paginated payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
}

/// The three payload shapes the citizens endpoint is known to produce
#[derive(Debug, Clone, PartialEq)]
pub enum CitizenPayload {
    /// `{ "citizens": [...], "pagination": {...} }`
    Paginated {
        citizens: Vec<CitizenRecord>,
        pagination: Option<Pagination>,
    },
    /// A bare array of citizens
    List(Vec<CitizenRecord>),
    /// Empty body, `null`, or anything unrecognized
    Empty,
}

impl CitizenPayload {
    /// Classify a decoded JSON body.
    ///
    /// Shapes that match neither known form are an empty result, not an error.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(decode_records(items)),
            Value::Object(mut map) => {
                let citizens = match map.remove("citizens") {
                    Some(Value::Array(items)) => items,
                    _ => {
                        warn!("Citizens payload has no 'citizens' array, treating as empty");
                        return Self::Empty;
                    }
                };
                let citizens = decode_records(citizens);
                let pagination = map
                    .remove("pagination")
                    .filter(|p| p.is_object())
                    .and_then(|p| match serde_json::from_value::<Pagination>(p) {
                        Ok(pagination) => Some(pagination),
                        Err(e) => {
                            warn!("Ignoring unreadable pagination block: {}", e);
                            None
                        }
                    });
                Self::Paginated { citizens, pagination }
            }
            _ => Self::Empty,
        }
    }

    /// Classify a raw response body; blank bodies are empty results.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!("Citizens payload is not JSON ({}), treating as empty", e);
                Self::Empty
            }
        }
    }
}

/// Decode rows one by one; a row that is not a citizen object is dropped
fn decode_records(items: Vec<Value>) -> Vec<CitizenRecord> {
    let total = items.len();
    let records: Vec<CitizenRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<CitizenRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping citizen row {}: {}", index, e);
                None
            }
        })
        .collect();
    if records.len() < total {
        warn!("Dropped {} of {} citizen rows", total - records.len(), total);
    }
    records
}

/// Normalized filter parameters, in wire order.
///
/// A key is present iff its trimmed value is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` if `value` is non-empty after trimming. Re-inserting a key replaces it.
    pub fn insert(&mut self, key: &'static str, value: &str) {
        self.pairs.retain(|(k, _)| *k != key);
        let value = value.trim();
        if !value.is_empty() {
            self.pairs.push((key, value.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// One request against the citizens endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitizenQuery {
    /// Page number (1-based)
    pub page: u32,
    /// Results per page
    pub limit: u32,
    pub params: QueryParams,
}

impl CitizenQuery {
    /// Query string pairs: `page`, `limit`, then every non-empty filter.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(self.params.len() + 2);
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs.extend(self.params.iter().map(|(k, v)| (k, v.to_string())));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_paginated_payload() {
        let payload = CitizenPayload::from_value(json!({
            "citizens": [{"uid": "1", "first": "A"}],
            "pagination": {"page": 2, "limit": 20, "total": 5}
        }));

        match payload {
            CitizenPayload::Paginated { citizens, pagination } => {
                assert_eq!(citizens.len(), 1);
                assert_eq!(citizens[0].uid.as_deref(), Some("1"));
                assert_eq!(citizens[0].first.as_deref(), Some("A"));
                assert_eq!(
                    pagination,
                    Some(Pagination { page: Some(2), limit: Some(20), total: Some(5) })
                );
            }
            other => panic!("Expected paginated payload, got {:?}", other),
        }
    }

    #[test]
    fn test_paginated_without_pagination_block() {
        let payload = CitizenPayload::from_value(json!({"citizens": [{"id": 7}]}));
        match payload {
            CitizenPayload::Paginated { citizens, pagination } => {
                assert_eq!(citizens[0].id.as_deref(), Some("7"));
                assert!(pagination.is_none());
            }
            other => panic!("Expected paginated payload, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_array_payload() {
        let payload = CitizenPayload::from_value(json!([{"uid": "a"}, {"uid": "b"}, {}]));
        match payload {
            CitizenPayload::List(citizens) => assert_eq!(citizens.len(), 3),
            other => panic!("Expected list payload, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_payloads_are_empty() {
        assert_eq!(CitizenPayload::from_value(json!(null)), CitizenPayload::Empty);
        assert_eq!(CitizenPayload::from_value(json!({"data": []})), CitizenPayload::Empty);
        assert_eq!(CitizenPayload::from_value(json!({"citizens": "nope"})), CitizenPayload::Empty);
        assert_eq!(CitizenPayload::from_value(json!(42)), CitizenPayload::Empty);
        assert_eq!(CitizenPayload::from_body(""), CitizenPayload::Empty);
        assert_eq!(CitizenPayload::from_body("<html>oops</html>"), CitizenPayload::Empty);
    }

    #[test]
    fn test_one_odd_row_does_not_blank_the_page() {
        let payload = CitizenPayload::from_value(json!({
            "citizens": [
                {"uid": "a", "first": 1234, "last": "Kaya", "gender": null},
                {"uid": "b", "first": "Ayse", "street_address": ["not", "text"]},
                "not a row",
                {"uid": {"nested": true}}
            ],
            "pagination": {"page": 1, "limit": 10, "total": 2}
        }));
        let CitizenPayload::Paginated { citizens, .. } = payload else {
            panic!("Expected paginated payload");
        };
        assert_eq!(citizens.len(), 2);
        assert_eq!(citizens[0].first.as_deref(), Some("1234"));
        assert_eq!(citizens[0].last.as_deref(), Some("Kaya"));
        assert!(citizens[0].gender.is_none());
        assert_eq!(citizens[1].uid.as_deref(), Some("b"));
        assert!(citizens[1].street_address.is_none());

        let payload = CitizenPayload::from_value(json!([{"uid": "x", "birth_city": true}, 7]));
        let CitizenPayload::List(citizens) = payload else {
            panic!("Expected list payload");
        };
        assert_eq!(citizens.len(), 1);
        assert_eq!(citizens[0].birth_city.as_deref(), Some("true"));
    }

    #[test]
    fn test_unknown_record_fields_are_kept() {
        let payload = CitizenPayload::from_value(json!([{"uid": "1", "blood_type": "0+"}]));
        let CitizenPayload::List(citizens) = payload else {
            panic!("Expected list payload");
        };
        assert_eq!(citizens[0].extra.get("blood_type"), Some(&json!("0+")));
    }

    #[test]
    fn test_query_params_strip_and_trim() {
        let mut params = QueryParams::new();
        params.insert("first_name", "Ali ");
        params.insert("last_name", "   ");
        params.insert("gender", "");

        assert_eq!(params.get("first_name"), Some("Ali"));
        assert_eq!(params.get("last_name"), None);
        assert_eq!(params.len(), 1);

        params.insert("first_name", "");
        assert!(params.is_empty());
    }

    #[test]
    fn test_query_pairs_order() {
        let mut params = QueryParams::new();
        params.insert("search", "veli");
        let query = CitizenQuery { page: 3, limit: 20, params };

        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "3".to_string()),
                ("limit", "20".to_string()),
                ("search", "veli".to_string()),
            ]
        );
    }
}
