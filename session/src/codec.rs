//! Field mapping value codec.
//!
//! The server stores a mapping's value as a JSON string. Values are encoded
//! on write and decoded on read; nothing else in the crate sees the string.

use crate::api::FieldMappingRecord;
use crate::constants::response_keys;
use crate::error::CodecError;
use crate::types::{FieldMapping, FieldMappingId, FieldMappingValue};
use serde_json::Value;
use std::collections::HashMap;

/// Encode a mapping value for the wire.
///
/// # Errors
///
/// Returns [`CodecError`] if serialization fails.
pub fn encode_value(value: &FieldMappingValue) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a mapping value read from the wire.
///
/// # Errors
///
/// Returns [`CodecError`] if `raw` is not a JSON object of strings.
pub fn decode_value(raw: &str) -> Result<FieldMappingValue, CodecError> {
    Ok(serde_json::from_str(raw)?)
}

impl TryFrom<FieldMappingRecord> for FieldMapping {
    type Error = CodecError;

    fn try_from(record: FieldMappingRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            value: decode_value(&record.mapping_pref_value)?,
            id: FieldMappingId::new(record.mapping_pref_id),
            name: record.mapping_pref_name,
        })
    }
}

/// Decode the `docs` list of a find response.
///
/// Records that cannot be decoded are skipped with a warning. A missing or
/// non-array `docs` yields an empty list.
#[must_use]
pub fn decode_docs(data: &Value) -> Vec<FieldMapping> {
    let Some(docs) = data.get(response_keys::DOCS).and_then(Value::as_array) else {
        return Vec::new();
    };

    docs.iter()
        .filter_map(|doc| {
            let record = match serde_json::from_value::<FieldMappingRecord>(doc.clone()) {
                Ok(record) => record,
                Err(error) => {
                    tracing::warn!(%error, "Skipping malformed field mapping record");
                    return None;
                },
            };
            let id = record.mapping_pref_id.clone();
            match FieldMapping::try_from(record) {
                Ok(mapping) => Some(mapping),
                Err(error) => {
                    tracing::warn!(mapping_id = %id, %error, "Skipping undecodable field mapping");
                    None
                },
            }
        })
        .collect()
}

/// Key mappings by id. Later duplicates replace earlier ones.
#[must_use]
pub fn index_by_id(
    mappings: impl IntoIterator<Item = FieldMapping>,
) -> HashMap<FieldMappingId, FieldMapping> {
    mappings
        .into_iter()
        .map(|mapping| (mapping.id.clone(), mapping))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_decode_docs_skips_bad_records() {
        let data = json!({
            "docs": [
                {
                    "mappingPrefId": "M1",
                    "mappingPrefName": "Default",
                    "mappingPrefValue": "{\"orderId\":\"PO\"}",
                },
                { "mappingPrefId": "M2", "mappingPrefValue": "not json" },
                { "mappingPrefName": "no id" },
            ]
        });

        let mappings = decode_docs(&data);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].id, FieldMappingId::new("M1"));
        assert_eq!(mappings[0].value.get("orderId"), Some("PO"));
    }

    #[test]
    fn test_decode_docs_accepts_numeric_ids() {
        let data = json!({
            "docs": [
                { "mappingPrefId": "M2", "mappingPrefValue": "{}" },
                {
                    "mappingPrefId": 10001,
                    "mappingPrefName": "Numeric",
                    "mappingPrefValue": "{\"sku\":\"Item\"}",
                },
                { "mappingPrefId": "", "mappingPrefValue": "{}" },
            ]
        });

        let index = index_by_id(decode_docs(&data));
        assert_eq!(index.len(), 2);
        assert_eq!(index[&FieldMappingId::new("10001")].name, "Numeric");
    }

    #[test]
    fn test_decode_docs_drops_structured_values() {
        let data = json!({
            "docs": [
                { "mappingPrefId": "M1", "mappingPrefValue": "{\"orderId\":\"PO\"}" },
                { "mappingPrefId": "M2", "mappingPrefValue": "{\"orderId\":{\"column\":\"PO\"}}" },
                { "mappingPrefId": "M3", "mappingPrefValue": "{\"quantity\":3}" },
            ]
        });

        let mappings = decode_docs(&data);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].id, FieldMappingId::new("M1"));
    }

    #[test]
    fn test_decode_docs_without_docs() {
        assert!(decode_docs(&json!({ "count": 0 })).is_empty());
        assert!(decode_docs(&json!("text")).is_empty());
    }

    #[test]
    fn test_index_by_id_replaces_duplicates() {
        let first = FieldMapping {
            id: FieldMappingId::new("M1"),
            name: "old".to_string(),
            value: FieldMappingValue::new(),
        };
        let second = FieldMapping {
            name: "new".to_string(),
            ..first.clone()
        };

        let index = index_by_id([first, second]);
        assert_eq!(index.len(), 1);
        assert_eq!(index[&FieldMappingId::new("M1")].name, "new");
    }

    proptest! {
        #[test]
        fn prop_value_survives_wire(
            entries in proptest::collection::btree_map(".{0,12}", ".{0,24}", 0..8)
        ) {
            let value = FieldMappingValue::from(entries);
            let encoded = encode_value(&value).map_err(|e| TestCaseError::fail(e.to_string()))?;
            let decoded = decode_value(&encoded).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(decoded, value);
        }
    }
}
