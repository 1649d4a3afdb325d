//! Domain types held in session state.

use crate::constants::response_keys;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Profile of the signed-in user.
///
/// Fields the session does not interpret are kept in `extra` so the profile
/// round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Login id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_login_id: Option<String>,

    /// Party id of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<String>,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_name: Option<String>,

    /// Preferred time zone id (e.g. `America/New_York`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_time_zone: Option<String>,

    /// Everything else the server sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A facility selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// Facility id.
    pub facility_id: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_name: Option<String>,
}

impl Facility {
    /// Create a facility selection without a display name.
    #[must_use]
    pub fn new(facility_id: impl Into<String>) -> Self {
        Self {
            facility_id: facility_id.into(),
            facility_name: None,
        }
    }
}

/// Server-assigned field mapping identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMappingId(String);

impl FieldMappingId {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldMappingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldMappingId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FieldMappingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Mapping from system field names to import-file column names.
///
/// Stored on the server as a JSON string; see [`crate::codec`]. Only flat
/// string-to-string objects decode. A fetched record whose value is nested
/// or holds non-string entries is dropped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMappingValue(BTreeMap<String, String>);

impl FieldMappingValue {
    /// An empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Map `field` to `column`, returning the previous column.
    pub fn insert(&mut self, field: impl Into<String>, column: impl Into<String>) -> Option<String> {
        self.0.insert(field.into(), column.into())
    }

    /// Column mapped to `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Number of mapped fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(field, column)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for FieldMappingValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMappingValue
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A saved field mapping preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Server-assigned id.
    pub id: FieldMappingId,
    /// Display name.
    pub name: String,
    /// Decoded mapping.
    pub value: FieldMappingValue,
}

/// A field mapping that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappingDraft {
    /// Display name.
    pub name: String,
    /// Mapping to save.
    pub value: FieldMappingValue,
}

impl FieldMappingDraft {
    /// Create a draft.
    #[must_use]
    pub fn new(name: impl Into<String>, value: FieldMappingValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Attach the id the server assigned.
    #[must_use]
    pub fn into_mapping(self, id: FieldMappingId) -> FieldMapping {
        FieldMapping {
            id,
            name: self.name,
            value: self.value,
        }
    }
}

/// Raw login response payload, returned to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginPayload(Value);

impl LoginPayload {
    /// Wrap a login response body.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Issued token, if present and non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.0
            .get(response_keys::TOKEN)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
    }

    /// Informational `_EVENT_MESSAGE_`, if present.
    #[must_use]
    pub fn event_message(&self) -> Option<&str> {
        self.0.get(response_keys::EVENT_MESSAGE).and_then(Value::as_str)
    }

    /// Borrow the raw payload.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw payload.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

/// A password that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wrap a password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// The clear-text password, for the login request body only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_keeps_unknown_fields() -> Result<(), serde_json::Error> {
        let raw = json!({
            "userLoginId": "alice",
            "partyName": "Alice",
            "userTimeZone": "UTC",
            "stores": [{"productStoreId": "STORE"}],
        });

        let profile: UserProfile = serde_json::from_value(raw.clone())?;
        assert_eq!(profile.user_login_id.as_deref(), Some("alice"));
        assert!(profile.extra.contains_key("stores"));
        assert_eq!(serde_json::to_value(&profile)?, raw);
        Ok(())
    }

    #[test]
    fn test_login_payload_accessors() {
        let payload = LoginPayload::new(json!({
            "token": "abc",
            "_EVENT_MESSAGE_": "Alert: password expires soon",
        }));
        assert_eq!(payload.token(), Some("abc"));
        assert_eq!(payload.event_message(), Some("Alert: password expires soon"));

        let empty = LoginPayload::new(json!({ "token": "" }));
        assert_eq!(empty.token(), None);
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::from("hunter2");
        assert_eq!(format!("{password:?}"), "Password(***)");
        assert_eq!(password.expose(), "hunter2");
    }

    #[test]
    fn test_field_mapping_value_collects() {
        let value: FieldMappingValue = [("orderId", "PO Number"), ("sku", "Item")]
            .into_iter()
            .collect();
        assert_eq!(value.len(), 2);
        assert_eq!(value.get("sku"), Some("Item"));
        assert_eq!(
            value.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["orderId", "sku"]
        );
    }
}
