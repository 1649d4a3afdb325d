//! Wire types for the user service.
//!
//! Every call answers with an [`ApiResponse`] envelope. A `200` status does
//! not mean success: the payload may still carry `_ERROR_MESSAGE_` or
//! `_ERROR_MESSAGE_LIST_`.

use crate::constants::{defaults, response_keys};
use crate::error::{Operation, SessionError};
use crate::types::Password;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Response envelope: HTTP status plus decoded body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body. Non-JSON bodies arrive as `Value::String`.
    pub data: Value,
}

impl ApiResponse {
    /// Build a response.
    #[must_use]
    pub const fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    /// A `200` response.
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self::new(200, data)
    }

    /// Returns `true` if the payload carries an application error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        has_error(&self.data)
    }

    /// Returns `true` for a `200` without an application error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 200 && !self.has_error()
    }

    /// First error message in the payload.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        error_message(&self.data)
    }

    /// Classify the response and hand back the payload on success.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Transport`] for any status other than `200`
    /// - [`SessionError::Application`] when the payload flags an error
    pub fn into_checked(self, operation: Operation) -> Result<Value, SessionError> {
        if self.status != 200 {
            let message = self
                .error_message()
                .unwrap_or_else(|| format!("unexpected status {}", self.status));
            return Err(SessionError::Transport {
                operation,
                status: Some(self.status),
                message,
            });
        }

        if self.has_error() {
            return Err(SessionError::Application {
                operation,
                message: self
                    .error_message()
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(self.data)
    }
}

/// Returns `true` if `data` carries `_ERROR_MESSAGE_` or a non-empty
/// `_ERROR_MESSAGE_LIST_`.
#[must_use]
pub fn has_error(data: &Value) -> bool {
    let message = data
        .get(response_keys::ERROR_MESSAGE)
        .is_some_and(|v| !v.is_null() && v.as_str().is_none_or(|s| !s.is_empty()));
    let list = data
        .get(response_keys::ERROR_MESSAGE_LIST)
        .is_some_and(|v| v.as_array().is_none_or(|items| !items.is_empty()));
    message || list
}

/// First error message in `data`, if any.
#[must_use]
pub fn error_message(data: &Value) -> Option<String> {
    if let Some(message) = data
        .get(response_keys::ERROR_MESSAGE)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return Some(message.to_string());
    }

    let first = data
        .get(response_keys::ERROR_MESSAGE_LIST)
        .and_then(Value::as_array)
        .and_then(|items| items.first())?;

    match first {
        Value::String(message) => Some(message.clone()),
        Value::Object(entry) => entry
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        other => Some(other.to_string()),
    }
}

/// Read a `mappingPrefId`, which may arrive as a non-empty string or a number.
#[must_use]
pub fn record_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn deserialize_record_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    record_id(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid mappingPrefId: {raw}")))
}

fn expose_password<S: Serializer>(password: &Password, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(password.expose())
}

/// Body of the login call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Login id.
    #[serde(rename = "USERNAME")]
    pub username: String,
    /// Password, redacted in `Debug`.
    #[serde(rename = "PASSWORD", serialize_with = "expose_password")]
    pub password: Password,
}

/// Query of the permission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionQuery {
    /// Permission being checked.
    pub permission_id: String,
}

/// Body of the time zone update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeZoneUpdate {
    /// New time zone id.
    pub tz_id: String,
}

/// Condition block of [`FieldMappingQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMappingFilter {
    /// Preference type category.
    pub mapping_pref_type_enum_id: String,
}

/// Find query for saved field mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMappingQuery {
    /// Filter conditions.
    pub input_fields: FieldMappingFilter,
    /// Columns to return.
    pub field_list: Vec<String>,
    /// Page size.
    pub view_size: u32,
    /// Queried entity.
    pub entity_name: String,
}

impl FieldMappingQuery {
    /// Query for up to `view_size` mappings of `pref_type`.
    #[must_use]
    pub fn new(pref_type: impl Into<String>, view_size: u32) -> Self {
        Self {
            input_fields: FieldMappingFilter {
                mapping_pref_type_enum_id: pref_type.into(),
            },
            field_list: vec![
                "mappingPrefName".to_string(),
                "mappingPrefId".to_string(),
                "mappingPrefValue".to_string(),
            ],
            view_size,
            entity_name: defaults::MAPPING_ENTITY.to_string(),
        }
    }
}

/// A saved field mapping as the server stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMappingRecord {
    /// Record id. The server sends it as a string or a number.
    #[serde(deserialize_with = "deserialize_record_id")]
    pub mapping_pref_id: String,
    /// Display name.
    #[serde(default)]
    pub mapping_pref_name: String,
    /// JSON-encoded mapping value.
    pub mapping_pref_value: String,
}

/// Body of the create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFieldMappingRequest {
    /// Display name.
    pub mapping_pref_name: String,
    /// JSON-encoded mapping value.
    pub mapping_pref_value: String,
    /// Preference type category.
    pub mapping_pref_type_enum_id: String,
}

/// Body of the update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldMappingRequest {
    /// Record id.
    pub mapping_pref_id: String,
    /// Display name.
    pub mapping_pref_name: String,
    /// JSON-encoded mapping value.
    pub mapping_pref_value: String,
    /// Preference type category.
    pub mapping_pref_type_enum_id: String,
}

/// Body of the delete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFieldMappingRequest {
    /// Record id.
    pub mapping_pref_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_error_variants() {
        assert!(has_error(&json!({ "_ERROR_MESSAGE_": "boom" })));
        assert!(has_error(&json!({ "_ERROR_MESSAGE_LIST_": ["boom"] })));
        assert!(!has_error(&json!({ "_ERROR_MESSAGE_LIST_": [] })));
        assert!(!has_error(&json!({ "_ERROR_MESSAGE_": "" })));
        assert!(!has_error(&json!({ "token": "abc" })));
        assert!(!has_error(&json!("plain text")));
    }

    #[test]
    fn test_error_message_prefers_single_message() {
        let data = json!({
            "_ERROR_MESSAGE_": "first",
            "_ERROR_MESSAGE_LIST_": [{ "message": "second" }],
        });
        assert_eq!(error_message(&data).as_deref(), Some("first"));

        let list_only = json!({ "_ERROR_MESSAGE_LIST_": [{ "message": "second" }] });
        assert_eq!(error_message(&list_only).as_deref(), Some("second"));
    }

    #[test]
    fn test_into_checked_classifies() {
        let transport = ApiResponse::new(500, json!("Internal Server Error"));
        assert!(matches!(
            transport.into_checked(Operation::GetProfile),
            Err(SessionError::Transport { status: Some(500), .. })
        ));

        let application = ApiResponse::ok(json!({ "_ERROR_MESSAGE_": "bad password" }));
        assert_eq!(
            application.into_checked(Operation::Login),
            Err(SessionError::Application {
                operation: Operation::Login,
                message: "bad password".to_string(),
            })
        );

        let ok = ApiResponse::ok(json!({ "token": "abc" }));
        assert_eq!(ok.into_checked(Operation::Login), Ok(json!({ "token": "abc" })));
    }

    #[test]
    fn test_login_request_serializes_password() -> Result<(), serde_json::Error> {
        let request = LoginRequest {
            username: "alice".to_string(),
            password: Password::from("secret"),
        };
        assert_eq!(
            serde_json::to_value(&request)?,
            json!({ "USERNAME": "alice", "PASSWORD": "secret" })
        );
        assert!(!format!("{request:?}").contains("secret"));
        Ok(())
    }

    #[test]
    fn test_field_mapping_query_shape() -> Result<(), serde_json::Error> {
        let query = FieldMappingQuery::new("MAPPING_PURCHASE_ORDER", 20);
        assert_eq!(
            serde_json::to_value(&query)?,
            json!({
                "inputFields": { "mappingPrefTypeEnumId": "MAPPING_PURCHASE_ORDER" },
                "fieldList": ["mappingPrefName", "mappingPrefId", "mappingPrefValue"],
                "viewSize": 20,
                "entityName": "DataManagerMapping",
            })
        );
        Ok(())
    }
}
