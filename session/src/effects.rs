//! Remote calls run by session effects.
//!
//! Each function makes the calls for one command and turns the result into
//! the outcome action the reducer commits. None of them touch state.

use crate::actions::SessionAction;
use crate::api::{
    CreateFieldMappingRequest, DeleteFieldMappingRequest, FieldMappingQuery, LoginRequest,
    PermissionQuery, TimeZoneUpdate, UpdateFieldMappingRequest, record_id,
};
use crate::codec;
use crate::constants::response_keys;
use crate::error::{Operation, ServiceError, SessionError};
use crate::providers::UserService;
use crate::types::{FieldMapping, FieldMappingDraft, FieldMappingId, LoginPayload, UserProfile};
use serde_json::Value;
use uuid::Uuid;

/// Run `call` for `operation` and check its envelope.
async fn checked<F>(operation: Operation, call: F) -> Result<Value, SessionError>
where
    F: std::future::Future<Output = Result<crate::api::ApiResponse, ServiceError>>,
{
    call.await
        .map_err(|e| SessionError::from_service(operation, &e))?
        .into_checked(operation)
}

fn unreadable(operation: Operation, detail: impl std::fmt::Display) -> SessionError {
    SessionError::from_service(operation, &ServiceError::ResponseParseFailed(detail.to_string()))
}

/// Log in and, when `permission_id` is set, check it with the new token.
///
/// Yields `Authenticated` or `LoginFailed`. The token is never committed
/// here; on a denied permission it is simply dropped.
pub async fn authenticate<U: UserService>(
    users: &U,
    permission_id: Option<&str>,
    correlation_id: Uuid,
    request: LoginRequest,
) -> SessionAction {
    match login_with_permission(users, permission_id, &request).await {
        Ok((token, payload)) => SessionAction::Authenticated {
            correlation_id,
            token,
            payload,
        },
        Err(error) => SessionAction::LoginFailed {
            correlation_id,
            error,
        },
    }
}

async fn login_with_permission<U: UserService>(
    users: &U,
    permission_id: Option<&str>,
    request: &LoginRequest,
) -> Result<(String, LoginPayload), SessionError> {
    let payload = LoginPayload::new(checked(Operation::Login, users.login(request)).await?);
    let token = payload
        .token()
        .ok_or_else(|| unreadable(Operation::Login, "login response carried no token"))?
        .to_string();

    if let Some(permission_id) = permission_id {
        let query = PermissionQuery {
            permission_id: permission_id.to_string(),
        };
        let data = checked(
            Operation::CheckPermission,
            users.check_permission(&query, &token),
        )
        .await?;

        let granted = data
            .get(response_keys::HAS_PERMISSION)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !granted {
            return Err(SessionError::PermissionDenied {
                permission_id: permission_id.to_string(),
            });
        }
    }

    Ok((token, payload))
}

/// Fetch the profile. Yields `ProfileUpdated` or `RequestFailed`.
pub async fn fetch_profile<U: UserService>(users: &U, correlation_id: Uuid) -> SessionAction {
    let result = async {
        let data = checked(Operation::GetProfile, users.get_profile()).await?;
        serde_json::from_value::<UserProfile>(data)
            .map_err(|e| unreadable(Operation::GetProfile, e))
    }
    .await;

    match result {
        Ok(profile) => SessionAction::ProfileUpdated {
            correlation_id,
            profile,
        },
        Err(error) => SessionAction::RequestFailed {
            correlation_id,
            error,
        },
    }
}

/// Save the time zone. Yields `TimeZoneUpdated` or `RequestFailed`.
pub async fn update_time_zone<U: UserService>(
    users: &U,
    correlation_id: Uuid,
    time_zone: String,
) -> SessionAction {
    let update = TimeZoneUpdate {
        tz_id: time_zone.clone(),
    };

    match checked(Operation::SetUserTimeZone, users.set_user_time_zone(&update)).await {
        Ok(_) => SessionAction::TimeZoneUpdated {
            correlation_id,
            time_zone,
        },
        Err(error) => SessionAction::RequestFailed {
            correlation_id,
            error,
        },
    }
}

/// Fetch saved mappings.
///
/// Yields `FieldMappingsReplaced`, `FieldMappingsUnchanged` when nothing
/// decodable came back, or `RequestFailed`.
pub async fn fetch_field_mappings<U: UserService>(
    users: &U,
    correlation_id: Uuid,
    query: FieldMappingQuery,
) -> SessionAction {
    match checked(Operation::GetFieldMappings, users.get_field_mappings(&query)).await {
        Ok(data) => {
            let mappings = codec::decode_docs(&data);
            if mappings.is_empty() {
                SessionAction::FieldMappingsUnchanged { correlation_id }
            } else {
                SessionAction::FieldMappingsReplaced {
                    correlation_id,
                    mappings,
                }
            }
        },
        Err(error) => SessionAction::RequestFailed {
            correlation_id,
            error,
        },
    }
}

/// Create a mapping. Yields `FieldMappingCreated` or `RequestFailed`.
pub async fn create_field_mapping<U: UserService>(
    users: &U,
    correlation_id: Uuid,
    draft: FieldMappingDraft,
    pref_type: String,
) -> SessionAction {
    const OP: Operation = Operation::CreateFieldMapping;

    let result = async {
        let request = CreateFieldMappingRequest {
            mapping_pref_name: draft.name.clone(),
            mapping_pref_value: codec::encode_value(&draft.value)
                .map_err(|e| SessionError::codec(OP, e))?,
            mapping_pref_type_enum_id: pref_type,
        };
        let data = checked(OP, users.create_field_mapping(&request)).await?;

        let Some(id) = data.get(response_keys::MAPPING_PREF_ID).and_then(record_id) else {
            return Err(unreadable(OP, "create response carried no mappingPrefId"));
        };
        Ok(draft.into_mapping(FieldMappingId::new(id)))
    }
    .await;

    match result {
        Ok(mapping) => SessionAction::FieldMappingCreated {
            correlation_id,
            mapping,
        },
        Err(error) => SessionAction::RequestFailed {
            correlation_id,
            error,
        },
    }
}

/// Overwrite a mapping. Yields `FieldMappingUpdated` or `RequestFailed`.
pub async fn update_field_mapping<U: UserService>(
    users: &U,
    correlation_id: Uuid,
    mapping: FieldMapping,
    pref_type: String,
) -> SessionAction {
    const OP: Operation = Operation::UpdateFieldMapping;

    let result = async {
        let request = UpdateFieldMappingRequest {
            mapping_pref_id: mapping.id.to_string(),
            mapping_pref_name: mapping.name.clone(),
            mapping_pref_value: codec::encode_value(&mapping.value)
                .map_err(|e| SessionError::codec(OP, e))?,
            mapping_pref_type_enum_id: pref_type,
        };
        checked(OP, users.update_field_mapping(&request)).await
    }
    .await;

    match result {
        Ok(_) => SessionAction::FieldMappingUpdated {
            correlation_id,
            mapping,
        },
        Err(error) => SessionAction::RequestFailed {
            correlation_id,
            error,
        },
    }
}

/// Delete a mapping. Yields `FieldMappingDeleted` or `RequestFailed`.
pub async fn delete_field_mapping<U: UserService>(
    users: &U,
    correlation_id: Uuid,
    id: FieldMappingId,
) -> SessionAction {
    let request = DeleteFieldMappingRequest {
        mapping_pref_id: id.to_string(),
    };

    match checked(Operation::DeleteFieldMapping, users.delete_field_mapping(&request)).await {
        Ok(_) => SessionAction::FieldMappingDeleted { correlation_id, id },
        Err(error) => SessionAction::RequestFailed {
            correlation_id,
            error,
        },
    }
}
