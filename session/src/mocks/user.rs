//! Mock user service.

use super::lock;
use crate::api::{
    ApiResponse, CreateFieldMappingRequest, DeleteFieldMappingRequest, FieldMappingQuery,
    FieldMappingRecord, LoginRequest, PermissionQuery, TimeZoneUpdate, UpdateFieldMappingRequest,
};
use crate::codec;
use crate::constants::{defaults, response_keys};
use crate::error::{Operation, ServiceError};
use crate::providers::{ServiceResult, UserService};
use crate::types::FieldMappingValue;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct StoredMapping {
    record: FieldMappingRecord,
    pref_type: String,
}

#[derive(Debug, Default)]
struct Backend {
    accounts: HashMap<String, String>,
    granted: HashSet<String>,
    tokens: HashMap<String, String>,
    next_token: u64,
    event_message: Option<String>,
    profile: Option<Value>,
    time_zone: Option<String>,
    mappings: BTreeMap<String, StoredMapping>,
    next_mapping: u64,
    scripted: HashMap<Operation, VecDeque<ServiceResult>>,
    calls: Vec<Operation>,
    permission_tokens: Vec<String>,
}

fn rejected(message: &str) -> ApiResponse {
    ApiResponse::ok(json!({ response_keys::ERROR_MESSAGE: message }))
}

impl Backend {
    /// Record the call and pop a scripted response, if any.
    fn begin(&mut self, operation: Operation) -> Option<ServiceResult> {
        self.calls.push(operation);
        self.scripted
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
    }

    fn login(&mut self, request: &LoginRequest) -> ApiResponse {
        if self.accounts.get(&request.username).map(String::as_str)
            != Some(request.password.expose())
        {
            return rejected("Invalid username or password");
        }

        self.next_token += 1;
        let token = format!("token-{}", self.next_token);
        self.tokens.insert(token.clone(), request.username.clone());

        let mut body = json!({ response_keys::TOKEN: token });
        if let Some(message) = &self.event_message {
            body[response_keys::EVENT_MESSAGE] = json!(message);
        }
        ApiResponse::ok(body)
    }

    fn check_permission(&mut self, query: &PermissionQuery, token: &str) -> ApiResponse {
        self.permission_tokens.push(token.to_string());
        if !self.tokens.contains_key(token) {
            return ApiResponse::new(401, json!("Unauthorized"));
        }
        ApiResponse::ok(json!({
            response_keys::HAS_PERMISSION: self.granted.contains(&query.permission_id),
        }))
    }

    fn profile(&self) -> ApiResponse {
        let mut profile = self.profile.clone().unwrap_or_else(|| {
            json!({
                "userLoginId": "alice",
                "partyId": "10000",
                "partyName": "Alice Example",
            })
        });
        if let Some(time_zone) = &self.time_zone {
            profile["userTimeZone"] = json!(time_zone);
        }
        ApiResponse::ok(profile)
    }

    fn find_mappings(&self, query: &FieldMappingQuery) -> ApiResponse {
        let wanted = &query.input_fields.mapping_pref_type_enum_id;
        let docs: Vec<Value> = self
            .mappings
            .values()
            .filter(|stored| &stored.pref_type == wanted)
            .take(usize::try_from(query.view_size).unwrap_or(usize::MAX))
            .map(|stored| json!(stored.record))
            .collect();
        ApiResponse::ok(json!({ "count": docs.len(), response_keys::DOCS: docs }))
    }

    fn create_mapping(&mut self, request: &CreateFieldMappingRequest) -> ApiResponse {
        self.next_mapping += 1;
        let id = format!("M{:05}", self.next_mapping);
        self.mappings.insert(
            id.clone(),
            StoredMapping {
                record: FieldMappingRecord {
                    mapping_pref_id: id.clone(),
                    mapping_pref_name: request.mapping_pref_name.clone(),
                    mapping_pref_value: request.mapping_pref_value.clone(),
                },
                pref_type: request.mapping_pref_type_enum_id.clone(),
            },
        );
        ApiResponse::ok(json!({ response_keys::MAPPING_PREF_ID: id }))
    }

    fn update_mapping(&mut self, request: &UpdateFieldMappingRequest) -> ApiResponse {
        let Some(stored) = self.mappings.get_mut(&request.mapping_pref_id) else {
            return rejected("DataManagerMapping not found");
        };
        stored.record.mapping_pref_name.clone_from(&request.mapping_pref_name);
        stored.record.mapping_pref_value.clone_from(&request.mapping_pref_value);
        ApiResponse::ok(json!({ response_keys::MAPPING_PREF_ID: request.mapping_pref_id }))
    }

    fn delete_mapping(&mut self, request: &DeleteFieldMappingRequest) -> ApiResponse {
        if self.mappings.remove(&request.mapping_pref_id).is_none() {
            return rejected("DataManagerMapping not found");
        }
        ApiResponse::ok(json!({}))
    }
}

/// Mock user service.
///
/// An in-memory backend: accounts, permissions, a profile, and a mapping
/// table, with tokens issued as `token-1`, `token-2`, ... Any call can be
/// scripted to return a specific response instead. Clones share the same
/// backend.
#[derive(Debug, Clone, Default)]
pub struct MockUserService {
    backend: Arc<Mutex<Backend>>,
}

impl MockUserService {
    /// Create a backend with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account.
    #[must_use]
    pub fn with_account(self, username: &str, password: &str) -> Self {
        lock(&self.backend)
            .accounts
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Grant a permission to every account.
    #[must_use]
    pub fn with_permission(self, permission_id: &str) -> Self {
        lock(&self.backend).granted.insert(permission_id.to_string());
        self
    }

    /// Attach an `_EVENT_MESSAGE_` to successful logins.
    #[must_use]
    pub fn with_event_message(self, message: &str) -> Self {
        lock(&self.backend).event_message = Some(message.to_string());
        self
    }

    /// Replace the default profile.
    #[must_use]
    pub fn with_profile(self, profile: Value) -> Self {
        lock(&self.backend).profile = Some(profile);
        self
    }

    /// Seed a saved mapping of the default preference type.
    #[must_use]
    pub fn with_mapping(self, id: &str, name: &str, value: &FieldMappingValue) -> Self {
        self.with_mapping_of_type(id, name, value, defaults::MAPPING_PREF_TYPE)
    }

    /// Seed a saved mapping of `pref_type`.
    #[must_use]
    pub fn with_mapping_of_type(
        self,
        id: &str,
        name: &str,
        value: &FieldMappingValue,
        pref_type: &str,
    ) -> Self {
        let encoded = codec::encode_value(value).unwrap_or_default();
        self.with_raw_mapping(id, name, &encoded, pref_type)
    }

    /// Seed a saved mapping whose stored value is `raw`, decodable or not.
    #[must_use]
    pub fn with_raw_mapping(self, id: &str, name: &str, raw: &str, pref_type: &str) -> Self {
        lock(&self.backend).mappings.insert(
            id.to_string(),
            StoredMapping {
                record: FieldMappingRecord {
                    mapping_pref_id: id.to_string(),
                    mapping_pref_name: name.to_string(),
                    mapping_pref_value: raw.to_string(),
                },
                pref_type: pref_type.to_string(),
            },
        );
        self
    }

    /// Answer the next `operation` call with `response`.
    pub fn respond_with(&self, operation: Operation, response: ApiResponse) {
        self.script(operation, Ok(response));
    }

    /// Fail the next `operation` call before any response arrives.
    pub fn fail_with(&self, operation: Operation, message: &str) {
        self.script(
            operation,
            Err(ServiceError::RequestFailed(message.to_string())),
        );
    }

    fn script(&self, operation: Operation, result: ServiceResult) {
        lock(&self.backend)
            .scripted
            .entry(operation)
            .or_default()
            .push_back(result);
    }

    /// Every call received, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<Operation> {
        lock(&self.backend).calls.clone()
    }

    /// Number of calls to `operation`.
    #[must_use]
    pub fn call_count(&self, operation: Operation) -> usize {
        lock(&self.backend)
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    /// Tokens presented to the permission check.
    #[must_use]
    pub fn permission_tokens(&self) -> Vec<String> {
        lock(&self.backend).permission_tokens.clone()
    }

    /// Saved mappings as stored, ordered by id.
    #[must_use]
    pub fn stored_mappings(&self) -> Vec<FieldMappingRecord> {
        lock(&self.backend)
            .mappings
            .values()
            .map(|stored| stored.record.clone())
            .collect()
    }

    /// Time zone saved through `set_user_time_zone`.
    #[must_use]
    pub fn time_zone(&self) -> Option<String> {
        lock(&self.backend).time_zone.clone()
    }

    fn handle<F>(&self, operation: Operation, respond: F) -> impl Future<Output = ServiceResult> + Send
    where
        F: FnOnce(&mut Backend) -> ApiResponse,
    {
        let result = {
            let mut backend = lock(&self.backend);
            match backend.begin(operation) {
                Some(scripted) => scripted,
                None => Ok(respond(&mut backend)),
            }
        };
        async move { result }
    }
}

impl UserService for MockUserService {
    fn login(&self, request: &LoginRequest) -> impl Future<Output = ServiceResult> + Send {
        self.handle(Operation::Login, |backend| backend.login(request))
    }

    fn check_permission(
        &self,
        query: &PermissionQuery,
        token: &str,
    ) -> impl Future<Output = ServiceResult> + Send {
        self.handle(Operation::CheckPermission, |backend| {
            backend.check_permission(query, token)
        })
    }

    fn get_profile(&self) -> impl Future<Output = ServiceResult> + Send {
        self.handle(Operation::GetProfile, |backend| backend.profile())
    }

    fn set_user_time_zone(
        &self,
        update: &TimeZoneUpdate,
    ) -> impl Future<Output = ServiceResult> + Send {
        self.handle(Operation::SetUserTimeZone, |backend| {
            backend.time_zone = Some(update.tz_id.clone());
            ApiResponse::ok(json!({ "successMessage": "Time zone updated" }))
        })
    }

    fn get_field_mappings(
        &self,
        query: &FieldMappingQuery,
    ) -> impl Future<Output = ServiceResult> + Send {
        self.handle(Operation::GetFieldMappings, |backend| {
            backend.find_mappings(query)
        })
    }

    fn create_field_mapping(
        &self,
        request: &CreateFieldMappingRequest,
    ) -> impl Future<Output = ServiceResult> + Send {
        self.handle(Operation::CreateFieldMapping, |backend| {
            backend.create_mapping(request)
        })
    }

    fn update_field_mapping(
        &self,
        request: &UpdateFieldMappingRequest,
    ) -> impl Future<Output = ServiceResult> + Send {
        self.handle(Operation::UpdateFieldMapping, |backend| {
            backend.update_mapping(request)
        })
    }

    fn delete_field_mapping(
        &self,
        request: &DeleteFieldMappingRequest,
    ) -> impl Future<Output = ServiceResult> + Send {
        self.handle(Operation::DeleteFieldMapping, |backend| {
            backend.delete_mapping(request)
        })
    }
}
