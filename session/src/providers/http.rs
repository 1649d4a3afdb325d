//! HTTP user service over `reqwest`.

use crate::api::{
    ApiResponse, CreateFieldMappingRequest, DeleteFieldMappingRequest, FieldMappingQuery,
    LoginRequest, PermissionQuery, TimeZoneUpdate, UpdateFieldMappingRequest,
};
use crate::error::ServiceError;
use crate::providers::{ConfigAdapter, ServiceResult, UserService};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
struct Settings {
    base_url: Option<String>,
    token: Option<String>,
}

/// Shared base URL and token used by [`HttpUserService`].
///
/// Also the [`ConfigAdapter`] of the HTTP stack: the session pushes token and
/// instance changes here and every later request picks them up. Clones share
/// the same settings.
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    inner: Arc<RwLock<Settings>>,
}

impl ApiSettings {
    /// Settings with no instance and no token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings pointed at `instance`.
    #[must_use]
    pub fn with_instance(instance: &str) -> Self {
        let settings = Self::new();
        settings.update_instance_url(instance);
        settings
    }

    /// Base URL requests go to, ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .base_url
            .clone()
    }

    /// Bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }
}

impl ConfigAdapter for ApiSettings {
    fn update_token(&self, token: &str) {
        let mut settings = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        settings.token = (!token.is_empty()).then(|| token.to_string());
    }

    fn update_instance_url(&self, url: &str) {
        let mut settings = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        settings.base_url = normalize_instance_url(url);
    }

    fn reset_config(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .token = None;
    }
}

/// Turn an instance name or URL into an API base URL ending in `/`.
///
/// A bare name like `acme-uat` becomes `https://acme-uat/api/`; anything
/// with a scheme is used as given.
#[must_use]
pub fn normalize_instance_url(instance: &str) -> Option<String> {
    let instance = instance.trim();
    if instance.is_empty() {
        return None;
    }

    if instance.starts_with("http://") || instance.starts_with("https://") {
        let mut url = instance.to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        Some(url)
    } else {
        Some(format!("https://{}/api/", instance.trim_end_matches('/')))
    }
}

/// [`UserService`] speaking the JSON REST API.
#[derive(Debug, Clone)]
pub struct HttpUserService {
    client: Client,
    settings: ApiSettings,
}

impl HttpUserService {
    /// Create a service reading base URL and token from `settings`.
    #[must_use]
    pub fn new(settings: ApiSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    /// Create a service with a preconfigured client.
    #[must_use]
    pub const fn with_client(client: Client, settings: ApiSettings) -> Self {
        Self { client, settings }
    }

    /// Shared settings.
    #[must_use]
    pub const fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ServiceError> {
        let base_url = self
            .settings
            .base_url()
            .ok_or_else(|| ServiceError::RequestFailed("no instance URL configured".to_string()))?;

        let mut builder = self
            .client
            .request(method, format!("{base_url}{path}"))
            .header("Accept", "application/json");

        let token = token.map(ToString::to_string).or_else(|| self.settings.token());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send(builder: RequestBuilder) -> ServiceResult {
        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::ResponseParseFailed(e.to_string()))?;

        let data = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(Value::String(body))
        };

        tracing::debug!(status, "User service responded");
        Ok(ApiResponse::new(status, data))
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B, token: Option<&str>) -> ServiceResult {
        let builder = self.request(Method::POST, path, token)?.json(body);
        Self::send(builder).await
    }
}

impl UserService for HttpUserService {
    async fn login(&self, request: &LoginRequest) -> ServiceResult {
        self.post("login", request, None).await
    }

    async fn check_permission(&self, query: &PermissionQuery, token: &str) -> ServiceResult {
        self.post("checkPermission", query, Some(token)).await
    }

    async fn get_profile(&self) -> ServiceResult {
        let builder = self.request(Method::GET, "user-profile", None)?;
        Self::send(builder).await
    }

    async fn set_user_time_zone(&self, update: &TimeZoneUpdate) -> ServiceResult {
        self.post("setUserTimeZone", update, None).await
    }

    async fn get_field_mappings(&self, query: &FieldMappingQuery) -> ServiceResult {
        self.post("performFind", query, None).await
    }

    async fn create_field_mapping(&self, request: &CreateFieldMappingRequest) -> ServiceResult {
        self.post("createDataManagerMapping", request, None).await
    }

    async fn update_field_mapping(&self, request: &UpdateFieldMappingRequest) -> ServiceResult {
        self.post("updateDataManagerMapping", request, None).await
    }

    async fn delete_field_mapping(&self, request: &DeleteFieldMappingRequest) -> ServiceResult {
        self.post("deleteDataManagerMapping", request, None).await
    }
}
