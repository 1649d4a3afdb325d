//! Session providers.
//!
//! Traits for every collaborator the session reducer talks to. The reducer
//! depends on these traits only; the controller is built with concrete
//! implementations.
//!
//! - [`UserService`]: the remote user API
//! - [`Notifier`]: translation and toasts
//! - [`ConfigAdapter`]: process-wide token and instance URL
//! - [`OrderList`]: the sibling order list cleared on logout

use crate::api::{
    ApiResponse, CreateFieldMappingRequest, DeleteFieldMappingRequest, FieldMappingQuery,
    LoginRequest, PermissionQuery, TimeZoneUpdate, UpdateFieldMappingRequest,
};
use crate::error::ServiceError;
use std::future::Future;

pub mod console;
pub mod http;

pub use console::{ConsoleNotifier, ConsoleOrderList};
pub use http::{ApiSettings, HttpUserService};

/// Result of a user service call.
pub type ServiceResult = Result<ApiResponse, ServiceError>;

/// Remote user service.
///
/// Each call is attempted once. Any HTTP response, whatever its status, is
/// returned as an [`ApiResponse`]; only a failure to get a response at all
/// is a [`ServiceError`].
pub trait UserService: Send + Sync {
    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if no response arrived.
    fn login(&self, request: &LoginRequest) -> impl Future<Output = ServiceResult> + Send;

    /// Check a permission, authenticating with `token` rather than the
    /// configured one.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if no response arrived.
    fn check_permission(
        &self,
        query: &PermissionQuery,
        token: &str,
    ) -> impl Future<Output = ServiceResult> + Send;

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if no response arrived.
    fn get_profile(&self) -> impl Future<Output = ServiceResult> + Send;

    /// Save the user's time zone.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if no response arrived.
    fn set_user_time_zone(
        &self,
        update: &TimeZoneUpdate,
    ) -> impl Future<Output = ServiceResult> + Send;

    /// Find saved field mappings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if no response arrived.
    fn get_field_mappings(
        &self,
        query: &FieldMappingQuery,
    ) -> impl Future<Output = ServiceResult> + Send;

    /// Create a field mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if no response arrived.
    fn create_field_mapping(
        &self,
        request: &CreateFieldMappingRequest,
    ) -> impl Future<Output = ServiceResult> + Send;

    /// Update a field mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if no response arrived.
    fn update_field_mapping(
        &self,
        request: &UpdateFieldMappingRequest,
    ) -> impl Future<Output = ServiceResult> + Send;

    /// Delete a field mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if no response arrived.
    fn delete_field_mapping(
        &self,
        request: &DeleteFieldMappingRequest,
    ) -> impl Future<Output = ServiceResult> + Send;
}

/// Translation and user-visible toasts. Fire-and-forget.
pub trait Notifier: Send + Sync {
    /// Localized text for `key`.
    fn translate(&self, key: &str) -> String;

    /// Show a toast.
    fn show_toast(&self, message: &str);

    /// Translate `key` and show it.
    fn notify(&self, key: &str) {
        self.show_toast(&self.translate(key));
    }
}

/// Process-wide request configuration tied to the session lifetime.
pub trait ConfigAdapter: Send + Sync {
    /// Use `token` for subsequent requests.
    fn update_token(&self, token: &str);

    /// Send subsequent requests to `url`.
    fn update_instance_url(&self, url: &str);

    /// Forget the token.
    fn reset_config(&self);
}

/// Order list owned by a sibling domain.
pub trait OrderList: Send + Sync {
    /// Drop every loaded order.
    fn clear_orders(&self);
}
