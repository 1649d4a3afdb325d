//! Session controller.
//!
//! The entry point the UI calls. Owns the store and exposes one async method
//! per operation.

use crate::actions::SessionAction;
use crate::config::SessionConfig;
use crate::environment::SessionEnvironment;
use crate::error::{Result, SessionError};
use crate::providers::{ConfigAdapter, Notifier, OrderList, UserService};
use crate::reducer::SessionReducer;
use crate::state::SessionState;
use crate::types::{
    Facility, FieldMapping, FieldMappingDraft, FieldMappingId, LoginPayload, Password,
    UserProfile,
};
use importer_runtime::Store;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Store type used by [`SessionController`].
pub type SessionStore<U, N, C, O> =
    Store<SessionState, SessionAction, SessionEnvironment<U, N, C, O>, SessionReducer<U, N, C, O>>;

/// Session and preferences controller.
///
/// Remote operations send a command tagged with a fresh correlation id and
/// wait for its outcome; everything the command caused has been committed by
/// the time the method returns. Failures are logged, toasted, and returned.
/// Local operations commit and return once their side effects ran.
///
/// # Example
///
/// ```ignore
/// let controller = SessionController::new(
///     HttpUserService::new(settings.clone()),
///     ConsoleNotifier::new(),
///     settings,
///     ConsoleOrderList::new(),
///     SessionConfig::from_env(),
/// );
///
/// controller.login("alice", "secret").await?;
/// let mappings = controller.field_mappings().await;
/// ```
pub struct SessionController<U, N, C, O>
where
    U: UserService + Clone + 'static,
    N: Notifier + Clone + 'static,
    C: ConfigAdapter + Clone + 'static,
    O: OrderList + Clone + 'static,
{
    store: SessionStore<U, N, C, O>,
    request_timeout: Duration,
}

impl<U, N, C, O> Clone for SessionController<U, N, C, O>
where
    U: UserService + Clone + 'static,
    N: Notifier + Clone + 'static,
    C: ConfigAdapter + Clone + 'static,
    O: OrderList + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<U, N, C, O> SessionController<U, N, C, O>
where
    U: UserService + Clone + 'static,
    N: Notifier + Clone + 'static,
    C: ConfigAdapter + Clone + 'static,
    O: OrderList + Clone + 'static,
{
    /// Create a controller with an empty session.
    ///
    /// A configured instance URL seeds the session but is not pushed to the
    /// adapter; call [`Self::set_user_instance_url`] for that.
    #[must_use]
    pub fn new(users: U, notifier: N, config_adapter: C, orders: O, config: SessionConfig) -> Self {
        let state = SessionState {
            instance_url: config.instance_url.clone(),
            date_time_format: config.default_date_format.clone(),
            ..SessionState::default()
        };
        let request_timeout = config.request_timeout;
        let environment = SessionEnvironment::new(users, notifier, config_adapter, orders, config);

        Self {
            store: Store::new(state, SessionReducer::new(), environment),
            request_timeout,
        }
    }

    /// The underlying store, for observers.
    #[must_use]
    pub const fn store(&self) -> &SessionStore<U, N, C, O> {
        &self.store
    }

    /// Send a command and wait for the outcome with its correlation id.
    async fn request(&self, command: SessionAction) -> Result<SessionAction> {
        let Some(correlation_id) = command.correlation_id() else {
            return Err(SessionError::Store("command without correlation id".to_string()));
        };

        self.store
            .send_and_wait_for(
                command,
                move |action| action.completes(correlation_id),
                self.request_timeout,
            )
            .await
            .map_err(|error| {
                tracing::error!(%correlation_id, %error, "No outcome for command");
                SessionError::from(error)
            })
    }

    /// Send a local commit and wait for its side effects.
    async fn commit(&self, action: SessionAction) {
        let mut handle = self.store.send(action).await;
        handle.wait().await;
    }

    // Authentication

    /// Log in.
    ///
    /// With a configured permission id the permission is checked using the
    /// new token before anything is committed. On success the token is
    /// committed, the profile and field mappings are loaded, and the date
    /// format is reset before this returns.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Application`]: credentials rejected
    /// - [`SessionError::PermissionDenied`]: permission not granted
    /// - [`SessionError::Transport`]: login or permission call failed
    /// - [`SessionError::Store`]: no outcome within the request timeout
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<Password>,
    ) -> Result<LoginPayload> {
        let command = SessionAction::Login {
            correlation_id: Uuid::new_v4(),
            username: username.into(),
            password: password.into(),
        };

        match self.request(command).await? {
            SessionAction::LoginCompleted { payload, .. } => Ok(payload),
            SessionAction::LoginFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// End the session. Never fails.
    pub async fn logout(&self) {
        self.commit(SessionAction::Logout).await;
    }

    // Profile and preferences

    /// Fetch the profile, then the saved field mappings.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] of the failed profile call.
    pub async fn get_profile(&self) -> Result<UserProfile> {
        let command = SessionAction::GetProfile {
            correlation_id: Uuid::new_v4(),
        };

        match self.request(command).await? {
            SessionAction::ProfileUpdated { profile, .. } => Ok(profile),
            SessionAction::RequestFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Select a facility, or clear the selection.
    pub async fn set_facility(&self, facility: Option<Facility>) {
        self.commit(SessionAction::FacilityUpdated { facility }).await;
    }

    /// Set the date/time display format.
    pub async fn set_date_time_format(&self, format: impl Into<String>) {
        self.commit(SessionAction::DateTimeFormatUpdated {
            format: format.into(),
        })
        .await;
    }

    /// Save the user's time zone and merge it into the profile.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] of the failed update.
    pub async fn set_user_time_zone(&self, time_zone: impl Into<String>) -> Result<()> {
        let command = SessionAction::SetUserTimeZone {
            correlation_id: Uuid::new_v4(),
            time_zone: time_zone.into(),
        };

        match self.request(command).await? {
            SessionAction::TimeZoneUpdated { .. } => Ok(()),
            SessionAction::RequestFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Point the app at another backend instance.
    pub async fn set_user_instance_url(&self, url: impl Into<String>) {
        self.commit(SessionAction::InstanceUrlUpdated { url: url.into() })
            .await;
    }

    // Field mappings

    /// Fetch saved field mappings, replacing the held ones.
    ///
    /// When nothing matches, the held mappings are kept. Returns the number
    /// of mappings held afterwards.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] of the failed fetch.
    pub async fn get_field_mappings(&self) -> Result<usize> {
        let command = SessionAction::GetFieldMappings {
            correlation_id: Uuid::new_v4(),
        };

        match self.request(command).await? {
            SessionAction::FieldMappingsReplaced { .. }
            | SessionAction::FieldMappingsUnchanged { .. } => {
                Ok(self.store.state(|s| s.field_mappings.len()).await)
            },
            SessionAction::RequestFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Save a new field mapping.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] of the failed save.
    pub async fn create_field_mapping(&self, draft: FieldMappingDraft) -> Result<FieldMapping> {
        let command = SessionAction::CreateFieldMapping {
            correlation_id: Uuid::new_v4(),
            draft,
        };

        match self.request(command).await? {
            SessionAction::FieldMappingCreated { mapping, .. } => Ok(mapping),
            SessionAction::RequestFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Overwrite an existing field mapping.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] of the failed update.
    pub async fn update_field_mapping(&self, mapping: FieldMapping) -> Result<FieldMapping> {
        let command = SessionAction::UpdateFieldMapping {
            correlation_id: Uuid::new_v4(),
            mapping,
        };

        match self.request(command).await? {
            SessionAction::FieldMappingUpdated { mapping, .. } => Ok(mapping),
            SessionAction::RequestFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete a field mapping.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] of the failed delete, including the
    /// server's answer for an unknown id.
    pub async fn delete_field_mapping(&self, id: impl Into<FieldMappingId>) -> Result<()> {
        let command = SessionAction::DeleteFieldMapping {
            correlation_id: Uuid::new_v4(),
            id: id.into(),
        };

        match self.request(command).await? {
            SessionAction::FieldMappingDeleted { .. } => Ok(()),
            SessionAction::RequestFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Select a field mapping, or clear the selection.
    pub async fn update_current_mapping(&self, mapping: Option<FieldMapping>) {
        self.commit(SessionAction::CurrentMappingUpdated { mapping })
            .await;
    }

    // Reads

    /// Returns `true` if a token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.store.state(SessionState::is_authenticated).await
    }

    /// Held token.
    pub async fn token(&self) -> Option<String> {
        self.store.state(|s| s.token.clone()).await
    }

    /// Profile of the signed-in user.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.store.state(|s| s.current_user.clone()).await
    }

    /// Selected facility.
    pub async fn current_facility(&self) -> Option<Facility> {
        self.store.state(|s| s.current_facility.clone()).await
    }

    /// Selected backend instance.
    pub async fn instance_url(&self) -> Option<String> {
        self.store.state(|s| s.instance_url.clone()).await
    }

    /// Date/time display format.
    pub async fn date_time_format(&self) -> String {
        self.store.state(|s| s.date_time_format.clone()).await
    }

    /// Saved field mappings keyed by id.
    pub async fn field_mappings(&self) -> HashMap<FieldMappingId, FieldMapping> {
        self.store.state(|s| s.field_mappings.clone()).await
    }

    /// Selected field mapping.
    pub async fn current_mapping(&self) -> Option<FieldMapping> {
        self.store.state(|s| s.current_mapping.clone()).await
    }

    /// Copy of the whole session state.
    pub async fn snapshot(&self) -> SessionState {
        self.store.state(SessionState::clone).await
    }
}

fn unexpected(action: &SessionAction) -> SessionError {
    SessionError::Store(format!("unexpected outcome: {action:?}"))
}
