//! Session reducer.
//!
//! All session state transitions live here. Remote calls are described as
//! effects (see [`crate::effects`]) and their outcomes come back as actions.

use crate::actions::SessionAction;
use crate::api::{FieldMappingQuery, LoginRequest};
use crate::codec;
use crate::constants::messages;
use crate::effects;
use crate::environment::SessionEnvironment;
use crate::providers::{ConfigAdapter, Notifier, OrderList, UserService};
use crate::state::SessionState;
use importer_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::marker::PhantomData;
use uuid::Uuid;

/// Session reducer.
///
/// After a successful login the following run in order, each finishing
/// before the next starts:
///
/// 1. token committed to state
/// 2. token pushed to the configuration adapter
/// 3. profile fetch, which in turn fetches saved field mappings
/// 4. date/time format reset to the configured default
/// 5. advisory toast, if the login message carries the advisory prefix
/// 6. `LoginCompleted`
#[derive(Debug)]
pub struct SessionReducer<U, N, C, O> {
    _phantom: PhantomData<fn() -> (U, N, C, O)>,
}

impl<U, N, C, O> SessionReducer<U, N, C, O> {
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<U, N, C, O> Default for SessionReducer<U, N, C, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U, N, C, O> Clone for SessionReducer<U, N, C, O> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Toast `key` through the notifier.
fn notify<A, N>(notifier: &N, key: &'static str) -> Effect<A>
where
    A: 'static,
    N: Notifier + Clone + 'static,
{
    let notifier = notifier.clone();
    Effect::run(move || notifier.notify(key))
}

impl<U, N, C, O> Reducer for SessionReducer<U, N, C, O>
where
    U: UserService + Clone + 'static,
    N: Notifier + Clone + 'static,
    C: ConfigAdapter + Clone + 'static,
    O: OrderList + Clone + 'static,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<U, N, C, O>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // Authentication
            SessionAction::Login {
                correlation_id,
                username,
                password,
            } => {
                tracing::info!(%correlation_id, %username, "Login requested");
                let users = env.users.clone();
                let permission_id = env.config.permission_id.clone();
                let request = LoginRequest { username, password };

                smallvec![Effect::future(async move {
                    Some(
                        effects::authenticate(
                            &users,
                            permission_id.as_deref(),
                            correlation_id,
                            request,
                        )
                        .await,
                    )
                })]
            },

            SessionAction::Authenticated {
                correlation_id,
                token,
                payload,
            } => {
                tracing::info!(%correlation_id, "Login accepted, running post-login tasks");
                state.token = Some(token.clone());

                let adapter = env.config_adapter.clone();
                let mut steps = vec![
                    Effect::run(move || adapter.update_token(&token)),
                    Effect::send(SessionAction::GetProfile {
                        correlation_id: Uuid::new_v4(),
                    }),
                    Effect::send(SessionAction::DateTimeFormatUpdated {
                        format: env.config.default_date_format.clone(),
                    }),
                ];

                let advisory = payload
                    .event_message()
                    .and_then(|message| env.config.advisory(message))
                    .map(ToString::to_string);
                if let Some(advisory) = advisory {
                    let notifier = env.notifier.clone();
                    steps.push(Effect::run(move || notifier.show_toast(&advisory)));
                }

                steps.push(Effect::send(SessionAction::LoginCompleted {
                    correlation_id,
                    payload,
                }));

                smallvec![Effect::chain(steps)]
            },

            SessionAction::LoginCompleted { correlation_id, .. } => {
                tracing::info!(%correlation_id, "Login completed");
                smallvec![Effect::None]
            },

            SessionAction::LoginFailed {
                correlation_id,
                error,
            } => {
                tracing::warn!(%correlation_id, %error, "Login failed");
                smallvec![notify(&env.notifier, error.login_failure_message())]
            },

            SessionAction::Logout => {
                tracing::info!("Logging out");
                state.clear_session();

                let adapter = env.config_adapter.clone();
                let orders = env.orders.clone();
                smallvec![Effect::run(move || {
                    adapter.reset_config();
                    orders.clear_orders();
                })]
            },

            // Profile and preferences
            SessionAction::GetProfile { correlation_id } => {
                let users = env.users.clone();
                smallvec![Effect::future(async move {
                    Some(effects::fetch_profile(&users, correlation_id).await)
                })]
            },

            SessionAction::ProfileUpdated {
                correlation_id,
                profile,
            } => {
                tracing::debug!(%correlation_id, "Profile updated");
                state.current_user = Some(profile);
                smallvec![Effect::send(SessionAction::GetFieldMappings {
                    correlation_id: Uuid::new_v4(),
                })]
            },

            SessionAction::FacilityUpdated { facility } => {
                state.current_facility = facility;
                smallvec![Effect::None]
            },

            SessionAction::DateTimeFormatUpdated { format } => {
                state.date_time_format = format;
                smallvec![Effect::None]
            },

            SessionAction::SetUserTimeZone {
                correlation_id,
                time_zone,
            } => {
                let users = env.users.clone();
                smallvec![Effect::future(async move {
                    Some(effects::update_time_zone(&users, correlation_id, time_zone).await)
                })]
            },

            SessionAction::TimeZoneUpdated {
                correlation_id,
                time_zone,
            } => {
                tracing::info!(%correlation_id, %time_zone, "Time zone updated");
                if let Some(user) = state.current_user.as_mut() {
                    user.user_time_zone = Some(time_zone);
                }
                smallvec![notify(&env.notifier, messages::TIME_ZONE_UPDATED)]
            },

            SessionAction::InstanceUrlUpdated { url } => {
                state.instance_url = Some(url.clone());
                let adapter = env.config_adapter.clone();
                smallvec![Effect::run(move || adapter.update_instance_url(&url))]
            },

            // Field mappings
            SessionAction::GetFieldMappings { correlation_id } => {
                let users = env.users.clone();
                let query = FieldMappingQuery::new(
                    env.config.mapping_pref_type.clone(),
                    env.config.mapping_page_size,
                );
                smallvec![Effect::future(async move {
                    Some(effects::fetch_field_mappings(&users, correlation_id, query).await)
                })]
            },

            SessionAction::FieldMappingsReplaced {
                correlation_id,
                mappings,
            } => {
                tracing::debug!(%correlation_id, count = mappings.len(), "Field mappings replaced");
                state.field_mappings = codec::index_by_id(mappings);
                smallvec![Effect::None]
            },

            SessionAction::FieldMappingsUnchanged { correlation_id } => {
                tracing::debug!(%correlation_id, "No saved field mappings found");
                smallvec![Effect::None]
            },

            SessionAction::CreateFieldMapping {
                correlation_id,
                draft,
            } => {
                let users = env.users.clone();
                let pref_type = env.config.mapping_pref_type.clone();
                smallvec![Effect::future(async move {
                    Some(effects::create_field_mapping(&users, correlation_id, draft, pref_type).await)
                })]
            },

            SessionAction::FieldMappingCreated {
                correlation_id,
                mapping,
            } => {
                tracing::info!(%correlation_id, mapping_id = %mapping.id, "Field mapping created");
                state.field_mappings.insert(mapping.id.clone(), mapping);
                smallvec![notify(&env.notifier, messages::MAPPING_SAVED)]
            },

            SessionAction::UpdateFieldMapping {
                correlation_id,
                mapping,
            } => {
                let users = env.users.clone();
                let pref_type = env.config.mapping_pref_type.clone();
                smallvec![Effect::future(async move {
                    Some(effects::update_field_mapping(&users, correlation_id, mapping, pref_type).await)
                })]
            },

            SessionAction::FieldMappingUpdated {
                correlation_id,
                mapping,
            } => {
                tracing::info!(%correlation_id, mapping_id = %mapping.id, "Field mapping updated");
                state.field_mappings.insert(mapping.id.clone(), mapping);
                smallvec![notify(&env.notifier, messages::MAPPING_UPDATED)]
            },

            SessionAction::DeleteFieldMapping { correlation_id, id } => {
                let users = env.users.clone();
                smallvec![Effect::future(async move {
                    Some(effects::delete_field_mapping(&users, correlation_id, id).await)
                })]
            },

            SessionAction::FieldMappingDeleted { correlation_id, id } => {
                tracing::info!(%correlation_id, mapping_id = %id, "Field mapping deleted");
                state.field_mappings.remove(&id);
                smallvec![notify(&env.notifier, messages::MAPPING_DELETED)]
            },

            SessionAction::CurrentMappingUpdated { mapping } => {
                state.current_mapping = mapping;
                smallvec![Effect::None]
            },

            SessionAction::RequestFailed {
                correlation_id,
                error,
            } => {
                let operation = error.operation();
                tracing::error!(
                    %correlation_id,
                    operation = operation.map(|op| op.as_str()),
                    %error,
                    "Request failed"
                );
                match operation.and_then(|op| op.failure_message()) {
                    Some(key) => smallvec![notify(&env.notifier, key)],
                    None => smallvec![Effect::None],
                }
            },
        }
    }
}
