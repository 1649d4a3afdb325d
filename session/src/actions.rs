//! Session actions.
//!
//! Three kinds flow through the reducer:
//!
//! - **Commands** carry a correlation id and start a remote call.
//! - **Commits** change local state only.
//! - **Outcomes** are produced by effects and end a command.

use crate::error::SessionError;
use crate::types::{
    Facility, FieldMapping, FieldMappingDraft, FieldMappingId, LoginPayload, Password,
    UserProfile,
};
use uuid::Uuid;

/// Every action the session reducer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    // Commands
    /// Log in and, if configured, check the app permission.
    Login {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Login id
        username: String,
        /// Password
        password: Password,
    },

    /// Fetch the user profile.
    GetProfile {
        /// Correlates the outcome
        correlation_id: Uuid,
    },

    /// Save the user's time zone.
    SetUserTimeZone {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// New time zone id
        time_zone: String,
    },

    /// Fetch saved field mappings.
    GetFieldMappings {
        /// Correlates the outcome
        correlation_id: Uuid,
    },

    /// Save a new field mapping.
    CreateFieldMapping {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Mapping to save
        draft: FieldMappingDraft,
    },

    /// Overwrite an existing field mapping.
    UpdateFieldMapping {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Mapping with its existing id
        mapping: FieldMapping,
    },

    /// Delete a field mapping.
    DeleteFieldMapping {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Mapping to delete
        id: FieldMappingId,
    },

    // Commits
    /// End the session.
    Logout,

    /// Select a facility, or clear the selection.
    FacilityUpdated {
        /// New selection
        facility: Option<Facility>,
    },

    /// Set the date/time display format.
    DateTimeFormatUpdated {
        /// Format string
        format: String,
    },

    /// Point the app at another backend instance.
    InstanceUrlUpdated {
        /// Instance name or base URL
        url: String,
    },

    /// Select a field mapping, or clear the selection.
    CurrentMappingUpdated {
        /// New selection
        mapping: Option<FieldMapping>,
    },

    // Outcomes
    /// Credentials (and permission, if configured) accepted.
    ///
    /// Commits the token and runs the post-login tasks.
    Authenticated {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Issued token
        token: String,
        /// Raw login response
        payload: LoginPayload,
    },

    /// Login and every post-login task finished.
    LoginCompleted {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Raw login response
        payload: LoginPayload,
    },

    /// Login or the permission check failed.
    LoginFailed {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Why
        error: SessionError,
    },

    /// Profile fetched.
    ProfileUpdated {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Fetched profile
        profile: UserProfile,
    },

    /// Time zone saved.
    TimeZoneUpdated {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Saved time zone id
        time_zone: String,
    },

    /// Saved field mappings fetched; replaces the collection.
    FieldMappingsReplaced {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Fetched mappings
        mappings: Vec<FieldMapping>,
    },

    /// No saved field mappings matched; the collection is left alone.
    FieldMappingsUnchanged {
        /// Correlates the outcome
        correlation_id: Uuid,
    },

    /// Field mapping saved.
    FieldMappingCreated {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Saved mapping with its new id
        mapping: FieldMapping,
    },

    /// Field mapping overwritten.
    FieldMappingUpdated {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Saved mapping
        mapping: FieldMapping,
    },

    /// Field mapping deleted.
    FieldMappingDeleted {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Deleted id
        id: FieldMappingId,
    },

    /// A remote call other than login failed.
    RequestFailed {
        /// Correlates the outcome
        correlation_id: Uuid,
        /// Why
        error: SessionError,
    },
}

impl SessionAction {
    /// Correlation id of commands and outcomes; `None` for commits.
    #[must_use]
    pub const fn correlation_id(&self) -> Option<Uuid> {
        match self {
            Self::Login { correlation_id, .. }
            | Self::GetProfile { correlation_id }
            | Self::SetUserTimeZone { correlation_id, .. }
            | Self::GetFieldMappings { correlation_id }
            | Self::CreateFieldMapping { correlation_id, .. }
            | Self::UpdateFieldMapping { correlation_id, .. }
            | Self::DeleteFieldMapping { correlation_id, .. }
            | Self::Authenticated { correlation_id, .. }
            | Self::LoginCompleted { correlation_id, .. }
            | Self::LoginFailed { correlation_id, .. }
            | Self::ProfileUpdated { correlation_id, .. }
            | Self::TimeZoneUpdated { correlation_id, .. }
            | Self::FieldMappingsReplaced { correlation_id, .. }
            | Self::FieldMappingsUnchanged { correlation_id }
            | Self::FieldMappingCreated { correlation_id, .. }
            | Self::FieldMappingUpdated { correlation_id, .. }
            | Self::FieldMappingDeleted { correlation_id, .. }
            | Self::RequestFailed { correlation_id, .. } => Some(*correlation_id),
            Self::Logout
            | Self::FacilityUpdated { .. }
            | Self::DateTimeFormatUpdated { .. }
            | Self::InstanceUrlUpdated { .. }
            | Self::CurrentMappingUpdated { .. } => None,
        }
    }

    /// Returns `true` for actions that end a command.
    ///
    /// `Authenticated` is not terminal: `LoginCompleted` follows it.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::LoginCompleted { .. }
                | Self::LoginFailed { .. }
                | Self::ProfileUpdated { .. }
                | Self::TimeZoneUpdated { .. }
                | Self::FieldMappingsReplaced { .. }
                | Self::FieldMappingsUnchanged { .. }
                | Self::FieldMappingCreated { .. }
                | Self::FieldMappingUpdated { .. }
                | Self::FieldMappingDeleted { .. }
                | Self::RequestFailed { .. }
        )
    }

    /// Returns `true` if this action ends the command `correlation_id`.
    #[must_use]
    pub fn completes(&self, correlation_id: Uuid) -> bool {
        self.is_terminal() && self.correlation_id() == Some(correlation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_matches_only_terminal_with_same_id() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();

        let done = SessionAction::FieldMappingsUnchanged { correlation_id: id };
        assert!(done.completes(id));
        assert!(!done.completes(other));

        let command = SessionAction::GetFieldMappings { correlation_id: id };
        assert!(!command.completes(id));

        let authenticated = SessionAction::Authenticated {
            correlation_id: id,
            token: "t".to_string(),
            payload: LoginPayload::new(serde_json::Value::Null),
        };
        assert!(!authenticated.completes(id));
    }

    #[test]
    fn test_commits_have_no_correlation() {
        assert_eq!(SessionAction::Logout.correlation_id(), None);
        assert!(!SessionAction::Logout.is_terminal());
    }

    #[test]
    fn test_login_debug_hides_password() {
        let action = SessionAction::Login {
            correlation_id: Uuid::nil(),
            username: "alice".to_string(),
            password: Password::from("hunter2"),
        };
        assert!(!format!("{action:?}").contains("hunter2"));
    }
}
