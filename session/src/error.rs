//! Error types for session and field-mapping operations.

use importer_runtime::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::messages;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// The remote operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Username/password login.
    Login,
    /// Permission check gating a login.
    CheckPermission,
    /// Profile retrieval.
    GetProfile,
    /// Time zone preference update.
    SetUserTimeZone,
    /// Saved field mapping retrieval.
    GetFieldMappings,
    /// Field mapping creation.
    CreateFieldMapping,
    /// Field mapping update.
    UpdateFieldMapping,
    /// Field mapping deletion.
    DeleteFieldMapping,
}

impl Operation {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::CheckPermission => "check_permission",
            Self::GetProfile => "get_profile",
            Self::SetUserTimeZone => "set_user_time_zone",
            Self::GetFieldMappings => "get_field_mappings",
            Self::CreateFieldMapping => "create_field_mapping",
            Self::UpdateFieldMapping => "update_field_mapping",
            Self::DeleteFieldMapping => "delete_field_mapping",
        }
    }

    /// Translation key of the toast shown when this operation fails.
    ///
    /// `None` means the failure is logged only.
    #[must_use]
    pub const fn failure_message(self) -> Option<&'static str> {
        match self {
            Self::Login | Self::CheckPermission => Some(messages::SOMETHING_WENT_WRONG),
            Self::GetProfile => Some(messages::PROFILE_FETCH_FAILED),
            Self::SetUserTimeZone => Some(messages::TIME_ZONE_UPDATE_FAILED),
            Self::GetFieldMappings => None,
            Self::CreateFieldMapping => Some(messages::MAPPING_SAVE_FAILED),
            Self::UpdateFieldMapping => Some(messages::MAPPING_UPDATE_FAILED),
            Self::DeleteFieldMapping => Some(messages::MAPPING_DELETE_FAILED),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level failure reported by a [`UserService`](crate::providers::UserService).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request could not be sent or no response arrived.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// A response arrived but its body could not be read.
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}

/// Field mapping value could not be encoded or decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("field mapping value codec error: {0}")]
pub struct CodecError(pub String);

impl From<serde_json::Error> for CodecError {
    fn from(error: serde_json::Error) -> Self {
        Self(error.to_string())
    }
}

/// Coarse classification of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Non-200 status or the call never completed.
    TransportOrServer,
    /// 200 status with an error flag in the payload.
    Application,
    /// The permission check answered "no".
    PermissionDenied,
    /// A field mapping value failed to encode or decode.
    Codec,
    /// The local store did not answer in time.
    Store,
}

/// Error returned by every controller operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Transport failure or non-200 status.
    #[error("{operation} failed: {message}")]
    Transport {
        /// Operation that failed
        operation: Operation,
        /// HTTP status, when a response arrived
        status: Option<u16>,
        /// Failure detail
        message: String,
    },

    /// The server answered 200 but flagged an application error.
    #[error("{operation} rejected by server: {message}")]
    Application {
        /// Operation that failed
        operation: Operation,
        /// Server-supplied error message
        message: String,
    },

    /// The configured permission is not granted to this user.
    #[error("Permission denied: {permission_id}")]
    PermissionDenied {
        /// Permission that was checked
        permission_id: String,
    },

    /// A field mapping value could not be encoded or decoded.
    #[error("{operation} failed: {source}")]
    Codec {
        /// Operation that failed
        operation: Operation,
        /// Underlying codec failure
        source: CodecError,
    },

    /// The store did not produce the operation's outcome.
    #[error("Store error: {0}")]
    Store(String),
}

impl SessionError {
    /// Wrap a transport failure.
    #[must_use]
    pub fn from_service(operation: Operation, error: &ServiceError) -> Self {
        Self::Transport {
            operation,
            status: None,
            message: error.to_string(),
        }
    }

    /// Wrap a codec failure.
    #[must_use]
    pub const fn codec(operation: Operation, source: CodecError) -> Self {
        Self::Codec { operation, source }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::TransportOrServer,
            Self::Application { .. } => ErrorKind::Application,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Codec { .. } => ErrorKind::Codec,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Operation the error belongs to, when known.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Transport { operation, .. }
            | Self::Application { operation, .. }
            | Self::Codec { operation, .. } => Some(*operation),
            Self::PermissionDenied { .. } => Some(Operation::CheckPermission),
            Self::Store(_) => None,
        }
    }

    /// Returns `true` if the permission gate rejected or could not answer.
    #[must_use]
    pub fn is_permission_failure(&self) -> bool {
        self.operation() == Some(Operation::CheckPermission)
    }

    /// Returns `true` if login itself was rejected or unreachable.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        self.operation() == Some(Operation::Login)
    }

    /// Translation key of the toast for a failed login.
    #[must_use]
    pub fn login_failure_message(&self) -> &'static str {
        if self.is_permission_failure() {
            messages::PERMISSION_DENIED
        } else if self.kind() == ErrorKind::Application {
            messages::INCORRECT_CREDENTIALS
        } else {
            messages::SOMETHING_WENT_WRONG
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}
