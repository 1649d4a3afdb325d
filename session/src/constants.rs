//! Session constants.
//!
//! Translation keys, wire field names, and configuration defaults.

/// Translation keys for user-facing toasts.
///
/// Keys double as the English text when no catalog entry exists.
pub mod messages {
    /// Generic failure.
    pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";

    /// Login rejected by the server.
    pub const INCORRECT_CREDENTIALS: &str =
        "Sorry, your username or password is incorrect. Please try again.";

    /// Permission check failed or was denied.
    pub const PERMISSION_DENIED: &str = "You do not have permission to access the app.";

    /// Profile could not be loaded.
    pub const PROFILE_FETCH_FAILED: &str = "Failed to fetch user profile";

    /// Time zone saved.
    pub const TIME_ZONE_UPDATED: &str = "Time zone updated successfully";

    /// Time zone could not be saved.
    pub const TIME_ZONE_UPDATE_FAILED: &str = "Failed to update time zone";

    /// Field mapping created.
    pub const MAPPING_SAVED: &str = "This mapping has been saved.";

    /// Field mapping creation failed.
    pub const MAPPING_SAVE_FAILED: &str = "Failed to save mapping";

    /// Field mapping updated.
    pub const MAPPING_UPDATED: &str = "Changes to the mapping have been saved.";

    /// Field mapping update failed.
    pub const MAPPING_UPDATE_FAILED: &str = "Failed to update mapping";

    /// Field mapping deleted.
    pub const MAPPING_DELETED: &str = "Mapping deleted successfully.";

    /// Field mapping deletion failed.
    pub const MAPPING_DELETE_FAILED: &str = "Failed to delete mapping";
}

/// Field names in server payloads.
pub mod response_keys {
    /// Single application error message.
    pub const ERROR_MESSAGE: &str = "_ERROR_MESSAGE_";

    /// List of application error messages.
    pub const ERROR_MESSAGE_LIST: &str = "_ERROR_MESSAGE_LIST_";

    /// Informational message attached to a successful response.
    pub const EVENT_MESSAGE: &str = "_EVENT_MESSAGE_";

    /// Token issued by login.
    pub const TOKEN: &str = "token";

    /// Permission check verdict.
    pub const HAS_PERMISSION: &str = "hasPermission";

    /// Records returned by a find query.
    pub const DOCS: &str = "docs";

    /// Identifier of a created field mapping.
    pub const MAPPING_PREF_ID: &str = "mappingPrefId";
}

/// Configuration defaults.
pub mod defaults {
    /// Date/time display format committed at login.
    pub const DATE_FORMAT: &str = "MM/dd/yyyy";

    /// Preference type category of saved mappings.
    pub const MAPPING_PREF_TYPE: &str = "MAPPING_PURCHASE_ORDER";

    /// Entity queried for saved mappings.
    pub const MAPPING_ENTITY: &str = "DataManagerMapping";

    /// Maximum number of saved mappings fetched.
    pub const MAPPING_PAGE_SIZE: u32 = 20;

    /// Prefix marking a login event message worth showing.
    pub const ADVISORY_PREFIX: &str = "Alert:";

    /// Seconds the controller waits for an operation's outcome.
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
