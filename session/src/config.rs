//! Session configuration.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Empty values are treated as unset.

use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable names read by [`SessionConfig::from_env`].
pub mod vars {
    /// Instance name or base URL of the backend.
    pub const INSTANCE_URL: &str = "IMPORTER_INSTANCE_URL";
    /// Permission required to use the app.
    pub const PERMISSION_ID: &str = "IMPORTER_PERMISSION_ID";
    /// Date/time format committed at login.
    pub const DATE_FORMAT: &str = "IMPORTER_DATE_FORMAT";
    /// Preference type of saved field mappings.
    pub const MAPPING_PREF_TYPE: &str = "IMPORTER_MAPPING_PREF_TYPE";
    /// Page size of the saved field mapping query.
    pub const MAPPING_PAGE_SIZE: &str = "IMPORTER_MAPPING_PAGE_SIZE";
    /// Prefix marking a login event message as an advisory.
    pub const ADVISORY_PREFIX: &str = "IMPORTER_ADVISORY_PREFIX";
    /// Seconds the controller waits for an operation to finish.
    pub const REQUEST_TIMEOUT_SECS: &str = "IMPORTER_REQUEST_TIMEOUT_SECS";
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Backend instance, either a bare instance name or a full base URL.
    pub instance_url: Option<String>,

    /// Permission checked after login. `None` skips the check.
    pub permission_id: Option<String>,

    /// Date/time format committed after a successful login.
    ///
    /// Default: `MM/dd/yyyy`
    pub default_date_format: String,

    /// Preference type category used to filter saved field mappings.
    ///
    /// Default: `MAPPING_PURCHASE_ORDER`
    pub mapping_pref_type: String,

    /// Maximum number of saved field mappings fetched.
    ///
    /// Default: 20
    pub mapping_page_size: u32,

    /// Prefix a login `_EVENT_MESSAGE_` must start with to be shown.
    ///
    /// Default: `Alert:`
    pub advisory_prefix: String,

    /// How long the controller waits for an operation to finish.
    ///
    /// Default: 30 seconds
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            instance_url: None,
            permission_id: None,
            default_date_format: defaults::DATE_FORMAT.to_string(),
            mapping_pref_type: defaults::MAPPING_PREF_TYPE.to_string(),
            mapping_page_size: defaults::MAPPING_PAGE_SIZE,
            advisory_prefix: defaults::ADVISORY_PREFIX.to_string(),
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SessionConfig {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable numbers fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let fallback = Self::default();

        Self {
            instance_url: get(vars::INSTANCE_URL),
            permission_id: get(vars::PERMISSION_ID),
            default_date_format: get(vars::DATE_FORMAT).unwrap_or(fallback.default_date_format),
            mapping_pref_type: get(vars::MAPPING_PREF_TYPE).unwrap_or(fallback.mapping_pref_type),
            mapping_page_size: get(vars::MAPPING_PAGE_SIZE)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(fallback.mapping_page_size),
            advisory_prefix: get(vars::ADVISORY_PREFIX).unwrap_or(fallback.advisory_prefix),
            request_timeout: get(vars::REQUEST_TIMEOUT_SECS)
                .and_then(|s| s.trim().parse().ok())
                .map_or(fallback.request_timeout, Duration::from_secs),
        }
    }

    /// Set the backend instance.
    #[must_use]
    pub fn with_instance_url(mut self, instance_url: impl Into<String>) -> Self {
        self.instance_url = Some(instance_url.into());
        self
    }

    /// Require a permission after login.
    #[must_use]
    pub fn with_permission_id(mut self, permission_id: impl Into<String>) -> Self {
        self.permission_id = Some(permission_id.into());
        self
    }

    /// Set the date/time format committed at login.
    #[must_use]
    pub fn with_default_date_format(mut self, format: impl Into<String>) -> Self {
        self.default_date_format = format.into();
        self
    }

    /// Set the saved field mapping preference type.
    #[must_use]
    pub fn with_mapping_pref_type(mut self, pref_type: impl Into<String>) -> Self {
        self.mapping_pref_type = pref_type.into();
        self
    }

    /// Set the saved field mapping page size.
    #[must_use]
    pub const fn with_mapping_page_size(mut self, page_size: u32) -> Self {
        self.mapping_page_size = page_size;
        self
    }

    /// Set the advisory prefix.
    #[must_use]
    pub fn with_advisory_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.advisory_prefix = prefix.into();
        self
    }

    /// Set the controller wait timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the advisory text if `event_message` carries the advisory prefix.
    #[must_use]
    pub fn advisory<'a>(&self, event_message: &'a str) -> Option<&'a str> {
        if self.advisory_prefix.is_empty() || !event_message.starts_with(&self.advisory_prefix) {
            return None;
        }
        Some(event_message)
    }
}
