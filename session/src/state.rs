//! Session state.
//!
//! Owned by the store; only the reducer writes to it.

use crate::types::{Facility, FieldMapping, FieldMappingId, UserProfile};
use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything the UI reads about the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Auth token. Present iff the session is authenticated.
    pub token: Option<String>,

    /// Profile of the signed-in user.
    pub current_user: Option<UserProfile>,

    /// Selected facility.
    pub current_facility: Option<Facility>,

    /// Date/time display format.
    pub date_time_format: String,

    /// Backend instance the user picked. Survives logout.
    pub instance_url: Option<String>,

    /// Saved field mappings keyed by id.
    pub field_mappings: HashMap<FieldMappingId, FieldMapping>,

    /// Transient field mapping selection.
    pub current_mapping: Option<FieldMapping>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            token: None,
            current_user: None,
            current_facility: None,
            date_time_format: defaults::DATE_FORMAT.to_string(),
            instance_url: None,
            field_mappings: HashMap::new(),
            current_mapping: None,
        }
    }
}

impl SessionState {
    /// Returns `true` if a token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Saved mapping by id.
    #[must_use]
    pub fn field_mapping(&self, id: &FieldMappingId) -> Option<&FieldMapping> {
        self.field_mappings.get(id)
    }

    /// Drop everything tied to the signed-in user.
    ///
    /// The instance URL and date/time format are preferences of the device,
    /// not of the user, and are kept.
    pub fn clear_session(&mut self) {
        self.token = None;
        self.current_user = None;
        self.current_facility = None;
        self.field_mappings.clear();
        self.current_mapping = None;
    }
}
