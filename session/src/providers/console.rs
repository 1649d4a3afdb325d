//! Console providers for development.
//!
//! Toasts and order-list resets are written to the log instead of a UI.

use crate::providers::{Notifier, OrderList};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Notifier that logs toasts.
///
/// Translation looks the key up in a catalog and falls back to the key
/// itself, which is the English text.
///
/// # Examples
///
/// ```
/// use importer_session::providers::{ConsoleNotifier, Notifier};
///
/// let notifier = ConsoleNotifier::new()
///     .with_translation("Something went wrong", "Algo salió mal");
/// assert_eq!(notifier.translate("Something went wrong"), "Algo salió mal");
/// assert_eq!(notifier.translate("Unknown key"), "Unknown key");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConsoleNotifier {
    catalog: Arc<HashMap<String, String>>,
}

impl ConsoleNotifier {
    /// Create a notifier with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalog entry.
    #[must_use]
    pub fn with_translation(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.catalog).insert(key.into(), text.into());
        self
    }
}

impl Notifier for ConsoleNotifier {
    fn translate(&self, key: &str) -> String {
        self.catalog
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn show_toast(&self, message: &str) {
        info!(toast = %message, "Toast");
    }
}

/// Order list stand-in that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleOrderList;

impl ConsoleOrderList {
    /// Create the order list.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl OrderList for ConsoleOrderList {
    fn clear_orders(&self) {
        info!("Order list cleared");
    }
}
