//! Recording notifier, configuration adapter, and order list.

use super::lock;
use crate::providers::{ConfigAdapter, Notifier, OrderList};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Notifier that records every toast.
///
/// Translation is the identity unless a key was given a text with
/// [`RecordingNotifier::with_translation`], so recorded toasts usually equal
/// the message keys.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    toasts: Arc<Mutex<Vec<String>>>,
    translations: Arc<HashMap<String, String>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate `key` to `text`.
    #[must_use]
    pub fn with_translation(mut self, key: &str, text: &str) -> Self {
        Arc::make_mut(&mut self.translations).insert(key.to_string(), text.to_string());
        self
    }

    /// Toasts shown so far, oldest first.
    #[must_use]
    pub fn toasts(&self) -> Vec<String> {
        lock(&self.toasts).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn translate(&self, key: &str) -> String {
        self.translations
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn show_toast(&self, message: &str) {
        lock(&self.toasts).push(message.to_string());
    }
}

/// A call made to a [`RecordingConfigAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// `update_token`
    TokenUpdated(String),
    /// `update_instance_url`
    InstanceUrlUpdated(String),
    /// `reset_config`
    Reset,
}

/// Configuration adapter that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingConfigAdapter {
    events: Arc<Mutex<Vec<ConfigEvent>>>,
}

impl RecordingConfigAdapter {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<ConfigEvent> {
        lock(&self.events).clone()
    }

    /// Tokens passed to `update_token`.
    #[must_use]
    pub fn token_updates(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                ConfigEvent::TokenUpdated(token) => Some(token.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `reset_config` calls.
    #[must_use]
    pub fn reset_count(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| **event == ConfigEvent::Reset)
            .count()
    }
}

impl ConfigAdapter for RecordingConfigAdapter {
    fn update_token(&self, token: &str) {
        lock(&self.events).push(ConfigEvent::TokenUpdated(token.to_string()));
    }

    fn update_instance_url(&self, url: &str) {
        lock(&self.events).push(ConfigEvent::InstanceUrlUpdated(url.to_string()));
    }

    fn reset_config(&self) {
        lock(&self.events).push(ConfigEvent::Reset);
    }
}

/// Order list that counts clears.
#[derive(Debug, Clone, Default)]
pub struct RecordingOrderList {
    clears: Arc<AtomicUsize>,
}

impl RecordingOrderList {
    /// Create a fresh counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `clear_orders` calls.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl OrderList for RecordingOrderList {
    fn clear_orders(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}
