// admin-client/src/state.rs
use api_transport::{AppStore, Notification, Router};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

/// In-process stand-in for the admin UI's store and router.
///
/// The CLI has no page to show, so notifications are collected for printing
/// and navigation only moves a location string.
#[derive(Debug)]
pub struct ConsoleState {
    location: Mutex<String>,
    notifications: Mutex<Vec<Notification>>,
    errors: Mutex<Option<Value>>,
    navigations: Mutex<Vec<String>>,
}

impl ConsoleState {
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(location.into()),
            notifications: Mutex::new(Vec::new()),
            errors: Mutex::new(None),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn location(&self) -> String {
        self.location.lock().clone()
    }

    /// Notifications raised since the last call, oldest first
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock())
    }

    /// Last failed body kept for field-level messages
    pub fn errors(&self) -> Option<Value> {
        self.errors.lock().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::at("/")
    }
}

impl AppStore for ConsoleState {
    fn set_notification(&self, notification: &Notification) {
        self.notifications.lock().push(notification.clone());
    }

    fn set_errors(&self, body: &Value) {
        *self.errors.lock() = Some(body.clone());
    }

    fn clear_error_messages(&self, preserve_server_errors: bool) {
        self.notifications.lock().clear();
        if !preserve_server_errors {
            *self.errors.lock() = None;
        }
        debug!(preserve_server_errors, "error messages cleared");
    }
}

impl Router for ConsoleState {
    fn current_location(&self) -> String {
        self.location()
    }

    fn push(&self, path: &str) {
        info!(path, "navigating");
        *self.location.lock() = path.to_string();
        self.navigations.lock().push(path.to_string());
    }
}
