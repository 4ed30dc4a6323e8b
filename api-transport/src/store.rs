// api-transport/src/store.rs
use serde_json::Value;

use crate::types::Notification;

/// Application state the transport reports into
pub trait AppStore: Send + Sync {
    fn set_notification(&self, notification: &Notification);

    /// Raw failed body, read later by form validators for field messages
    fn set_errors(&self, body: &Value);

    fn clear_error_messages(&self, preserve_server_errors: bool);
}

/// Navigation surface of the embedding application
pub trait Router: Send + Sync {
    fn current_location(&self) -> String;

    fn push(&self, path: &str);
}

/// Store that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl AppStore for NoopStore {
    fn set_notification(&self, _notification: &Notification) {}

    fn set_errors(&self, _body: &Value) {}

    fn clear_error_messages(&self, _preserve_server_errors: bool) {}
}

/// Router that stays on `/` and ignores navigation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRouter;

impl Router for NoopRouter {
    fn current_location(&self) -> String {
        "/".to_string()
    }

    fn push(&self, _path: &str) {}
}
