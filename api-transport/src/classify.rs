// api-transport/src/classify.rs
use serde_json::Value;
use tracing::warn;

use crate::error::TransportError;
use crate::store::AppStore;
use crate::types::{Notification, NotificationKind};

/// Build the notification for a failed response body.
///
/// Bodies with a `description` are validation failures; the descriptions
/// under `invalid` become details, in body order. Anything else is a plain
/// error without details.
pub fn classify(body: &Value) -> Notification {
    let description = body
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty());

    match description {
        Some(description) => Notification {
            kind: NotificationKind::Validation,
            message: Some(description.to_string()),
            details: body
                .get("invalid")
                .and_then(Value::as_object)
                .map(|invalid| {
                    invalid
                        .values()
                        .filter_map(|field| field.get("description").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        },
        None => Notification {
            kind: NotificationKind::Error,
            message: None,
            details: Vec::new(),
        },
    }
}

/// Publish a classified failure to the store and build the caller's error
pub fn report_failure(store: &dyn AppStore, status: u16, url: &str, body: Value) -> TransportError {
    let notification = classify(&body);
    warn!(
        status,
        %url,
        kind = ?notification.kind,
        message = notification.message.as_deref().unwrap_or(""),
        "request failed"
    );

    store.set_notification(&notification);
    store.set_errors(&body);

    TransportError::Classified {
        status,
        notification,
        body,
    }
}
