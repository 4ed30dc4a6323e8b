// api-transport/src/error.rs
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::http::HttpError;
use crate::types::{FailedResponse, Notification};

/// Everything a call can fail with
#[derive(Debug, Error)]
pub enum TransportError {
    /// No descriptor registered under this id. A configuration bug, not a runtime condition.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error(transparent)]
    Network(#[from] HttpError),

    #[error("cannot encode request: {0}")]
    Encode(String),

    #[error("invalid JSON in response: {0}")]
    JsonParse(#[source] serde_json::Error),

    #[error("unsupported response content type: {0}")]
    ContentTypeUnsupported(String),

    #[error("invalid content-disposition: {0}")]
    ContentDispositionInvalid(String),

    #[error("file download failed: {0}")]
    Download(#[from] std::io::Error),

    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// The page's resource is gone; the router was sent to the not-found surface
    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("request failed with status {status}")]
    Classified {
        status: u16,
        notification: Notification,
        body: serde_json::Value,
    },

    #[error("request failed with status {}", .0.status)]
    OwnErrorHandling(FailedResponse),

    #[error("session refresh failed: {0}")]
    RefreshFailed(Arc<TransportError>),

    #[error("session refresh timed out after {0:?}")]
    RefreshTimedOut(Duration),

    #[error("call dropped before its replay completed")]
    Canceled,
}

impl TransportError {
    /// Notification pushed for this failure, if it was classified
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            TransportError::Classified { notification, .. } => Some(notification),
            TransportError::RefreshFailed(inner) => inner.notification(),
            _ => None,
        }
    }

    /// HTTP status behind this failure, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Classified { status, .. } => Some(*status),
            TransportError::OwnErrorHandling(failed) => Some(failed.status),
            TransportError::NotFound { .. } => Some(crate::http::status::NOT_FOUND),
            TransportError::Network(err) => err.status,
            TransportError::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }
}

/// Invalid endpoint configuration
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("endpoint {endpoint}: invalid method {method}")]
    InvalidMethod { endpoint: String, method: String },

    #[error("endpoint {endpoint}: invalid header {name}")]
    InvalidHeader { endpoint: String, name: String },

    #[error("endpoint {endpoint}: default body must be a JSON object")]
    InvalidBody { endpoint: String },
}
