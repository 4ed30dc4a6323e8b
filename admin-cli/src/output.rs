// admin-cli/src/output.rs
use admin_client::{Notification, NotificationKind, ResponseEnvelope, TransportError};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::io::IsTerminal;

/// Output format option
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Auto-detect based on TTY
    Auto,
    /// Force JSON output
    Json,
    /// Force human-readable output
    Human,
}

impl OutputFormat {
    pub fn is_human(self) -> bool {
        match self {
            Self::Json => false,
            Self::Human => true,
            Self::Auto => std::io::stdout().is_terminal(),
        }
    }
}

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format as JSON string
    fn to_json(&self) -> String;

    /// Format as human-readable string
    fn to_human(&self) -> String;
}

/// Format output based on the specified format
pub fn format_output<T: Formattable>(data: &T, format: OutputFormat) -> String {
    if format.is_human() {
        data.to_human()
    } else {
        data.to_json()
    }
}

/// Standard JSON response envelope
#[derive(Debug, Serialize)]
pub struct Response<T> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

impl<T> Response<T> {
    pub fn ok(result: T) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
            meta: None,
        }
    }

    pub fn ok_with_meta(result: T, meta: Meta) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
            meta: Some(meta),
        }
    }

    pub fn error(error: ErrorResponse) -> Response<()> {
        Response::<()> {
            ok: false,
            result: None,
            error: Some(error),
            meta: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    type_: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

impl ErrorResponse {
    fn new(type_: &'static str, message: String, retryable: bool) -> Self {
        Self {
            type_,
            message,
            status: None,
            details: Vec::new(),
            retryable: Some(retryable),
        }
    }

    pub fn invalid_argument(message: String) -> Self {
        Self::new("invalid_argument", message, false)
    }

    pub fn login_failed(message: String) -> Self {
        Self::new("login_failed", message, false)
    }

    pub fn from_transport(err: &TransportError) -> Self {
        let (type_, retryable) = match err {
            TransportError::UnknownEndpoint(_) => ("unknown_endpoint", false),
            TransportError::Network(_) => ("network_error", true),
            TransportError::Canceled => ("canceled", true),
            TransportError::Encode(_) => ("invalid_request", false),
            TransportError::Download(_) => ("download_failed", true),
            TransportError::NotFound { .. } => ("not_found", false),
            TransportError::RefreshFailed(_) | TransportError::RefreshTimedOut(_) => {
                ("session_expired", false)
            }
            TransportError::Classified { status: 401, .. } => ("unauthorized", false),
            TransportError::Classified { status, notification, .. } => {
                if notification.kind == NotificationKind::Validation {
                    ("validation_failed", false)
                } else {
                    ("request_failed", *status >= 500)
                }
            }
            TransportError::OwnErrorHandling(failed) => ("request_failed", failed.status >= 500),
            TransportError::JsonParse(_)
            | TransportError::ContentTypeUnsupported(_)
            | TransportError::ContentDispositionInvalid(_)
            | TransportError::InvalidTokenResponse(_) => ("invalid_response", false),
        };

        let notification = err.notification();
        Self {
            type_,
            message: notification
                .and_then(|n| n.message.clone())
                .unwrap_or_else(|| err.to_string()),
            status: err.status(),
            details: notification.map(|n| n.details.clone()).unwrap_or_default(),
            retryable: Some(retryable),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Exit codes for agent decision making
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Success = 0,
    TransientError = 1,
    PermanentError = 2,
    AuthRequired = 3,
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::TransientError => write!(f, "transient_error"),
            Self::PermanentError => write!(f, "permanent_error"),
            Self::AuthRequired => write!(f, "auth_required"),
        }
    }
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn for_transport(err: &TransportError) -> Self {
        match err {
            TransportError::Network(_) | TransportError::Canceled | TransportError::Download(_) => {
                Self::TransientError
            }
            TransportError::RefreshFailed(_)
            | TransportError::RefreshTimedOut(_)
            | TransportError::Classified { status: 401, .. } => Self::AuthRequired,
            _ if err.status().is_some_and(|s| s >= 500) => Self::TransientError,
            _ => Self::PermanentError,
        }
    }
}

/// Outcome of `admin call`
pub struct CallOutput {
    pub endpoint: String,
    pub envelope: ResponseEnvelope,
}

impl CallOutput {
    fn result(&self) -> Value {
        match &self.envelope {
            ResponseEnvelope::Json(value) => value.clone(),
            ResponseEnvelope::Download(receipt) => json!({ "download": receipt }),
        }
    }
}

impl Formattable for CallOutput {
    fn to_json(&self) -> String {
        let resp = Response::ok_with_meta(
            self.result(),
            Meta {
                endpoint: Some(self.endpoint.clone()),
            },
        );
        serde_json::to_string(&resp).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match &self.envelope {
            ResponseEnvelope::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseEnvelope::Download(receipt) => {
                format!("Saved {} ({} bytes)", receipt.filename, receipt.size)
            }
        }
    }
}

// Print response to stdout
pub fn print_response<T: Serialize>(resp: &Response<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(resp)?);
    Ok(())
}

/// Print a styled success message
pub fn print_success(message: &str) {
    let term = console::Term::stdout();
    let _ = term.write_str(&format!("{} {}\n", console::style("✓").green(), message));
}

/// Print a styled warning message
pub fn print_warning(message: &str) {
    let term = console::Term::stderr();
    let _ = term.write_str(&format!("{} {}\n", console::style("Warning:").yellow(), message));
}

/// Show a notification the way the admin UI's toast would, on stderr
pub fn print_notification(notification: &Notification) {
    let term = console::Term::stderr();
    let label = match notification.kind {
        NotificationKind::Validation => console::style("Invalid:").yellow(),
        NotificationKind::Error => console::style("Error:").red(),
    };
    let message = notification
        .message
        .as_deref()
        .unwrap_or("Something went wrong");
    let _ = term.write_str(&format!("{} {}\n", label, message));
    for detail in &notification.details {
        let _ = term.write_str(&format!("  - {}\n", detail));
    }
}
