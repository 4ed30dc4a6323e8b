// api-transport/src/types.rs
use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::download::DownloadCapability;
use crate::error::TransportError;
use crate::params::Params;

/// Bearer credentials for private endpoints
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token_type: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "Utc::now")]
    pub obtained_at: DateTime<Utc>,
}

impl AuthSession {
    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Token endpoint response (login and refresh grants)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    pub fn from_envelope(envelope: ResponseEnvelope) -> Result<Self, TransportError> {
        match envelope {
            ResponseEnvelope::Json(value) => {
                serde_json::from_value(value).map_err(TransportError::JsonParse)
            }
            ResponseEnvelope::Download(receipt) => Err(TransportError::InvalidTokenResponse(
                format!("expected JSON, got file download {}", receipt.filename),
            )),
        }
    }

    /// Servers may omit the refresh token on refresh; the previous one stays valid then.
    pub fn into_session(self, previous_refresh_token: Option<String>) -> AuthSession {
        AuthSession {
            token_type: self.token_type,
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh_token),
            obtained_at: Utc::now(),
        }
    }
}

/// One logical call: endpoint id plus optional payload and params
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub endpoint_id: String,
    pub payload: Option<Payload>,
    pub params: Option<Params>,
}

impl CallRequest {
    pub fn new(endpoint_id: impl Into<String>, payload: Option<Payload>, params: Option<Params>) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            payload,
            params,
        }
    }
}

/// File content attached to a multipart payload
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Json(Value),
    File(FilePart),
}

/// Request payload: ordered keys, JSON values or file parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, PayloadValue)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, PayloadValue::Json(value.into()));
        self
    }

    pub fn with_file(mut self, key: impl Into<String>, file: FilePart) -> Self {
        self.insert(key, PayloadValue::File(file));
        self
    }

    /// Insert or replace; a replaced key keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: PayloadValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Later entries override same-named ones
    pub fn merge(&mut self, other: Payload) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(k, v)| (k, PayloadValue::Json(v)))
                .collect(),
        }
    }
}

impl TryFrom<Value> for Payload {
    type Error = TransportError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map.into()),
            Value::Null => Ok(Payload::new()),
            other => Err(TransportError::Encode(format!(
                "payload must be a JSON object, got {}",
                other
            ))),
        }
    }
}

/// Negotiated outcome of a successful exchange
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    Json(Value),
    Download(DownloadReceipt),
}

impl ResponseEnvelope {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseEnvelope::Json(value) => Some(value),
            ResponseEnvelope::Download(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ResponseEnvelope::Json(value) => Some(value),
            ResponseEnvelope::Download(_) => None,
        }
    }
}

/// Completed file download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadReceipt {
    pub filename: String,
    pub size: usize,
    pub delivery: DownloadCapability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Validation,
    Error,
}

/// User-facing message derived from a failed response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Raw failed response for callers that handle their own errors
#[derive(Debug, Clone)]
pub struct FailedResponse {
    pub status: u16,
    pub url: String,
    pub headers: HeaderMap,
    /// Parsed JSON body, when the body was JSON
    pub validation_data: Option<Value>,
}
