// api-transport/src/auth.rs
use std::sync::Arc;

use http::header::{HeaderValue, AUTHORIZATION};
use http::HeaderMap;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::TransportError;
use crate::types::{AuthSession, Payload, PayloadValue};

/// Payload field carrying the refresh token on refresh grants
pub const REFRESH_TOKEN_FIELD: &str = "refresh_token";

/// Shared handle to the current session (or its absence)
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: AuthSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(session))),
        }
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.inner.read().clone()
    }

    pub fn install(&self, session: AuthSession) {
        *self.inner.write() = Some(session);
    }

    /// Drop the session, returning what was there
    pub fn clear(&self) -> Option<AuthSession> {
        self.inner.write().take()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner
            .read()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
    }
}

/// Attach credentials to a private call.
///
/// A `refresh_token` already in the payload is replaced by the session's own,
/// so a stale token supplied by the caller never reaches the server.
pub fn inject_auth(
    session: Option<&AuthSession>,
    headers: &mut HeaderMap,
    payload: Option<&mut Payload>,
) -> Result<(), TransportError> {
    let Some(session) = session else {
        return Ok(());
    };

    let authorization = HeaderValue::from_str(&session.authorization())
        .map_err(|_| TransportError::Encode("session token is not a valid header value".to_string()))?;
    headers.insert(AUTHORIZATION, authorization);

    if let (Some(payload), Some(refresh_token)) = (payload, session.refresh_token.as_ref()) {
        if payload.contains_key(REFRESH_TOKEN_FIELD) {
            payload.insert(
                REFRESH_TOKEN_FIELD,
                PayloadValue::Json(Value::String(refresh_token.clone())),
            );
        }
    }

    Ok(())
}
