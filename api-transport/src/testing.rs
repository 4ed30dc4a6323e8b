// api-transport/src/testing.rs
use std::sync::Arc;

use async_trait::async_trait;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use crate::download::{DownloadCapability, DownloadFile, DownloadSink};
use crate::http::{HttpClient, HttpError, PreparedRequest, RawResponse};
use crate::store::{AppStore, Router};
use crate::types::Notification;

pub fn raw_response(status: u16, content_type: Option<&str>, body: &[u8]) -> RawResponse {
    let mut headers = HeaderMap::new();
    if let Some(content_type) = content_type {
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
    }
    RawResponse {
        status,
        headers,
        body: body.to_vec(),
    }
}

pub fn json_response(status: u16, value: Value) -> RawResponse {
    raw_response(status, Some("application/json"), value.to_string().as_bytes())
}

pub enum MockReply {
    Ready(RawResponse),
    /// Held back until the notify fires
    Gated(Arc<Notify>, RawResponse),
    Fail(HttpError),
}

type Handler = Box<dyn Fn(&PreparedRequest) -> MockReply + Send + Sync>;

/// Scripted HTTP client recording every request in send order
pub struct MockHttpClient {
    handler: Handler,
    log: Mutex<Vec<PreparedRequest>>,
}

impl MockHttpClient {
    pub fn new(handler: impl Fn(&PreparedRequest) -> MockReply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.log.lock().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.log.lock().iter().map(|r| r.url.clone()).collect()
    }

    pub fn count(&self, url: &str) -> usize {
        self.log.lock().iter().filter(|r| r.url == url).count()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, HttpError> {
        let reply = (self.handler)(&request);
        self.log.lock().push(request);
        match reply {
            MockReply::Ready(response) => Ok(response),
            MockReply::Gated(gate, response) => {
                gate.notified().await;
                Ok(response)
            }
            MockReply::Fail(err) => Err(err),
        }
    }
}

#[derive(Default)]
pub struct RecordingStore {
    notifications: Mutex<Vec<Notification>>,
    errors: Mutex<Vec<Value>>,
    clears: Mutex<usize>,
}

impl RecordingStore {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn errors(&self) -> Vec<Value> {
        self.errors.lock().clone()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock()
    }
}

impl AppStore for RecordingStore {
    fn set_notification(&self, notification: &Notification) {
        self.notifications.lock().push(notification.clone());
    }

    fn set_errors(&self, body: &Value) {
        self.errors.lock().push(body.clone());
    }

    fn clear_error_messages(&self, _preserve_server_errors: bool) {
        *self.clears.lock() += 1;
    }
}

pub struct RecordingRouter {
    location: Mutex<String>,
    pushes: Mutex<Vec<String>>,
}

impl RecordingRouter {
    pub fn at(location: &str) -> Self {
        Self {
            location: Mutex::new(location.to_string()),
            pushes: Mutex::new(Vec::new()),
        }
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().clone()
    }
}

impl Router for RecordingRouter {
    fn current_location(&self) -> String {
        self.location.lock().clone()
    }

    fn push(&self, path: &str) {
        *self.location.lock() = path.to_string();
        self.pushes.lock().push(path.to_string());
    }
}

pub struct MemorySink {
    capability: DownloadCapability,
    saved: Mutex<Vec<DownloadFile>>,
    opened: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn blob() -> Self {
        Self::with_capability(DownloadCapability::Blob)
    }

    pub fn data_url() -> Self {
        Self::with_capability(DownloadCapability::DataUrl)
    }

    fn with_capability(capability: DownloadCapability) -> Self {
        Self {
            capability,
            saved: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn saved(&self) -> Vec<DownloadFile> {
        self.saved.lock().clone()
    }

    pub fn opened(&self) -> Vec<(String, String)> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    fn capability(&self) -> DownloadCapability {
        self.capability
    }

    async fn save_blob(&self, file: DownloadFile) -> std::io::Result<()> {
        self.saved.lock().push(file);
        Ok(())
    }

    async fn open_data_url(&self, filename: &str, data_url: String) -> std::io::Result<()> {
        self.opened.lock().push((filename.to_string(), data_url));
        Ok(())
    }
}
