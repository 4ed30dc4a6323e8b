// api-transport/src/transport.rs
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture, FutureExt};
use serde_json::{Map, Value};
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use crate::auth::{SessionHandle, REFRESH_TOKEN_FIELD};
use crate::classify::report_failure;
use crate::descriptor::{EndpointDescriptor, EndpointRegistry};
use crate::download::{DownloadSink, RejectingSink};
use crate::error::TransportError;
use crate::http::status::StatusRoute;
use crate::http::{HttpClient, RawResponse};
use crate::negotiate::negotiate;
use crate::params::Params;
use crate::redirect::location_shows_resource;
use crate::refresh::{Admission, CallOutcome, PendingCall, RefreshCoordinator};
use crate::request::prepare_request;
use crate::store::{AppStore, NoopRouter, NoopStore, Router};
use crate::types::{AuthSession, CallRequest, FailedResponse, Payload, TokenResponse};

/// Transport behavior knobs
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Endpoint used for the refresh-token grant
    pub refresh_endpoint: String,
    /// Where a failed refresh or a logout sends the user
    pub login_path: String,
    /// Where a 404 on the page's own resource sends the user
    pub not_found_path: String,
    /// Upper bound on one refresh call; expiry counts as refresh failure
    pub refresh_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            refresh_endpoint: "auth.refresh".to_string(),
            login_path: "/login".to_string(),
            not_found_path: "/not-found".to_string(),
            refresh_timeout: Duration::from_secs(30),
        }
    }
}

struct Inner<C: HttpClient> {
    http: C,
    registry: EndpointRegistry,
    session: SessionHandle,
    store: Arc<dyn AppStore>,
    router: Arc<dyn Router>,
    downloads: Arc<dyn DownloadSink>,
    coordinator: RefreshCoordinator,
    settings: TransportSettings,
}

/// Turns endpoint calls into HTTP exchanges.
///
/// Cheap to clone; clones share the session and the refresh coordinator.
pub struct Transport<C: HttpClient> {
    inner: Arc<Inner<C>>,
}

impl<C: HttpClient> Clone for Transport<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub struct TransportBuilder<C: HttpClient> {
    http: C,
    registry: EndpointRegistry,
    session: SessionHandle,
    store: Arc<dyn AppStore>,
    router: Arc<dyn Router>,
    downloads: Arc<dyn DownloadSink>,
    settings: TransportSettings,
}

impl<C: HttpClient> TransportBuilder<C> {
    pub fn session(mut self, session: SessionHandle) -> Self {
        self.session = session;
        self
    }

    pub fn store(mut self, store: Arc<dyn AppStore>) -> Self {
        self.store = store;
        self
    }

    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = router;
        self
    }

    pub fn downloads(mut self, downloads: Arc<dyn DownloadSink>) -> Self {
        self.downloads = downloads;
        self
    }

    pub fn settings(mut self, settings: TransportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Transport<C> {
        Transport {
            inner: Arc::new(Inner {
                http: self.http,
                registry: self.registry,
                session: self.session,
                store: self.store,
                router: self.router,
                downloads: self.downloads,
                coordinator: RefreshCoordinator::new(),
                settings: self.settings,
            }),
        }
    }
}

impl<C: HttpClient + 'static> Transport<C> {
    pub fn builder(http: C, registry: EndpointRegistry) -> TransportBuilder<C> {
        TransportBuilder {
            http,
            registry,
            session: SessionHandle::new(),
            store: Arc::new(NoopStore),
            router: Arc::new(NoopRouter),
            downloads: Arc::new(RejectingSink),
            settings: TransportSettings::default(),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.inner.registry
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.inner.settings
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.coordinator.is_refreshing()
    }

    /// Calls parked behind the in-flight refresh
    pub fn pending_calls(&self) -> usize {
        self.inner.coordinator.pending()
    }

    /// Call an endpoint by id.
    ///
    /// 401s are recovered transparently while a refresh token is available;
    /// the caller only sees the outcome of the replayed call.
    #[instrument(skip(self, payload, params))]
    pub async fn call_api(
        &self,
        endpoint_id: &str,
        payload: Option<Payload>,
        params: Option<Params>,
    ) -> CallOutcome {
        self.execute(CallRequest::new(endpoint_id, payload, params), true)
            .await
    }

    /// Run a login grant and install the returned session
    pub async fn authenticate(
        &self,
        endpoint_id: &str,
        credentials: Payload,
    ) -> Result<AuthSession, TransportError> {
        let envelope = self.call_api(endpoint_id, Some(credentials), None).await?;
        let session = TokenResponse::from_envelope(envelope)?.into_session(None);
        self.inner.session.install(session.clone());
        info!(token_type = %session.token_type, "session established");
        Ok(session)
    }

    /// Drop the session and go to the login surface
    pub fn logout(&self) {
        self.inner.session.clear();
        info!("session cleared by logout");
        self.inner.router.push(&self.inner.settings.login_path);
    }

    // Boxed: the refresh cycle replays calls through this same path.
    fn execute(&self, call: CallRequest, allow_refresh: bool) -> BoxFuture<'_, CallOutcome> {
        async move {
            let descriptor = self.inner.registry.resolve(&call.endpoint_id)?;
            let session = self.inner.session.current();
            let request = prepare_request(descriptor, &call, session.as_ref())?;
            let url = request.url.clone();

            debug!(
                endpoint = %call.endpoint_id,
                method = %request.method,
                %url,
                "dispatching request"
            );

            let response = self.inner.http.send(request).await.map_err(|err| {
                warn!(endpoint = %call.endpoint_id, %url, error = %err, "network failure");
                TransportError::Network(err)
            })?;

            debug!(endpoint = %call.endpoint_id, status = response.status, "response settled");

            match StatusRoute::from_status(response.status) {
                StatusRoute::Success => {
                    self.inner.store.clear_error_messages(false);
                    negotiate(response, self.inner.downloads.as_ref()).await
                }
                StatusRoute::Unauthorized if allow_refresh => {
                    self.handle_unauthorized(call, descriptor, &url, response)
                        .await
                }
                StatusRoute::NotFound => Err(self.handle_not_found(descriptor, &url, response)),
                StatusRoute::Unauthorized | StatusRoute::Failure => {
                    Err(self.handle_failure(descriptor, &url, response))
                }
            }
        }
        .boxed()
    }

    async fn handle_unauthorized(
        &self,
        call: CallRequest,
        descriptor: &EndpointDescriptor,
        url: &str,
        response: RawResponse,
    ) -> CallOutcome {
        let Some(refresh_token) = self.inner.session.refresh_token() else {
            debug!(%url, "unauthorized without a refresh token");
            return Err(self.handle_failure(descriptor, url, response));
        };

        let (reply, outcome) = oneshot::channel();
        match self.inner.coordinator.enqueue(PendingCall {
            request: call,
            reply,
        }) {
            Admission::Leader => {
                // Detached so the cycle completes even if this caller is dropped.
                let transport = self.clone();
                tokio::spawn(async move { transport.run_refresh_cycle(refresh_token).await });
            }
            Admission::Queued => {
                debug!(%url, pending = self.pending_calls(), "queued behind in-flight refresh")
            }
        }

        outcome.await.unwrap_or(Err(TransportError::Canceled))
    }

    async fn run_refresh_cycle(&self, refresh_token: String) {
        info!("access token rejected, refreshing session");

        let settings = &self.inner.settings;
        let grant = Payload::new()
            .with("grant_type", "refresh_token")
            .with(REFRESH_TOKEN_FIELD, refresh_token.clone());
        let refresh = self.execute(
            CallRequest::new(settings.refresh_endpoint.clone(), Some(grant), None),
            false,
        );

        let outcome = match tokio::time::timeout(settings.refresh_timeout, refresh).await {
            Ok(Ok(envelope)) => TokenResponse::from_envelope(envelope)
                .map(|token| token.into_session(Some(refresh_token))),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(TransportError::RefreshTimedOut(settings.refresh_timeout)),
        };

        match outcome {
            Ok(session) => {
                self.inner.session.install(session);
                let queue = self.inner.coordinator.finish();
                info!(queued = queue.len(), "session refreshed, replaying queued calls");

                // Each caller hears back as soon as its own replay settles.
                let replays = queue.into_iter().map(|pending| async move {
                    let PendingCall { request, reply } = pending;
                    let outcome = self.execute(request, false).await;
                    // the caller may have gone away
                    let _ = reply.send(outcome);
                });
                join_all(replays).await;
            }
            Err(err) => {
                warn!(error = %err, "session refresh failed, signing out");
                self.inner.session.clear();
                let queue = self.inner.coordinator.finish();
                let failure = Arc::new(err);
                for pending in queue {
                    let _ = pending
                        .reply
                        .send(Err(TransportError::RefreshFailed(Arc::clone(&failure))));
                }
                self.inner.router.push(&settings.login_path);
            }
        }
    }

    fn handle_not_found(
        &self,
        descriptor: &EndpointDescriptor,
        url: &str,
        response: RawResponse,
    ) -> TransportError {
        let location = self.inner.router.current_location();
        if location_shows_resource(url, &location) {
            info!(%url, %location, "resource on the current page is gone");
            self.inner.router.push(&self.inner.settings.not_found_path);
            return TransportError::NotFound {
                url: url.to_string(),
            };
        }
        self.handle_failure(descriptor, url, response)
    }

    fn handle_failure(
        &self,
        descriptor: &EndpointDescriptor,
        url: &str,
        response: RawResponse,
    ) -> TransportError {
        let body: Option<Value> = serde_json::from_slice(&response.body).ok();

        if descriptor.own_error_handling {
            debug!(status = response.status, %url, "failure left to the caller");
            return TransportError::OwnErrorHandling(FailedResponse {
                status: response.status,
                url: url.to_string(),
                headers: response.headers,
                validation_data: body,
            });
        }

        report_failure(
            self.inner.store.as_ref(),
            response.status,
            url,
            body.unwrap_or_else(|| Value::Object(Map::new())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EndpointConfig;
    use crate::http::{HttpError, RequestBody};
    use crate::testing::{
        json_response, raw_response, MemorySink, MockHttpClient, MockReply, RecordingRouter,
        RecordingStore,
    };
    use crate::types::{NotificationKind, ResponseEnvelope};
    use chrono::Utc;
    use http::header::AUTHORIZATION;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tokio::sync::Notify;

    const TOKEN_URL: &str = "/oauth/token";
    const FORM: &str = "application/x-www-form-urlencoded";

    fn registry() -> EndpointRegistry {
        let mut configs = BTreeMap::new();
        configs.insert(
            "auth.login".to_string(),
            EndpointConfig::new(TOKEN_URL).method("POST").header("content-type", FORM),
        );
        configs.insert(
            "auth.refresh".to_string(),
            EndpointConfig::new(TOKEN_URL)
                .method("POST")
                .header("content-type", FORM)
                .private(),
        );
        configs.insert(
            "users.get".to_string(),
            EndpointConfig::new("/api/users/{0}").private(),
        );
        configs.insert(
            "users.update".to_string(),
            EndpointConfig::new("/api/users/{0}")
                .method("PUT")
                .private()
                .own_error_handling(),
        );
        configs.insert("ping".to_string(), EndpointConfig::new("/api/ping"));
        EndpointRegistry::from_configs(&configs).unwrap()
    }

    fn session(access_token: &str, refresh_token: Option<&str>) -> AuthSession {
        AuthSession {
            token_type: "Bearer".to_string(),
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            obtained_at: Utc::now(),
        }
    }

    struct Fixture {
        http: Arc<MockHttpClient>,
        store: Arc<RecordingStore>,
        router: Arc<RecordingRouter>,
        transport: Transport<Arc<MockHttpClient>>,
    }

    fn fixture_at(http: Arc<MockHttpClient>, session: Option<AuthSession>, location: &str) -> Fixture {
        let store = Arc::new(RecordingStore::default());
        let router = Arc::new(RecordingRouter::at(location));
        let transport = Transport::builder(Arc::clone(&http), registry())
            .session(session.map(SessionHandle::with_session).unwrap_or_default())
            .store(store.clone())
            .router(router.clone())
            .downloads(Arc::new(MemorySink::blob()))
            .settings(TransportSettings {
                refresh_timeout: Duration::from_millis(200),
                ..TransportSettings::default()
            })
            .build();
        Fixture {
            http,
            store,
            router,
            transport,
        }
    }

    fn fixture(http: Arc<MockHttpClient>, session: Option<AuthSession>) -> Fixture {
        fixture_at(http, session, "/users")
    }

    /// Accepts only the "fresh" token; the token endpoint answers `refresh_status`
    fn refreshing_server(gate: Option<Arc<Notify>>, refresh_status: u16) -> Arc<MockHttpClient> {
        MockHttpClient::new(move |req| {
            if req.url == TOKEN_URL {
                let resp = if refresh_status == 200 {
                    json_response(
                        200,
                        json!({"token_type": "Bearer", "access_token": "fresh", "refresh_token": "refresh-2"}),
                    )
                } else {
                    json_response(refresh_status, json!({"description": "Refresh token expired"}))
                };
                return match &gate {
                    Some(gate) => MockReply::Gated(Arc::clone(gate), resp),
                    None => MockReply::Ready(resp),
                };
            }
            if req.header(AUTHORIZATION) == Some("Bearer fresh") {
                MockReply::Ready(json_response(200, json!({"url": req.url})))
            } else {
                MockReply::Ready(json_response(401, json!({"description": "Token expired"})))
            }
        })
    }

    async fn release_when_queued(
        transport: &Transport<Arc<MockHttpClient>>,
        gate: &Notify,
        expected: usize,
    ) {
        while transport.pending_calls() < expected {
            tokio::task::yield_now().await;
        }
        gate.notify_one();
    }

    #[tokio::test]
    async fn test_concurrent_unauthorized_calls_share_one_refresh() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            refreshing_server(Some(Arc::clone(&gate)), 200),
            Some(session("stale", Some("refresh-1"))),
        );

        let calls = join_all(
            (0..4).map(|i| f.transport.call_api("users.get", None, Some(Params::positional([i])))),
        );
        let (results, _) = tokio::join!(calls, release_when_queued(&f.transport, &gate, 4));

        assert_eq!(f.http.count(TOKEN_URL), 1);
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(
                result.unwrap(),
                ResponseEnvelope::Json(json!({"url": format!("/api/users/{}", i)}))
            );
        }
        let installed = f.transport.session().current().unwrap();
        assert_eq!(installed.access_token, "fresh");
        assert_eq!(installed.refresh_token.as_deref(), Some("refresh-2"));
        assert!(!f.transport.is_refreshing());
        assert!(f.store.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_queued_calls_replay_in_arrival_order() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            refreshing_server(Some(Arc::clone(&gate)), 200),
            Some(session("stale", Some("refresh-1"))),
        );

        let calls = join_all(
            ["a", "b", "c"]
                .map(|id| f.transport.call_api("users.get", None, Some(Params::positional([id])))),
        );
        let (results, _) = tokio::join!(calls, release_when_queued(&f.transport, &gate, 3));
        assert!(results.iter().all(Result::is_ok));

        let replays: Vec<String> = f
            .http
            .requests()
            .into_iter()
            .filter(|r| r.header(AUTHORIZATION) == Some("Bearer fresh"))
            .map(|r| r.url)
            .collect();
        assert_eq!(replays, vec!["/api/users/a", "/api/users/b", "/api/users/c"]);
    }

    #[tokio::test]
    async fn test_refresh_call_uses_session_refresh_token() {
        let f = fixture(
            refreshing_server(None, 200),
            Some(session("stale", Some("refresh-1"))),
        );
        f.transport
            .call_api("users.get", None, Some(Params::positional([1])))
            .await
            .unwrap();

        let refresh = f
            .http
            .requests()
            .into_iter()
            .find(|r| r.url == TOKEN_URL)
            .unwrap();
        assert_eq!(
            refresh.body,
            RequestBody::Text("grant_type=refresh_token&refresh_token=refresh-1".to_string())
        );
        assert_eq!(refresh.header(AUTHORIZATION), Some("Bearer stale"));
    }

    #[tokio::test]
    async fn test_refresh_failure_rejects_every_queued_call() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            refreshing_server(Some(Arc::clone(&gate)), 400),
            Some(session("stale", Some("refresh-1"))),
        );

        let calls = join_all(
            (0..3).map(|i| f.transport.call_api("users.get", None, Some(Params::positional([i])))),
        );
        let (results, _) = tokio::join!(calls, release_when_queued(&f.transport, &gate, 3));

        for result in results {
            let err = result.unwrap_err();
            assert!(matches!(err, TransportError::RefreshFailed(_)));
            assert_eq!(err.status(), Some(400));
        }
        assert_eq!(f.http.count(TOKEN_URL), 1);
        assert!(f.transport.session().current().is_none());
        assert_eq!(f.router.pushes(), vec!["/login".to_string()]);
        assert!(!f.transport.is_refreshing());
    }

    #[tokio::test]
    async fn test_hung_refresh_times_out() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            refreshing_server(Some(gate), 200),
            Some(session("stale", Some("refresh-1"))),
        );

        let err = f
            .transport
            .call_api("users.get", None, Some(Params::positional([1])))
            .await
            .unwrap_err();

        let TransportError::RefreshFailed(inner) = err else {
            panic!("Expected refresh failure");
        };
        assert!(matches!(*inner, TransportError::RefreshTimedOut(_)));
        assert!(f.transport.session().current().is_none());
        assert_eq!(f.router.pushes(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_abandoned_leader_does_not_wedge_refresh() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            refreshing_server(Some(Arc::clone(&gate)), 200),
            Some(session("stale", Some("refresh-1"))),
        );

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            f.transport.call_api("users.get", None, Some(Params::positional([1]))),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(f.transport.is_refreshing());

        let next = f.transport.call_api("users.get", None, Some(Params::positional([2])));
        let (result, _) = tokio::time::timeout(
            Duration::from_secs(2),
            async { tokio::join!(next, release_when_queued(&f.transport, &gate, 2)) },
        )
        .await
        .expect("refresh cycle stalled");

        assert_eq!(
            result.unwrap(),
            ResponseEnvelope::Json(json!({"url": "/api/users/2"}))
        );
        assert_eq!(f.http.count(TOKEN_URL), 1);
        assert!(!f.transport.is_refreshing());
    }

    #[tokio::test]
    async fn test_slow_replay_does_not_hold_back_other_callers() {
        let refresh_gate = Arc::new(Notify::new());
        let slow_gate = Arc::new(Notify::new());
        let http = {
            let refresh_gate = Arc::clone(&refresh_gate);
            let slow_gate = Arc::clone(&slow_gate);
            MockHttpClient::new(move |req| {
                if req.url == TOKEN_URL {
                    return MockReply::Gated(
                        Arc::clone(&refresh_gate),
                        json_response(200, json!({"access_token": "fresh", "refresh_token": "refresh-2"})),
                    );
                }
                if req.header(AUTHORIZATION) != Some("Bearer fresh") {
                    return MockReply::Ready(json_response(401, json!({})));
                }
                let resp = json_response(200, json!({"url": req.url}));
                if req.url == "/api/users/slow" {
                    MockReply::Gated(Arc::clone(&slow_gate), resp)
                } else {
                    MockReply::Ready(resp)
                }
            })
        };
        let f = fixture(http, Some(session("stale", Some("refresh-1"))));

        let fast = f.transport.call_api("users.get", None, Some(Params::positional(["fast"])));
        let slow = tokio::spawn({
            let transport = f.transport.clone();
            async move {
                transport
                    .call_api("users.get", None, Some(Params::positional(["slow"])))
                    .await
            }
        });
        let (fast, _) = tokio::time::timeout(
            Duration::from_secs(2),
            async { tokio::join!(fast, release_when_queued(&f.transport, &refresh_gate, 2)) },
        )
        .await
        .expect("fast caller waited on the slow replay");

        assert_eq!(
            fast.unwrap(),
            ResponseEnvelope::Json(json!({"url": "/api/users/fast"}))
        );
        assert!(!slow.is_finished());

        slow_gate.notify_one();
        assert_eq!(
            slow.await.unwrap().unwrap(),
            ResponseEnvelope::Json(json!({"url": "/api/users/slow"}))
        );
    }

    #[tokio::test]
    async fn test_unauthorized_without_refresh_token_is_classified() {
        let f = fixture(refreshing_server(None, 200), Some(session("stale", None)));
        let err = f
            .transport
            .call_api("users.get", None, Some(Params::positional([1])))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Classified { status: 401, .. }));
        assert_eq!(f.http.count(TOKEN_URL), 0);
        assert_eq!(f.store.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_without_session_is_classified() {
        let f = fixture(refreshing_server(None, 200), None);
        let err = f
            .transport
            .call_api("users.get", None, Some(Params::positional([1])))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Classified { status: 401, .. }));
        assert!(f.http.requests()[0].header(AUTHORIZATION).is_none());
        assert_eq!(f.http.count(TOKEN_URL), 0);
    }

    #[tokio::test]
    async fn test_replay_rejected_again_does_not_loop() {
        let http = MockHttpClient::new(|req| {
            if req.url == TOKEN_URL {
                MockReply::Ready(json_response(
                    200,
                    json!({"access_token": "fresh", "refresh_token": "refresh-2"}),
                ))
            } else {
                MockReply::Ready(json_response(401, json!({})))
            }
        });
        let f = fixture(http, Some(session("stale", Some("refresh-1"))));

        let err = f
            .transport
            .call_api("users.get", None, Some(Params::positional([1])))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Classified { status: 401, .. }));
        assert_eq!(f.http.count(TOKEN_URL), 1);
        assert_eq!(f.http.count("/api/users/1"), 2);
    }

    #[tokio::test]
    async fn test_own_error_handling_returns_raw_failure() {
        let http = MockHttpClient::new(|_| {
            MockReply::Ready(json_response(
                422,
                json!({"description": "Bad input", "invalid": {"name": {"description": "Name required"}}}),
            ))
        });
        let f = fixture(http, Some(session("tok", Some("refresh-1"))));

        let err = f
            .transport
            .call_api(
                "users.update",
                Some(Payload::new().with("name", "")),
                Some(Params::positional([7])),
            )
            .await
            .unwrap_err();

        let TransportError::OwnErrorHandling(failed) = err else {
            panic!("Expected raw failure");
        };
        assert_eq!(failed.status, 422);
        assert_eq!(failed.url, "/api/users/7");
        assert_eq!(failed.validation_data.unwrap()["description"], "Bad input");
        assert!(f.store.notifications().is_empty());
        assert!(f.store.errors().is_empty());
    }

    #[tokio::test]
    async fn test_generic_failure_is_classified() {
        let http = MockHttpClient::new(|_| {
            MockReply::Ready(raw_response(500, Some("text/plain"), b"upstream down"))
        });
        let f = fixture(http, None);

        let err = f.transport.call_api("ping", None, None).await.unwrap_err();

        assert!(matches!(err, TransportError::Classified { status: 500, .. }));
        let notifications = f.store.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert_eq!(f.store.errors(), vec![json!({})]);
    }

    #[tokio::test]
    async fn test_not_found_on_current_page_redirects() {
        let http = MockHttpClient::new(|_| MockReply::Ready(json_response(404, json!({}))));
        let f = fixture_at(http, Some(session("tok", None)), "/users/42");

        let err = f
            .transport
            .call_api("users.get", None, Some(Params::positional([42])))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::NotFound { .. }));
        assert_eq!(f.router.pushes(), vec!["/not-found".to_string()]);
        assert!(f.store.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_elsewhere_is_classified() {
        let http = MockHttpClient::new(|_| MockReply::Ready(json_response(404, json!({}))));
        let f = fixture(http, Some(session("tok", None)));

        let err = f
            .transport
            .call_api("users.get", None, Some(Params::positional([7])))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Classified { status: 404, .. }));
        assert!(f.router.pushes().is_empty());
    }

    #[tokio::test]
    async fn test_success_clears_server_errors() {
        let http = MockHttpClient::new(|_| MockReply::Ready(json_response(200, json!({"ok": true}))));
        let f = fixture(http, None);

        let envelope = f.transport.call_api("ping", None, None).await.unwrap();

        assert_eq!(envelope.as_json(), Some(&json!({"ok": true})));
        assert_eq!(f.store.clears(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let http = MockHttpClient::new(|_| MockReply::Fail(HttpError::new("connection refused")));
        let f = fixture(http, None);

        let err = f.transport.call_api("ping", None, None).await.unwrap_err();

        assert!(matches!(err, TransportError::Network(e) if e.message == "connection refused"));
        assert!(f.store.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_endpoint_sends_nothing() {
        let http = MockHttpClient::new(|_| MockReply::Ready(json_response(200, json!({}))));
        let f = fixture(http, None);

        let err = f.transport.call_api("reports.missing", None, None).await.unwrap_err();

        assert!(matches!(err, TransportError::UnknownEndpoint(_)));
        assert!(f.http.urls().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_then_logout() {
        let http = MockHttpClient::new(|_| {
            MockReply::Ready(json_response(
                200,
                json!({"token_type": "Bearer", "access_token": "a1", "refresh_token": "r1"}),
            ))
        });
        let f = fixture(http, None);

        let session = f
            .transport
            .authenticate(
                "auth.login",
                Payload::new()
                    .with("grant_type", "password")
                    .with("username", "admin")
                    .with("password", "secret"),
            )
            .await
            .unwrap();

        assert_eq!(session.access_token, "a1");
        assert!(f.transport.session().is_authenticated());

        f.transport.logout();
        assert!(!f.transport.session().is_authenticated());
        assert_eq!(f.router.pushes(), vec!["/login".to_string()]);
    }
}
