// admin-client/src/client.rs
use crate::config::Config;
use crate::downloads::FileDownloadSink;
use crate::session_store::SessionStore;
use crate::state::ConsoleState;
use anyhow::{anyhow, Result};
use api_transport::{
    AuthSession, Params, Payload, ReqwestClient, ResponseEnvelope, SessionHandle, Transport,
    TransportError,
};
use std::sync::Arc;
use tracing::warn;

/// Admin API client for one CLI run.
///
/// Wires the transport to the on-disk session and the console state, and
/// writes the session back whenever a call may have changed it.
pub struct AdminClient {
    transport: Transport<ReqwestClient>,
    state: Arc<ConsoleState>,
    sessions: SessionStore,
    login_endpoint: String,
}

impl AdminClient {
    pub fn new(config: &Config, sessions: SessionStore, location: &str) -> Result<Self> {
        let http = ReqwestClient::with_user_agent(&config.api.user_agent)?
            .with_base_url(&config.api.base_url)?;

        let session = match sessions.load()? {
            Some(session) => SessionHandle::with_session(session),
            None => SessionHandle::new(),
        };

        let state = Arc::new(ConsoleState::at(location));
        let downloads = FileDownloadSink::new(config.download_dir());

        let transport = Transport::builder(http, config.registry()?)
            .session(session)
            .store(state.clone())
            .router(state.clone())
            .downloads(Arc::new(downloads))
            .settings(config.transport_settings())
            .build();

        Ok(Self {
            transport,
            state,
            sessions,
            login_endpoint: config.auth.login_endpoint.clone(),
        })
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn transport(&self) -> &Transport<ReqwestClient> {
        &self.transport
    }

    pub fn is_logged_in(&self) -> bool {
        self.transport.session().is_authenticated()
    }

    pub fn endpoint_ids(&self) -> Vec<&str> {
        self.transport.registry().ids()
    }

    pub async fn call(
        &self,
        endpoint_id: &str,
        payload: Option<Payload>,
        params: Option<Params>,
    ) -> Result<ResponseEnvelope, TransportError> {
        let outcome = self.transport.call_api(endpoint_id, payload, params).await;
        // a refresh may have rotated or dropped the session
        if let Err(err) = self.persist_session() {
            warn!(error = %err, "could not persist session");
        }
        outcome
    }

    /// Password grant against the configured login endpoint
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        let credentials = Payload::new()
            .with("grant_type", "password")
            .with("username", username)
            .with("password", password);

        let session = self
            .transport
            .authenticate(&self.login_endpoint, credentials)
            .await
            .map_err(|e| anyhow!("Login failed: {}", e))?;
        self.sessions.save(&session)?;
        Ok(session)
    }

    pub fn logout(&self) -> Result<()> {
        self.transport.logout();
        self.sessions.clear()
    }

    fn persist_session(&self) -> Result<()> {
        match self.transport.session().current() {
            Some(session) => self.sessions.save(&session),
            None => self.sessions.clear(),
        }
    }
}
