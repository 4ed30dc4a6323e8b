// admin-client/src/session_store.rs
use crate::config::{set_owner_only_permissions, Config};
use anyhow::Result;
use api_transport::AuthSession;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Session kept on disk between CLI runs
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// `session.json` next to the config file
    pub fn open() -> Result<Self> {
        Ok(Self::at(Config::config_dir()?.join("session.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<AuthSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let session: AuthSession = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        set_owner_only_permissions(&self.path)?;

        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!(path = %self.path.display(), "session removed");
        }
        Ok(())
    }
}
