// admin-client/src/config.rs
use anyhow::{anyhow, Result};
use api_transport::{EndpointConfig, EndpointRegistry, TransportSettings};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_NAME: &str = "admin-cli";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub downloads: DownloadConfig,
    /// Endpoint table keyed by endpoint id
    #[serde(default = "default_endpoints")]
    pub endpoints: BTreeMap<String, EndpointConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            downloads: DownloadConfig::default(),
            endpoints: default_endpoints(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            refresh_timeout_secs: default_refresh_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_user_agent() -> String {
    format!("admin-cli/{}", env!("CARGO_PKG_VERSION"))
}

fn default_refresh_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_login_endpoint")]
    pub login_endpoint: String,
    #[serde(default = "default_refresh_endpoint")]
    pub refresh_endpoint: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_not_found_path")]
    pub not_found_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_endpoint: default_login_endpoint(),
            refresh_endpoint: default_refresh_endpoint(),
            login_path: default_login_path(),
            not_found_path: default_not_found_path(),
        }
    }
}

fn default_login_endpoint() -> String {
    "auth.login".to_string()
}

fn default_refresh_endpoint() -> String {
    "auth.refresh".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_not_found_path() -> String {
    "/not-found".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DownloadConfig {
    /// Where downloads land; the platform download dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Token endpoints every installation needs
fn default_endpoints() -> BTreeMap<String, EndpointConfig> {
    let token = |private: bool| {
        let config = EndpointConfig::new("/oauth/token")
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded");
        if private {
            config.private()
        } else {
            config
        }
    };

    let mut endpoints = BTreeMap::new();
    endpoints.insert(default_login_endpoint(), token(false));
    endpoints.insert(default_refresh_endpoint(), token(true));
    endpoints
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let mut config = Self::load_from(&config_dir.join("config.toml"))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a config file, writing the defaults first when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default = Self::default();
            default.save_to(path)?;
            return Ok(default);
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir()?.join("config.toml"))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        set_owner_only_permissions(path)
    }

    pub fn config_dir() -> Result<PathBuf> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("Cannot determine config directory"))?;
        Ok(base_dirs.config_dir().join(CONFIG_DIR_NAME))
    }

    /// `ADMIN_API_BASE_URL` and `ADMIN_USER_AGENT` win over the file
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup("ADMIN_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Some(user_agent) = lookup("ADMIN_USER_AGENT") {
            self.api.user_agent = user_agent;
        }
    }

    pub fn registry(&self) -> Result<EndpointRegistry> {
        Ok(EndpointRegistry::from_configs(&self.endpoints)?)
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            refresh_endpoint: self.auth.refresh_endpoint.clone(),
            login_path: self.auth.login_path.clone(),
            not_found_path: self.auth.not_found_path.clone(),
            refresh_timeout: Duration::from_secs(self.api.refresh_timeout_secs),
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        self.downloads
            .dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub(crate) fn set_owner_only_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}
