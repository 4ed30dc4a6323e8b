// api-transport/src/descriptor.rs
use std::collections::{BTreeMap, HashMap};

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use crate::error::{DescriptorError, TransportError};

/// Endpoint entry as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    #[serde(default)]
    pub settings: EndpointSettings,
    #[serde(default, rename = "private")]
    pub is_private: bool,
    #[serde(default, rename = "ownErrorHandling")]
    pub own_error_handling: bool,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            settings: EndpointSettings::default(),
            is_private: false,
            own_error_handling: false,
        }
    }

    pub fn method(mut self, method: &str) -> Self {
        self.settings.method = method.to_string();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.settings.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    pub fn own_error_handling(mut self) -> Self {
        self.own_error_handling = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSettings {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            method: default_method(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

/// How a payload goes on the wire, fixed by the declared content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    FormUrlEncoded,
    Multipart,
}

impl BodyEncoding {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type.map(str::to_ascii_lowercase) {
            Some(ct) if ct.contains("application/x-www-form-urlencoded") => {
                BodyEncoding::FormUrlEncoded
            }
            Some(ct) if ct.contains("multipart/form-data") => BodyEncoding::Multipart,
            _ => BodyEncoding::Json,
        }
    }
}

/// Immutable request recipe for one symbolic endpoint
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    pub url_template: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body_defaults: Option<Map<String, Value>>,
    pub is_private: bool,
    pub own_error_handling: bool,
    pub body_encoding: BodyEncoding,
}

impl EndpointDescriptor {
    pub fn from_config(id: &str, config: &EndpointConfig) -> Result<Self, DescriptorError> {
        let method = Method::from_bytes(config.settings.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| DescriptorError::InvalidMethod {
                endpoint: id.to_string(),
                method: config.settings.method.clone(),
            })?;

        let mut headers = HeaderMap::with_capacity(config.settings.headers.len());
        for (name, value) in &config.settings.headers {
            let invalid = || DescriptorError::InvalidHeader {
                endpoint: id.to_string(),
                name: name.clone(),
            };
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.insert(name, value);
        }

        let body_defaults = match &config.settings.body {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => {
                return Err(DescriptorError::InvalidBody {
                    endpoint: id.to_string(),
                })
            }
        };

        let body_encoding = BodyEncoding::from_content_type(
            headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        );

        Ok(Self {
            url_template: config.url.clone(),
            method,
            headers,
            body_defaults,
            is_private: config.is_private,
            own_error_handling: config.own_error_handling,
            body_encoding,
        })
    }
}

/// Endpoint id to descriptor, read-only once built
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<String, EndpointDescriptor>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs<'a, I>(configs: I) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = (&'a String, &'a EndpointConfig)>,
    {
        let mut registry = Self::new();
        for (id, config) in configs {
            registry.insert(id.clone(), EndpointDescriptor::from_config(id, config)?);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, id: impl Into<String>, descriptor: EndpointDescriptor) {
        self.endpoints.insert(id.into(), descriptor);
    }

    pub fn resolve(&self, id: &str) -> Result<&EndpointDescriptor, TransportError> {
        self.endpoints.get(id).ok_or_else(|| {
            error!(endpoint = id, "no descriptor registered for endpoint");
            TransportError::UnknownEndpoint(id.to_string())
        })
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.endpoints.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
