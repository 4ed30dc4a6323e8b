// api-transport/src/http/reqwest.rs
use super::{FormValue, HttpClient, HttpError, PreparedRequest, RawResponse, RequestBody};
use async_trait::async_trait;
use url::Url;

#[cfg(feature = "reqwest")]
pub struct ReqwestClient {
    inner: reqwest::Client,
    base_url: Option<Url>,
}

#[cfg(feature = "reqwest")]
impl ReqwestClient {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(inner: reqwest::Client) -> Self {
        Self {
            inner,
            base_url: None,
        }
    }

    /// Build a client that announces the given user agent
    pub fn with_user_agent(user_agent: &str) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::new(e.to_string()))?;
        Ok(Self::with_client(inner))
    }

    /// Relative endpoint URLs are joined onto this base
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base_url)
            .map_err(|e| HttpError::new(format!("invalid base URL {}: {}", base_url, e)))?;
        self.base_url = Some(base);
        Ok(self)
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    fn absolute_url(&self, url: &str) -> Result<Url, HttpError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.base_url.as_ref().ok_or_else(|| {
                    HttpError::new(format!("relative URL {} without a base URL", url))
                })?;
                base.join(url).map_err(|e| HttpError::new(e.to_string()))
            }
            Err(e) => Err(HttpError::new(format!("invalid URL {}: {}", url, e))),
        }
    }
}

#[cfg(feature = "reqwest")]
impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "reqwest")]
fn multipart_form(fields: Vec<super::FormField>) -> Result<reqwest::multipart::Form, HttpError> {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field.value {
            FormValue::Text(text) => form.text(field.name, text),
            FormValue::File(file) => {
                let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.filename);
                if let Some(content_type) = file.content_type.as_deref() {
                    part = part
                        .mime_str(content_type)
                        .map_err(|e| HttpError::new(e.to_string()))?;
                }
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, HttpError> {
        let url = self.absolute_url(&request.url)?;
        let mut req = self
            .inner
            .request(request.method, url)
            .headers(request.headers);

        req = match request.body {
            RequestBody::Empty => req,
            RequestBody::Text(text) => req.body(text),
            RequestBody::Multipart(fields) => req.multipart(multipart_form(fields)?),
        };

        let resp = req.send().await.map_err(|e| HttpError {
            status: None,
            message: e.to_string(),
        })?;

        let status_code = resp.status().as_u16();
        let headers = resp.headers().clone();

        let body = resp
            .bytes()
            .await
            .map_err(|e| HttpError {
                status: Some(status_code),
                message: e.to_string(),
            })?
            .to_vec();

        Ok(RawResponse {
            status: status_code,
            headers,
            body,
        })
    }
}
