// api-transport/src/download.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How a file download reaches the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadCapability {
    /// Hand over the bytes as a blob under the attachment filename
    Blob,
    /// Hand over a base64 `data:` URL instead of a blob
    DataUrl,
}

impl DownloadCapability {
    /// Pick the delivery path for a user agent.
    ///
    /// Safari up to major version 10 cannot save blobs under a filename and
    /// gets the data URL path. Every other agent gets blobs.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let other_engine = ["Chrome/", "Chromium/", "CriOS/", "FxiOS/", "Edg/", "OPR/"]
            .iter()
            .any(|marker| user_agent.contains(marker));
        if other_engine || !user_agent.contains("Safari/") {
            return DownloadCapability::Blob;
        }

        let major = user_agent
            .split_once("Version/")
            .and_then(|(_, rest)| rest.split(|c: char| !c.is_ascii_digit()).next())
            .and_then(|digits| digits.parse::<u32>().ok());

        match major {
            Some(major) if major <= 10 => DownloadCapability::DataUrl,
            _ => DownloadCapability::Blob,
        }
    }
}

/// File extracted from a download response
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where downloaded files go
#[async_trait]
pub trait DownloadSink: Send + Sync {
    fn capability(&self) -> DownloadCapability {
        DownloadCapability::Blob
    }

    async fn save_blob(&self, file: DownloadFile) -> std::io::Result<()>;

    async fn open_data_url(&self, filename: &str, data_url: String) -> std::io::Result<()>;
}

/// Sink for transports that never expect file responses
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingSink;

#[async_trait]
impl DownloadSink for RejectingSink {
    async fn save_blob(&self, file: DownloadFile) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("no download sink configured for {}", file.filename),
        ))
    }

    async fn open_data_url(&self, filename: &str, _data_url: String) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("no download sink configured for {}", filename),
        ))
    }
}
