// admin-client/src/downloads.rs
use api_transport::{DownloadCapability, DownloadFile, DownloadSink};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

const FALLBACK_FILENAME: &str = "download";

/// Writes downloads into a directory
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    dir: PathBuf,
    capability: DownloadCapability,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            capability: DownloadCapability::Blob,
        }
    }

    /// Deliver the way the given browser would
    pub fn for_user_agent(dir: impl Into<PathBuf>, user_agent: &str) -> Self {
        Self {
            dir: dir.into(),
            capability: DownloadCapability::from_user_agent(user_agent),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Server-chosen names never leave the download dir
    fn target(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_FILENAME);
        self.dir.join(name)
    }
}

#[async_trait]
impl DownloadSink for FileDownloadSink {
    fn capability(&self) -> DownloadCapability {
        self.capability
    }

    async fn save_blob(&self, file: DownloadFile) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.target(&file.filename);
        tokio::fs::write(&path, &file.bytes).await?;
        info!(path = %path.display(), size = file.bytes.len(), "download saved");
        Ok(())
    }

    async fn open_data_url(&self, filename: &str, data_url: String) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut path = self.target(filename).into_os_string();
        path.push(".dataurl");
        let path = PathBuf::from(path);
        tokio::fs::write(&path, data_url).await?;
        info!(path = %path.display(), "data URL written");
        Ok(())
    }
}
