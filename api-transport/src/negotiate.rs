// api-transport/src/negotiate.rs
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::blob::data_url;
use crate::download::{DownloadCapability, DownloadFile, DownloadSink};
use crate::error::TransportError;
use crate::http::RawResponse;
use crate::types::{DownloadReceipt, ResponseEnvelope};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const SPREADSHEET_MARKER: &str = "openxmlformats";
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Response body shapes this client understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    File,
    Unsupported,
}

impl ContentKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return ContentKind::Json;
        };
        let content_type = content_type.to_ascii_lowercase();
        if content_type.starts_with(JSON_CONTENT_TYPE) {
            ContentKind::Json
        } else if content_type.contains(SPREADSHEET_MARKER)
            || content_type.starts_with(BINARY_CONTENT_TYPE)
        {
            ContentKind::File
        } else {
            ContentKind::Unsupported
        }
    }
}

/// Parse a JSON body; an empty body is `null`
pub fn parse_json_body(body: &[u8]) -> Result<Value, TransportError> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(TransportError::JsonParse)
}

/// Filename from `attachment; filename=<name>`
pub fn attachment_filename(content_disposition: Option<&str>) -> Result<String, TransportError> {
    let header = content_disposition.ok_or_else(|| {
        TransportError::ContentDispositionInvalid("missing content-disposition header".to_string())
    })?;
    let invalid = || TransportError::ContentDispositionInvalid(header.to_string());

    if !header.trim_start().starts_with("attachment") {
        return Err(invalid());
    }

    let filename = header
        .split(';')
        .nth(1)
        .map(str::trim)
        .and_then(|segment| segment.strip_prefix("filename="))
        .map(|name| name.trim().trim_matches('"'))
        .filter(|name| !name.is_empty())
        .ok_or_else(invalid)?;

    Ok(filename.to_string())
}

/// Turn a successful response into a JSON value or a delivered file
pub async fn negotiate(
    response: RawResponse,
    sink: &dyn DownloadSink,
) -> Result<ResponseEnvelope, TransportError> {
    let content_type = response.header(CONTENT_TYPE).map(str::to_string);

    match ContentKind::from_content_type(content_type.as_deref()) {
        ContentKind::Json => parse_json_body(&response.body).map(ResponseEnvelope::Json),
        ContentKind::File => {
            let filename = attachment_filename(response.header(CONTENT_DISPOSITION))?;
            let content_type = content_type.unwrap_or_else(|| BINARY_CONTENT_TYPE.to_string());
            deliver(
                DownloadFile {
                    filename,
                    content_type,
                    bytes: response.body,
                },
                sink,
            )
            .await
            .map(ResponseEnvelope::Download)
        }
        ContentKind::Unsupported => Err(TransportError::ContentTypeUnsupported(
            content_type.unwrap_or_default(),
        )),
    }
}

async fn deliver(
    file: DownloadFile,
    sink: &dyn DownloadSink,
) -> Result<DownloadReceipt, TransportError> {
    let delivery = sink.capability();
    let filename = file.filename.clone();
    let size = file.bytes.len();
    debug!(%filename, size, ?delivery, "delivering file download");

    match delivery {
        DownloadCapability::Blob => sink.save_blob(file).await?,
        DownloadCapability::DataUrl => {
            let url = data_url(BINARY_CONTENT_TYPE, &file.bytes);
            sink.open_data_url(&filename, url).await?
        }
    }

    Ok(DownloadReceipt {
        filename,
        size,
        delivery,
    })
}
