// api-transport/src/lib.rs
pub mod auth;
pub mod blob;
pub mod body;
pub mod classify;
pub mod descriptor;
pub mod download;
pub mod error;
pub mod http;
pub mod negotiate;
pub mod params;
pub mod redirect;
pub mod refresh;
pub mod request;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use auth::SessionHandle;
pub use blob::{data_url, encode_base64, encode_base64_framed};
pub use descriptor::{BodyEncoding, EndpointConfig, EndpointDescriptor, EndpointRegistry, EndpointSettings};
pub use download::{DownloadCapability, DownloadFile, DownloadSink, RejectingSink};
pub use error::{DescriptorError, TransportError};
pub use self::http::{HttpClient, HttpError, PreparedRequest, RawResponse, RequestBody};
pub use params::{ParamValue, Params};
pub use store::{AppStore, NoopRouter, NoopStore, Router};
pub use transport::{Transport, TransportBuilder, TransportSettings};
pub use types::{
    AuthSession, CallRequest, DownloadReceipt, FailedResponse, FilePart, Notification,
    NotificationKind, Payload, PayloadValue, ResponseEnvelope, TokenResponse,
};

// Re-export reqwest client when feature is enabled
#[cfg(feature = "reqwest")]
pub use self::http::ReqwestClient;
