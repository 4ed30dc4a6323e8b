pub mod client;
pub mod config;
pub mod downloads;
pub mod session_store;
pub mod state;

pub use client::AdminClient;
pub use config::{ApiConfig, AuthConfig, Config, DownloadConfig};
pub use downloads::FileDownloadSink;
pub use session_store::SessionStore;
pub use state::ConsoleState;

// Re-export transport types the CLI works with
pub use api_transport::{
    FilePart, Notification, NotificationKind, ParamValue, Params, Payload, ResponseEnvelope,
    TransportError,
};
