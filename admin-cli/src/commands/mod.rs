// admin-cli/src/commands/mod.rs
pub mod auth;
pub mod call;
pub mod config;
pub mod endpoints;

pub use auth::{run_login, run_logout};
pub use call::{handle_call, CallArgs};
pub use config::{handle_config, ConfigCommands};
pub use endpoints::{handle_endpoints, EndpointsCommands};
