// admin-cli/src/commands/config.rs
use crate::output::{print_response, Response};
use admin_client::{Config, SessionStore};
use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show where configuration and session live
    Path,
}

pub fn handle_config(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = Config::load()?;
            print_response(&Response::ok(config))?;
            Ok(())
        }
        ConfigCommands::Path => {
            let sessions = SessionStore::open()?;
            let resp = Response::ok(json!({
                "config": Config::config_dir()?.join("config.toml"),
                "session": sessions.path(),
            }));
            print_response(&resp)?;
            Ok(())
        }
    }
}
