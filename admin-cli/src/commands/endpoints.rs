// admin-cli/src/commands/endpoints.rs
use crate::output::{print_response, Response};
use admin_client::Config;
use anyhow::Result;
use clap::Subcommand;
use serde_json::{json, Value};

#[derive(Subcommand, Clone, Debug)]
pub enum EndpointsCommands {
    /// List configured endpoints
    List {
        /// Only ids containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },
}

pub fn handle_endpoints(cmd: EndpointsCommands) -> Result<()> {
    let config = Config::load()?;
    let registry = config.registry()?;

    match cmd {
        EndpointsCommands::List { filter } => {
            let endpoints: Vec<Value> = registry
                .ids()
                .into_iter()
                .filter(|id| filter.as_deref().map_or(true, |f| id.contains(f)))
                .filter_map(|id| {
                    let descriptor = registry.resolve(id).ok()?;
                    Some(json!({
                        "id": id,
                        "method": descriptor.method.as_str(),
                        "url": descriptor.url_template,
                        "private": descriptor.is_private,
                        "ownErrorHandling": descriptor.own_error_handling,
                    }))
                })
                .collect();

            let resp = Response::ok(json!({
                "count": endpoints.len(),
                "endpoints": endpoints,
            }));
            print_response(&resp)?;
            Ok(())
        }
    }
}
