// admin-cli/src/commands/call.rs
use crate::output::{
    format_output, print_notification, print_response, CallOutput, ErrorResponse, ExitCode,
    OutputFormat, Response,
};
use admin_client::{AdminClient, Config, FilePart, ParamValue, Params, Payload, SessionStore};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

#[derive(Args, Clone, Debug)]
pub struct CallArgs {
    /// Endpoint id (see `admin endpoints list`)
    pub endpoint: String,
    /// Request payload as a JSON object
    #[arg(short, long)]
    pub payload: Option<String>,
    /// URL parameter: a positional value, or a JSON object merged into the query
    #[arg(long = "param")]
    pub params: Vec<String>,
    /// Attach a file to a multipart payload as field=path
    #[arg(long = "file")]
    pub files: Vec<String>,
}

pub async fn handle_call(args: CallArgs, location: &str, format: OutputFormat) -> Result<ExitCode> {
    let config = Config::load()?;
    let client = AdminClient::new(&config, SessionStore::open()?, location)?;

    let (payload, params) = match build_request(&args).await {
        Ok(request) => request,
        Err(e) => {
            let resp = Response::<()>::error(ErrorResponse::invalid_argument(format!("{:#}", e)));
            print_response(&resp)?;
            return Ok(ExitCode::PermanentError);
        }
    };

    if !client.is_logged_in() {
        debug!(endpoint = %args.endpoint, "calling without a session");
    }

    match client.call(&args.endpoint, payload, params).await {
        Ok(envelope) => {
            let output = CallOutput {
                endpoint: args.endpoint,
                envelope,
            };
            println!("{}", format_output(&output, format));
            Ok(ExitCode::Success)
        }
        Err(err) => {
            for notification in client.state().take_notifications() {
                print_notification(&notification);
            }
            let resp = Response::<()>::error(ErrorResponse::from_transport(&err));
            print_response(&resp)?;
            Ok(ExitCode::for_transport(&err))
        }
    }
}

async fn build_request(args: &CallArgs) -> Result<(Option<Payload>, Option<Params>)> {
    let mut payload = match &args.payload {
        Some(raw) => {
            let value: Value = serde_json::from_str(raw).context("--payload is not valid JSON")?;
            Some(Payload::try_from(value)?)
        }
        None => None,
    };

    for arg in &args.files {
        let (field, path) = parse_file_field(arg)?;
        let file = read_file_part(Path::new(path)).await?;
        payload = Some(payload.unwrap_or_default().with_file(field, file));
    }

    let params = if args.params.is_empty() {
        None
    } else {
        let mut params = Params::new();
        for raw in &args.params {
            params.push(parse_param(raw));
        }
        Some(params)
    };

    Ok((payload, params))
}

/// JSON objects become query entries; anything not valid JSON is a plain string
pub fn parse_param(raw: &str) -> ParamValue {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Object(_) | Value::Number(_) | Value::Bool(_) | Value::String(_))) => {
            value.into()
        }
        _ => ParamValue::Scalar(Value::String(raw.to_string())),
    }
}

fn parse_file_field(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((field, path)) if !field.is_empty() && !path.is_empty() => Ok((field, path)),
        _ => Err(anyhow!("--file expects field=path, got '{}'", arg)),
    }
}

async fn read_file_part(path: &Path) -> Result<FilePart> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok(FilePart {
        filename,
        content_type: mime_guess::from_path(path).first_raw().map(str::to_string),
        bytes,
    })
}
