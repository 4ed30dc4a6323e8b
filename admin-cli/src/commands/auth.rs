// admin-cli/src/commands/auth.rs
use crate::output::{
    print_notification, print_response, print_success, print_warning, ErrorResponse, ExitCode,
    OutputFormat, Response,
};
use admin_client::{AdminClient, Config, SessionStore};
use anyhow::Result;
use dialoguer::{Input, Password};
use serde_json::json;

/// Prompt for credentials and run the password grant
pub async fn run_login(
    username: Option<String>,
    location: &str,
    format: OutputFormat,
) -> Result<ExitCode> {
    let config = Config::load()?;
    let client = AdminClient::new(&config, SessionStore::open()?, location)?;

    let username = match username {
        Some(username) => username,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    if password.is_empty() {
        let resp = Response::<()>::error(ErrorResponse::invalid_argument(
            "Password cannot be empty".to_string(),
        ));
        print_response(&resp)?;
        return Ok(ExitCode::PermanentError);
    }

    match client.login(&username, &password).await {
        Ok(session) => {
            if format.is_human() {
                print_success(&format!("Logged in as {}", username));
            } else {
                let resp = Response::ok(json!({
                    "username": username,
                    "tokenType": session.token_type,
                    "obtainedAt": session.obtained_at.to_rfc3339(),
                    "canRefresh": session.refresh_token.is_some(),
                }));
                print_response(&resp)?;
            }
            Ok(ExitCode::Success)
        }
        Err(e) => {
            for notification in client.state().take_notifications() {
                print_notification(&notification);
            }
            let resp = Response::<()>::error(ErrorResponse::login_failed(e.to_string()));
            print_response(&resp)?;
            Ok(ExitCode::AuthRequired)
        }
    }
}

pub fn run_logout(location: &str, format: OutputFormat) -> Result<ExitCode> {
    let config = Config::load()?;
    let client = AdminClient::new(&config, SessionStore::open()?, location)?;

    let was_logged_in = client.is_logged_in();
    client.logout()?;

    if format.is_human() {
        if was_logged_in {
            print_success("Logged out");
        } else {
            print_warning("No active session");
        }
    } else {
        print_response(&Response::ok(json!({ "loggedOut": was_logged_in })))?;
    }
    Ok(ExitCode::Success)
}
