//! `execute` command implementation.
//!
//! Calls one API method: reads the request document, resolves the method in
//! the discovery document, authorizes, sends, and prints the response.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::args::ExecuteArgs;
use super::console::Console;
use crate::core::auth::authorize;
use crate::core::discovery::{DiscoveryClient, MethodRef, ServiceRef};
use crate::core::http::{ApiResponse, build_client, parse_json, send};
use crate::core::request;
use crate::error::{DomainError, Result};
use crate::storage::Settings;

/// Reads the request document from stdin.
pub const STDIN_MARKER: &str = "-";
/// Prefix that reads the request document from a file.
pub const FILE_PREFIX: char = '@';

/// Execute the execute command.
///
/// # Errors
///
/// Any of the four classified categories, or an unclassified connection
/// failure.
pub async fn execute(args: &ExecuteArgs, settings: &Settings, console: &dyn Console) -> Result<()> {
    let text = read_request(&args.request)?;
    let request_doc = parse_json(&text)?;

    let service = ServiceRef::parse(&args.service)?;
    let reference = MethodRef::parse(&args.method)?;

    let client = build_client(settings.timeout)?;
    let discovery = DiscoveryClient::new(client.clone(), &settings.discovery_url);
    let version = discovery.resolve_version(&service).await?;
    let doc = discovery.rest_document(&service.name, &version).await?;
    let api_request = request::build(&doc, &reference, &request_doc)?;

    let credentials: Option<PathBuf> = args
        .credentials
        .clone()
        .or_else(|| settings.credentials_file.clone());
    let token = authorize(
        &client,
        &settings.token_url,
        args.access_token.as_deref().or(settings.access_token.as_deref()),
        credentials.as_deref(),
    )
    .await?;

    tracing::debug!(
        service = %doc.id(),
        method = %reference,
        authenticated = token.is_some(),
        "Calling API method"
    );
    let response = send(
        api_request.to_builder(&client, token.as_ref()),
        &api_request.url,
    )
    .await?;

    if let Some(output) = render_response(&response)? {
        console.out(&output);
    }
    Ok(())
}

/// Resolve the REQUEST argument to request text.
fn read_request(argument: &str) -> Result<String> {
    if argument == STDIN_MARKER {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(|e| {
            DomainError::RequestFileUnreadable {
                path: PathBuf::from("<stdin>"),
                reason: e.to_string(),
            }
        })?;
        return Ok(text);
    }
    if let Some(path) = argument.strip_prefix(FILE_PREFIX) {
        let path = Path::new(path);
        return std::fs::read_to_string(path).map_err(|e| {
            DomainError::RequestFileUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        });
    }
    Ok(argument.to_string())
}

/// Text to print for a successful response; `None` for an empty body.
fn render_response(response: &ApiResponse) -> Result<Option<String>> {
    let text = response.text();
    if text.trim().is_empty() {
        return Ok(None);
    }
    if !response.is_json() {
        return Ok(Some(text));
    }
    let value: Value = parse_json(&text)?;
    Ok(Some(serde_json::to_string_pretty(&value)?))
}
