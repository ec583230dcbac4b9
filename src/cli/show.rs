//! `show` command implementation.
//!
//! Browses the discovery service: the API directory, the methods of one
//! API, or the details of one method.

use serde_json::{Value, json};

use super::args::ShowArgs;
use super::console::Console;
use crate::core::discovery::{DirectoryItem, DiscoveryClient, MethodRef, RestDocument, ServiceRef};
use crate::core::http::build_client;
use crate::error::Result;
use crate::storage::Settings;

/// Execute the show command.
///
/// # Errors
///
/// Domain errors for unknown services or methods; transport and payload
/// decode errors from the discovery service.
pub async fn execute(args: &ShowArgs, settings: &Settings, console: &dyn Console) -> Result<()> {
    let client = build_client(settings.timeout)?;
    let discovery = DiscoveryClient::new(client, &settings.discovery_url);

    let Some(service) = &args.service else {
        let items = discovery.list_apis(None).await?;
        tracing::debug!(count = items.len(), "Listing APIs");
        console.out(&render_directory(&items));
        return Ok(());
    };

    let service = ServiceRef::parse(service)?;
    let version = discovery.resolve_version(&service).await?;
    let doc = discovery.rest_document(&service.name, &version).await?;

    match &args.method {
        None => console.out(&render_methods(&doc)),
        Some(method) => {
            let reference = MethodRef::parse(method)?;
            let details = method_details(&doc, &reference)?;
            console.out(&serde_json::to_string_pretty(&details)?);
        }
    }
    Ok(())
}

/// Two aligned columns.
fn render_table(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(left, right)| {
            if right.is_empty() {
                left.clone()
            } else {
                format!("{left:<width$}  {right}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_directory(items: &[DirectoryItem]) -> String {
    let rows: Vec<(String, String)> = items
        .iter()
        .map(|item| (item.id(), item.title.clone().unwrap_or_default()))
        .collect();
    render_table(&rows)
}

fn render_methods(doc: &RestDocument) -> String {
    render_table(&doc.methods())
}

/// The method description with its request and response schemas inlined.
fn method_details(doc: &RestDocument, reference: &MethodRef) -> Result<Value> {
    let method = doc.method(reference)?;
    let schema_for = |key: &str| {
        let Some(slot) = method.get(key) else {
            return Value::Null;
        };
        slot.get("$ref")
            .and_then(Value::as_str)
            .and_then(|name| doc.schema(name))
            .unwrap_or(slot)
            .clone()
    };

    Ok(json!({
        "method": method,
        "request": schema_for("request"),
        "response": schema_for("response"),
    }))
}
