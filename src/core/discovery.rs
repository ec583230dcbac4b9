//! Discovery service client.
//!
//! Lists APIs from the discovery directory and fetches REST discovery
//! documents. Documents are kept as `serde_json::Value`; only the handful of
//! fields gcall navigates are looked at.

use std::fmt;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::http::fetch_json;
use crate::error::{DomainError, Result};

/// Public discovery service base URL.
pub const DEFAULT_DISCOVERY_URL: &str = "https://www.googleapis.com/discovery/v1";

// =============================================================================
// References
// =============================================================================

/// A `SERVICE[:VERSION]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef {
    pub name: String,
    pub version: Option<String>,
}

impl ServiceRef {
    /// Parse `drive` or `drive:v3`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidServiceRef`] when the name or the
    /// version after `:` is empty.
    pub fn parse(input: &str) -> std::result::Result<Self, DomainError> {
        let invalid = || DomainError::InvalidServiceRef(input.to_string());
        let (name, version) = match input.split_once(':') {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (input.trim(), None),
        };
        if name.is_empty() || version.is_some_and(str::is_empty) {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{version}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A `RESOURCE[.RESOURCE...].METHOD` reference. A single segment names a
/// top-level method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    segments: Vec<String>,
}

impl MethodRef {
    /// Parse `files.list` or `projects.topics.publish`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidMethodRef`] for empty segments.
    pub fn parse(input: &str) -> std::result::Result<Self, DomainError> {
        let segments: Vec<String> = input.trim().split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(DomainError::InvalidMethodRef(input.to_string()));
        }
        Ok(Self { segments })
    }

    /// Resource path leading to the method.
    #[must_use]
    pub fn resources(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The method name itself.
    #[must_use]
    pub fn method_name(&self) -> &str {
        // parse() guarantees at least one segment
        &self.segments[self.segments.len() - 1]
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

// =============================================================================
// Directory
// =============================================================================

/// One entry of the discovery directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryItem {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preferred: bool,
}

impl DirectoryItem {
    /// `name:version`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryList {
    #[serde(default)]
    items: Vec<DirectoryItem>,
}

// =============================================================================
// REST document
// =============================================================================

/// A REST discovery document.
#[derive(Debug, Clone, PartialEq)]
pub struct RestDocument {
    value: Value,
}

impl RestDocument {
    /// Wrap a parsed document after checking the fields gcall relies on.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidDiscoveryDocument`] when the value is not
    /// an object or has no string `rootUrl`.
    pub fn new(value: Value) -> std::result::Result<Self, DomainError> {
        if !value.is_object() {
            return Err(DomainError::InvalidDiscoveryDocument(
                "expected a JSON object".to_string(),
            ));
        }
        if !value.get("rootUrl").is_some_and(Value::is_string) {
            return Err(DomainError::InvalidDiscoveryDocument(
                "missing rootUrl".to_string(),
            ));
        }
        Ok(Self { value })
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// `name:version` as declared by the document.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}:{}", self.str_field("name"), self.str_field("version"))
    }

    #[must_use]
    pub fn root_url(&self) -> &str {
        self.str_field("rootUrl")
    }

    #[must_use]
    pub fn service_path(&self) -> &str {
        self.str_field("servicePath")
    }

    /// Document-level parameters shared by every method (`fields`, `key`, ...).
    #[must_use]
    pub fn global_parameters(&self) -> Option<&serde_json::Map<String, Value>> {
        self.value.get("parameters").and_then(Value::as_object)
    }

    fn str_field(&self, key: &str) -> &str {
        self.value.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    /// All methods as `(RESOURCE.METHOD, first description line)`, sorted.
    #[must_use]
    pub fn methods(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        collect_methods(&self.value, "", &mut out);
        out.sort();
        out
    }

    /// Look up a method description.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownMethod`] when any segment is missing.
    pub fn method(&self, reference: &MethodRef) -> std::result::Result<&Value, DomainError> {
        let unknown = || DomainError::UnknownMethod {
            service: self.id(),
            method: reference.to_string(),
        };
        let mut node = &self.value;
        for resource in reference.resources() {
            node = node
                .get("resources")
                .and_then(|r| r.get(resource))
                .ok_or_else(unknown)?;
        }
        node.get("methods")
            .and_then(|m| m.get(reference.method_name()))
            .ok_or_else(unknown)
    }

    /// A named schema from the document's `schemas` section.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.value.get("schemas").and_then(|s| s.get(name))
    }
}

fn collect_methods(node: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
    if let Some(methods) = node.get("methods").and_then(Value::as_object) {
        for (name, method) in methods {
            let summary = method
                .get("description")
                .and_then(Value::as_str)
                .and_then(|d| d.lines().next())
                .unwrap_or_default()
                .trim()
                .to_string();
            out.push((format!("{prefix}{name}"), summary));
        }
    }
    if let Some(resources) = node.get("resources").and_then(Value::as_object) {
        for (name, resource) in resources {
            collect_methods(resource, &format!("{prefix}{name}."), out);
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for the discovery service.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    client: Client,
    base_url: String,
}

impl DiscoveryClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// List APIs, optionally restricted to one service name.
    ///
    /// # Errors
    ///
    /// Transport, payload decode, or invalid directory listing errors.
    pub async fn list_apis(&self, name: Option<&str>) -> Result<Vec<DirectoryItem>> {
        let url = format!("{}/apis", self.base_url);
        let query: Vec<(&str, &str)> = name.map(|n| vec![("name", n)]).unwrap_or_default();
        let value = fetch_json(&self.client, &url, &query).await?;
        let list: DirectoryList = serde_json::from_value(value).map_err(|e| {
            DomainError::InvalidDiscoveryDocument(format!("directory listing: {e}"))
        })?;
        Ok(list
            .items
            .into_iter()
            .filter(|item| name.is_none_or(|n| item.name == n))
            .collect())
    }

    /// The version to use for a service: the explicit one, else the
    /// preferred directory entry, else the first listed.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownService`] when the directory has no entry.
    pub async fn resolve_version(&self, service: &ServiceRef) -> Result<String> {
        if let Some(version) = &service.version {
            return Ok(version.clone());
        }
        let items = self.list_apis(Some(&service.name)).await?;
        let chosen = items
            .iter()
            .find(|item| item.preferred)
            .or_else(|| items.first())
            .ok_or_else(|| DomainError::UnknownService(service.name.clone()))?;
        tracing::debug!(service = %service.name, version = %chosen.version, "Resolved API version");
        Ok(chosen.version.clone())
    }

    /// Fetch the REST discovery document for `name:version`.
    ///
    /// # Errors
    ///
    /// Transport, payload decode, or invalid document errors.
    pub async fn rest_document(&self, name: &str, version: &str) -> Result<RestDocument> {
        let url = format!("{}/apis/{name}/{version}/rest", self.base_url);
        let value = fetch_json(&self.client, &url, &[]).await?;
        Ok(RestDocument::new(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_test_rest_document;

    #[test]
    fn service_ref_parsing() {
        assert_eq!(
            ServiceRef::parse("drive:v3").unwrap(),
            ServiceRef {
                name: "drive".to_string(),
                version: Some("v3".to_string())
            }
        );
        assert_eq!(ServiceRef::parse("drive").unwrap().version, None);
        assert!(ServiceRef::parse("").is_err());
        assert!(ServiceRef::parse(":v3").is_err());
        assert!(ServiceRef::parse("drive:").is_err());
    }

    #[test]
    fn method_ref_parsing() {
        let reference = MethodRef::parse("projects.topics.publish").unwrap();
        assert_eq!(reference.resources(), ["projects", "topics"]);
        assert_eq!(reference.method_name(), "publish");
        assert_eq!(reference.to_string(), "projects.topics.publish");
        assert!(MethodRef::parse("files.").is_err());
        assert!(MethodRef::parse("").is_err());
    }

    #[test]
    fn rest_document_requires_root_url() {
        assert!(RestDocument::new(serde_json::json!({"name": "x"})).is_err());
        assert!(RestDocument::new(serde_json::json!([])).is_err());
    }

    #[test]
    fn methods_are_listed_recursively_and_sorted() {
        let doc = make_test_rest_document("https://www.googleapis.com/");
        let ids: Vec<String> = doc.methods().into_iter().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec![
                "about.get",
                "files.comments.list",
                "files.create",
                "files.get",
                "files.list",
            ]
        );
    }

    #[test]
    fn method_summary_is_first_description_line() {
        let doc = make_test_rest_document("https://www.googleapis.com/");
        let methods = doc.methods();
        let (_, summary) = methods.iter().find(|(id, _)| id == "files.list").unwrap();
        assert_eq!(summary, "Lists the user's files.");
    }

    #[test]
    fn unknown_method_names_document() {
        let doc = make_test_rest_document("https://www.googleapis.com/");
        let err = doc.method(&MethodRef::parse("files.frobnicate").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Method not found in drive:v3: files.frobnicate");
    }
}
