//! Turn a user request document into an HTTP request for a discovery method.
//!
//! The request is a JSON object. The `body` key becomes the HTTP body; every
//! other key must be a parameter declared by the method (or globally by the
//! document) and is placed in the path or the query string according to its
//! `location`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use reqwest::{Client, Method, RequestBuilder};
use serde_json::{Map, Value};

use super::auth::AccessToken;
use super::discovery::{MethodRef, RestDocument};
use crate::error::DomainError;

/// Key of the request document that holds the HTTP body.
pub const BODY_KEY: &str = "body";

/// A fully resolved API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub http_method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Build the reqwest request, attaching a bearer token when given.
    #[must_use]
    pub fn to_builder(&self, client: &Client, token: Option<&AccessToken>) -> RequestBuilder {
        let mut builder = client
            .request(self.http_method.clone(), &self.url)
            .query(&self.query);
        if let Some(body) = &self.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(&token.token);
        }
        builder
    }
}

/// Build an [`ApiRequest`] for `reference` from a request document.
///
/// # Errors
///
/// Domain errors for unknown methods, non-object requests, undeclared or
/// missing parameters, non-scalar path values, and methods the document
/// describes incompletely.
pub fn build(
    doc: &RestDocument,
    reference: &MethodRef,
    request: &Value,
) -> Result<ApiRequest, DomainError> {
    let method = doc.method(reference)?;
    let method_id = reference.to_string();

    let Some(fields) = request.as_object() else {
        return Err(DomainError::InvalidRequest(format!(
            "Request must be a JSON object, got {}",
            json_type(request)
        )));
    };

    let empty = Map::new();
    let declared = method
        .get("parameters")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let global = doc.global_parameters().unwrap_or(&empty);

    let mut path_values = BTreeMap::new();
    let mut query = Vec::new();
    let mut body = None;

    for (name, value) in fields {
        if name == BODY_KEY {
            body = Some(value.clone());
            continue;
        }
        let param = declared
            .get(name)
            .or_else(|| global.get(name))
            .ok_or_else(|| DomainError::UnknownParameter {
                method: method_id.clone(),
                name: name.clone(),
            })?;
        // Null means "not given", for required checks too.
        if value.is_null() {
            continue;
        }

        match param.get("location").and_then(Value::as_str) {
            Some("path") => {
                path_values.insert(name.clone(), scalar_text(name, value)?);
            }
            _ => match value {
                Value::Array(items) => {
                    for item in items {
                        query.push((name.clone(), scalar_text(name, item)?));
                    }
                }
                other => query.push((name.clone(), scalar_text(name, other)?)),
            },
        }
    }

    for (name, param) in declared {
        let required = param.get("required").and_then(Value::as_bool).unwrap_or(false);
        let given = fields.get(name).is_some_and(|value| !value.is_null());
        if required && !given {
            return Err(DomainError::MissingParameter {
                method: method_id,
                name: name.clone(),
            });
        }
    }

    let incomplete = |field: &str| {
        DomainError::InvalidDiscoveryDocument(format!("method {method_id} has no {field}"))
    };
    let http_method = method
        .get("httpMethod")
        .and_then(Value::as_str)
        .ok_or_else(|| incomplete("httpMethod"))?;
    let http_method = Method::from_bytes(http_method.as_bytes()).map_err(|_| {
        DomainError::InvalidDiscoveryDocument(format!(
            "method {method_id} has invalid httpMethod '{http_method}'"
        ))
    })?;
    let template = method
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| incomplete("path"))?;

    let path = expand_template(template, &path_values, &method_id)?;
    let url = join_url(doc.root_url(), doc.service_path(), &path);
    tracing::debug!(method = %method_id, %http_method, %url, "Built API request");

    Ok(ApiRequest {
        http_method,
        url,
        query,
        body,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn scalar_text(name: &str, value: &Value) -> Result<String, DomainError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(DomainError::InvalidRequest(format!(
            "Parameter {name} must be a string, number or boolean, got {}",
            json_type(other)
        ))),
    }
}

/// Expand `{name}` and `{+name}` expressions (RFC 6570 levels 1 and 2).
fn expand_template(
    template: &str,
    values: &BTreeMap<String, String>,
    method_id: &str,
) -> Result<String, DomainError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            DomainError::InvalidDiscoveryDocument(format!(
                "unterminated expression in path template '{template}'"
            ))
        })?;
        let expression = &after[..end];
        let (reserved, name) = expression
            .strip_prefix('+')
            .map_or((false, expression), |name| (true, name));
        let value = values.get(name).ok_or_else(|| DomainError::MissingParameter {
            method: method_id.to_string(),
            name: name.to_string(),
        })?;
        out.push_str(&percent_encode(value, reserved));
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Percent-encode everything but unreserved characters, and also keep
/// reserved characters when `reserved` is set.
fn percent_encode(value: &str, reserved: bool) -> String {
    const RESERVED: &[u8] = b":/?#[]@!$&'()*+,;=";

    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'.' | b'_' | b'~')
            || (reserved && RESERVED.contains(&byte));
        if keep {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// `rootUrl` + `servicePath` + `path`. A path starting with `/` is relative
/// to `rootUrl` alone.
fn join_url(root_url: &str, service_path: &str, path: &str) -> String {
    let root = root_url.trim_end_matches('/');
    if let Some(absolute) = path.strip_prefix('/') {
        return format!("{root}/{absolute}");
    }
    let service_path = service_path.trim_matches('/');
    if service_path.is_empty() {
        format!("{root}/{path}")
    } else {
        format!("{root}/{service_path}/{path}")
    }
}
