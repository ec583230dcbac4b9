//! OAuth 2 access tokens for API calls.
//!
//! gcall does not run consent flows. It either uses a bearer token handed to
//! it, or exchanges the refresh token of an authorized-user credentials file
//! (the format `gcloud auth application-default login` writes) for an access
//! token. Every failure of that exchange is a [`CommandError::AuthExchange`].

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{CommandError, DomainError, Result};

/// Google's OAuth 2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Authorized-user credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Token endpoint recorded in the file; wins over the configured one.
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl AuthorizedUser {
    /// Load credentials from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCredentials`] if the file cannot be read
    /// or lacks the required fields.
    pub fn load(path: &Path) -> std::result::Result<Self, DomainError> {
        let invalid = |reason: String| DomainError::InvalidCredentials {
            path: path.to_path_buf(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))
    }
}

/// A bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// A token supplied by the user; its lifetime is unknown.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange a refresh token for an access token.
///
/// # Errors
///
/// Returns [`CommandError::AuthExchange`] when the endpoint cannot be
/// reached, rejects the grant, or answers without an access token.
pub async fn exchange_refresh_token(
    client: &Client,
    token_url: &str,
    user: &AuthorizedUser,
) -> Result<AccessToken> {
    let url = user.token_uri.as_deref().unwrap_or(token_url);
    tracing::debug!(%url, client_id = %user.client_id, "Exchanging refresh token");

    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", user.client_id.as_str()),
        ("client_secret", user.client_secret.as_str()),
        ("refresh_token", user.refresh_token.as_str()),
    ];
    let response = client
        .post(url)
        .form(&form)
        .send()
        .await
        .map_err(|e| CommandError::auth_exchange(e.to_string()))?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| CommandError::auth_exchange(e.to_string()))?;

    let parsed: Option<TokenResponse> = serde_json::from_str(&text).ok();

    if let Some(TokenResponse {
        error: Some(error),
        error_description,
        ..
    }) = &parsed
    {
        return Err(CommandError::auth_exchange(match error_description {
            Some(description) => format!("{error}: {description}"),
            None => error.clone(),
        }));
    }

    if !status.is_success() {
        return Err(CommandError::auth_exchange(format!(
            "token endpoint returned {}: {}",
            status.as_u16(),
            text.trim()
        )));
    }

    let Some(TokenResponse {
        access_token: Some(token),
        expires_in,
        ..
    }) = parsed
    else {
        return Err(CommandError::auth_exchange(
            "token response has no access_token",
        ));
    };

    // Lifetimes chrono cannot represent are treated as unknown.
    let expires_at = expires_in
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
    tracing::debug!(?expires_at, "Obtained access token");
    Ok(AccessToken {
        token,
        expires_at,
    })
}

/// Pick the token for a call: an explicit bearer token wins, then a refresh
/// token exchange from `credentials`. `None` means the call goes out
/// unauthenticated.
///
/// # Errors
///
/// Invalid credentials files and failed exchanges.
pub async fn authorize(
    client: &Client,
    token_url: &str,
    access_token: Option<&str>,
    credentials: Option<&Path>,
) -> Result<Option<AccessToken>> {
    if let Some(token) = access_token {
        tracing::debug!("Using bearer token from command line or environment");
        return Ok(Some(AccessToken::bearer(token)));
    }
    let Some(path) = credentials else {
        tracing::debug!("No credentials configured, calling unauthenticated");
        return Ok(None);
    };
    let user = AuthorizedUser::load(path)?;
    exchange_refresh_token(client, token_url, &user)
        .await
        .map(Some)
}
