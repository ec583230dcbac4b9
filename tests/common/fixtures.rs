//! A fake Google backend on a wiremock server.
#![allow(dead_code)]

use std::time::Duration;

use gcall::storage::Settings;
use gcall::test_utils::{make_test_directory_listing, make_test_rest_document_value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Discovery service, Drive API and token endpoint on one mock server.
pub struct FakeGoogle {
    pub server: MockServer,
}

impl FakeGoogle {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn discovery_url(&self) -> String {
        format!("{}/discovery/v1", self.server.uri())
    }

    /// `rootUrl` of the served Drive document.
    pub fn root_url(&self) -> String {
        format!("{}/", self.server.uri())
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.server.uri())
    }

    /// Settings pointing every endpoint at this server.
    pub fn settings(&self) -> Settings {
        Settings {
            discovery_url: self.discovery_url(),
            timeout: Duration::from_secs(5),
            token_url: self.token_url(),
            ..Settings::default()
        }
    }

    /// `GET /discovery/v1/apis`.
    pub async fn mount_directory(&self) {
        Mock::given(method("GET"))
            .and(path("/discovery/v1/apis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(make_test_directory_listing()))
            .mount(&self.server)
            .await;
    }

    /// `GET /discovery/v1/apis/drive/v3/rest`.
    pub async fn mount_drive_document(&self) {
        Mock::given(method("GET"))
            .and(path("/discovery/v1/apis/drive/v3/rest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(make_test_rest_document_value(&self.root_url())),
            )
            .mount(&self.server)
            .await;
    }

    /// Directory plus the Drive document.
    pub async fn mount_discovery(&self) {
        self.mount_directory().await;
        self.mount_drive_document().await;
    }

    /// A Drive API endpoint, `api_path` relative to `/drive/v3/`.
    pub async fn mount_drive(&self, http_method: &str, api_path: &str, response: ResponseTemplate) {
        Mock::given(method(http_method))
            .and(path(format!("/drive/v3/{api_path}")))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// `POST /token`.
    pub async fn mount_token(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }
}

/// Authorized-user credentials JSON.
pub fn authorized_user_json() -> String {
    serde_json::json!({
        "type": "authorized_user",
        "client_id": "client-123.apps.googleusercontent.com",
        "client_secret": "s3cret",
        "refresh_token": "1//refresh"
    })
    .to_string()
}
