//! API plumbing: discovery documents, request building, OAuth 2 tokens and
//! the HTTP layer they share.

pub mod auth;
pub mod discovery;
pub mod http;
pub mod logging;
pub mod request;

pub use auth::{AccessToken, AuthorizedUser, DEFAULT_TOKEN_URL, authorize, exchange_refresh_token};
pub use discovery::{
    DEFAULT_DISCOVERY_URL, DirectoryItem, DiscoveryClient, MethodRef, RestDocument, ServiceRef,
};
pub use http::{ApiResponse, DEFAULT_TIMEOUT, build_client, fetch_json, parse_json, send};
pub use request::{ApiRequest, BODY_KEY};
